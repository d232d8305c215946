//! The remote entity store.
//!
//! Owns the table connection lifecycle and exposes whole-row operations
//! keyed by (partition = user identity, sort = entity id). The vehicle row
//! and item rows share one table; [`query_all`](RemoteStore::query_all)
//! demultiplexes them by the reserved sort-key sentinel.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use odo_types::codec::{self, VEHICLE_SORT_KEY};
use odo_types::{AttrValue, ServiceItem, Vehicle};

use crate::credentials::CredentialProvider;
use crate::error::{Error, Result};
use crate::transport::{TableConnector, TableTransport};

/// A row that failed to decode during a query.
///
/// Skipped rows are non-fatal by default; callers that care (diagnostics,
/// wipes) can inspect them.
#[derive(Debug, Clone)]
pub struct SkippedRow {
    /// The row's sort key, when it at least had a readable one.
    pub sort_key: Option<String>,
    /// Why the row was dropped.
    pub reason: String,
}

/// The successfully decoded subset of a partition query.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// The vehicle profile, if its row existed and decoded.
    pub vehicle: Option<Vehicle>,
    /// All decodable maintenance items.
    pub items: Vec<ServiceItem>,
    /// Rows dropped by decode, for optional inspection.
    pub skipped: Vec<SkippedRow>,
}

/// Client for the user's slice of the remote table.
///
/// The connection is established lazily on first use and memoized: the
/// credential supplier is only consulted again after an explicit
/// [`invalidate`](Self::invalidate). Establishment is single-flight —
/// concurrent first-time callers wait on one connect rather than racing to
/// create duplicates.
pub struct RemoteStore {
    table: String,
    user_id: String,
    credentials: Arc<dyn CredentialProvider>,
    connector: Arc<dyn TableConnector>,
    connection: Mutex<Option<Arc<dyn TableTransport>>>,
}

impl RemoteStore {
    /// Create a store for one user's partition of the given table.
    pub fn new(
        table: impl Into<String>,
        user_id: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        connector: Arc<dyn TableConnector>,
    ) -> Self {
        Self {
            table: table.into(),
            user_id: user_id.into(),
            credentials,
            connector,
            connection: Mutex::new(None),
        }
    }

    /// The partition key value this store operates under.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Drop the memoized connection so the next operation reconnects.
    pub async fn invalidate(&self) {
        *self.connection.lock().await = None;
        debug!("remote connection invalidated");
    }

    // Holding the mutex across credential resolution and connect is what
    // makes first-time establishment single-flight.
    async fn connection(&self) -> Result<Arc<dyn TableTransport>> {
        let mut guard = self.connection.lock().await;
        if let Some(transport) = guard.as_ref() {
            return Ok(Arc::clone(transport));
        }

        let credentials = self.credentials.resolve().await?;
        let transport = self.connector.connect(credentials).await?;
        *guard = Some(Arc::clone(&transport));
        info!(table = %self.table, "remote table connection established");
        Ok(transport)
    }

    /// Upsert the vehicle profile row.
    pub async fn put_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        let transport = self.connection().await?;
        transport
            .put_row(&self.table, codec::encode_vehicle(&self.user_id, vehicle))
            .await
    }

    /// Upsert one maintenance item row (full replace, no partial update).
    pub async fn put_item(&self, item: &ServiceItem) -> Result<()> {
        let transport = self.connection().await?;
        transport
            .put_row(&self.table, codec::encode_item(&self.user_id, item))
            .await
    }

    /// Fetch and demultiplex every row under the user's partition key.
    ///
    /// Rows whose sort key equals the metadata sentinel decode as the
    /// vehicle; all others decode as items. Undecodable rows are dropped
    /// into [`FetchOutcome::skipped`], never surfaced as errors.
    pub async fn query_all(&self) -> Result<FetchOutcome> {
        let transport = self.connection().await?;
        let rows = transport.query_partition(&self.table, &self.user_id).await?;

        let now = OffsetDateTime::now_utc();
        let mut outcome = FetchOutcome::default();

        for row in &rows {
            match row.get(codec::ATTR_SORT).and_then(AttrValue::as_s) {
                None => {
                    debug!("skipping row without a string sort key");
                    outcome.skipped.push(SkippedRow {
                        sort_key: None,
                        reason: "sort key missing or not a string".to_string(),
                    });
                }
                Some(VEHICLE_SORT_KEY) => match codec::decode_vehicle(row, now) {
                    Ok(vehicle) => outcome.vehicle = Some(vehicle),
                    Err(e) => {
                        debug!(error = %e, "skipping undecodable vehicle row");
                        outcome.skipped.push(SkippedRow {
                            sort_key: Some(VEHICLE_SORT_KEY.to_string()),
                            reason: e.to_string(),
                        });
                    }
                },
                Some(sort) => match codec::decode_item(row) {
                    Ok(item) => outcome.items.push(item),
                    Err(e) => {
                        debug!(row = sort, error = %e, "skipping undecodable item row");
                        outcome.skipped.push(SkippedRow {
                            sort_key: Some(sort.to_string()),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        debug!(
            items = outcome.items.len(),
            skipped = outcome.skipped.len(),
            vehicle = outcome.vehicle.is_some(),
            "partition query decoded"
        );
        Ok(outcome)
    }

    /// Remove one item row by id.
    pub async fn delete_item(&self, id: Uuid) -> Result<()> {
        self.delete_sort(&id.to_string()).await
    }

    async fn delete_sort(&self, sort: &str) -> Result<()> {
        let transport = self.connection().await?;
        transport.delete_row(&self.table, &self.user_id, sort).await
    }

    /// Delete every row for this user: the metadata row, each item row, and
    /// any undecodable leftovers with a readable sort key — one delete per
    /// row, no batch.
    ///
    /// Not atomic: a failure partway leaves a partially-deleted table.
    /// Individual delete failures do not stop the sequence; they are
    /// aggregated into a single [`Error::PartialWipe`] at the end.
    ///
    /// # Errors
    ///
    /// Fails fast only if the initial fetch fails; otherwise returns
    /// `PartialWipe` when at least one delete failed.
    pub async fn wipe_all(&self) -> Result<()> {
        let fetched = self.query_all().await?;

        let mut targets = vec![VEHICLE_SORT_KEY.to_string()];
        targets.extend(fetched.items.iter().map(|item| item.id.to_string()));
        for skipped in fetched.skipped {
            if let Some(sort) = skipped.sort_key
                && sort != VEHICLE_SORT_KEY
            {
                targets.push(sort);
            }
        }

        let attempted = targets.len();
        let mut failures = Vec::new();
        for sort in &targets {
            if let Err(e) = self.delete_sort(sort).await {
                warn!(row = %sort, error = %e, "delete failed during wipe, continuing");
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            info!(rows = attempted, "remote wipe complete");
            Ok(())
        } else {
            Err(Error::PartialWipe {
                attempted,
                failed: failures.len(),
                first_error: failures.swap_remove(0),
            })
        }
    }
}

//! Mock table transport for testing.
//!
//! [`MockTableTransport`] implements [`TableTransport`] over an in-memory
//! map, with failure injection so tests can exercise offline behavior and
//! partial-wipe sequences without a network.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use odo_types::AttrMap;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::transport::{TableConnector, TableTransport};

/// An in-memory table keyed by (partition, sort).
#[derive(Default)]
pub struct MockTableTransport {
    rows: RwLock<BTreeMap<(String, String), AttrMap>>,
    fail_all: AtomicBool,
    delete_calls: AtomicU32,
    /// 1-based index of the delete call that should fail (0 = never).
    fail_delete_at: AtomicU32,
}

impl std::fmt::Debug for MockTableTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTableTransport")
            .field("fail_all", &self.fail_all.load(Ordering::Relaxed))
            .field("delete_calls", &self.delete_calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockTableTransport {
    /// Create an empty mock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail, simulating a lost connection.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Make the `n`-th delete call (1-based) fail; other deletes succeed.
    pub fn fail_delete_call(&self, n: u32) {
        self.fail_delete_at.store(n, Ordering::SeqCst);
    }

    /// How many delete calls were attempted.
    pub fn delete_call_count(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of rows currently stored across all partitions.
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Fetch a stored row for inspection.
    pub async fn row(&self, partition: &str, sort: &str) -> Option<AttrMap> {
        self.rows
            .read()
            .await
            .get(&(partition.to_string(), sort.to_string()))
            .cloned()
    }

    /// Seed a row directly, bypassing the transport interface.
    pub async fn insert_row(&self, partition: &str, sort: &str, row: AttrMap) {
        self.rows
            .write()
            .await
            .insert((partition.to_string(), sort.to_string()), row);
    }

    fn check_fail_all(&self, operation: &'static str) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(Error::operation(operation, "transport offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TableTransport for MockTableTransport {
    async fn put_row(&self, _table: &str, row: AttrMap) -> Result<()> {
        self.check_fail_all("put")?;

        let partition = row
            .get(odo_types::codec::ATTR_PARTITION)
            .and_then(odo_types::AttrValue::as_s)
            .ok_or_else(|| Error::operation("put", "row missing partition key"))?
            .to_string();
        let sort = row
            .get(odo_types::codec::ATTR_SORT)
            .and_then(odo_types::AttrValue::as_s)
            .ok_or_else(|| Error::operation("put", "row missing sort key"))?
            .to_string();

        self.rows.write().await.insert((partition, sort), row);
        Ok(())
    }

    async fn query_partition(&self, _table: &str, partition: &str) -> Result<Vec<AttrMap>> {
        self.check_fail_all("query")?;

        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|((p, _), _)| p == partition)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn delete_row(&self, _table: &str, partition: &str, sort: &str) -> Result<()> {
        let call = self.delete_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_fail_all("delete")?;

        if call == self.fail_delete_at.load(Ordering::SeqCst) {
            return Err(Error::operation("delete", "injected delete failure"));
        }

        self.rows
            .write()
            .await
            .remove(&(partition.to_string(), sort.to_string()));
        Ok(())
    }
}

/// Connector handing out a shared [`MockTableTransport`], counting how many
/// times a connection was established.
pub struct MockConnector {
    transport: Arc<MockTableTransport>,
    connect_count: AtomicU32,
}

impl MockConnector {
    /// Wrap an existing mock transport.
    #[must_use]
    pub fn new(transport: Arc<MockTableTransport>) -> Self {
        Self {
            transport,
            connect_count: AtomicU32::new(0),
        }
    }

    /// How many times `connect` was invoked.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableConnector for MockConnector {
    async fn connect(&self, _credentials: Credentials) -> Result<Arc<dyn TableTransport>> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.transport) as Arc<dyn TableTransport>)
    }
}

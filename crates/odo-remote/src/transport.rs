//! Transport abstraction over the remote partitioned table.
//!
//! [`TableTransport`] is the seam between the entity store and the wire:
//! rows travel as [`AttrMap`]s, keyed by (partition, sort). The production
//! implementation is a thin HTTP JSON client; tests use
//! [`MockTableTransport`](crate::mock::MockTableTransport).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use odo_types::AttrMap;

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Operations the remote table exposes.
///
/// All operations are whole-row: `put_row` replaces the full row (no
/// partial-field update), `query_partition` returns every row under one
/// partition key in a single request.
#[async_trait]
pub trait TableTransport: Send + Sync {
    /// Upsert one row.
    async fn put_row(&self, table: &str, row: AttrMap) -> Result<()>;

    /// Fetch all rows under a partition key.
    async fn query_partition(&self, table: &str, partition: &str) -> Result<Vec<AttrMap>>;

    /// Remove exactly one row by composite key.
    async fn delete_row(&self, table: &str, partition: &str, sort: &str) -> Result<()>;
}

/// Factory that turns resolved credentials into a live transport.
///
/// Injected into [`RemoteStore`](crate::store::RemoteStore) so the
/// connection object is explicitly constructed rather than a hidden global;
/// the store guarantees it is invoked at most once per memoized connection.
#[async_trait]
pub trait TableConnector: Send + Sync {
    /// Establish a transport using the given credentials.
    async fn connect(&self, credentials: Credentials) -> Result<Arc<dyn TableTransport>>;
}

#[derive(Serialize)]
struct PutRowRequest<'a> {
    row: &'a AttrMap,
}

#[derive(Deserialize)]
struct QueryResponse {
    rows: Vec<AttrMap>,
}

/// HTTP JSON client for the table service.
#[derive(Debug, Clone)]
pub struct HttpTableTransport {
    client: reqwest::Client,
    base_url: String,
    session_token: String,
}

impl HttpTableTransport {
    /// Create a transport against the given service URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] for a malformed URL or if the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, credentials: &Credentials) -> Result<Self> {
        // Normalize URL (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::connection(format!(
                "URL must start with http:// or https://, got: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            session_token: credentials.session_token.clone(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(Error::Operation { operation, message })
        }
    }
}

#[async_trait]
impl TableTransport for HttpTableTransport {
    async fn put_row(&self, table: &str, row: AttrMap) -> Result<()> {
        let url = format!("{}/tables/{}/rows", self.base_url, table);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.session_token)
            .json(&PutRowRequest { row: &row })
            .send()
            .await
            .map_err(|e| Error::operation("put", e.to_string()))?;

        Self::check("put", response).await.map(|_| ())
    }

    async fn query_partition(&self, table: &str, partition: &str) -> Result<Vec<AttrMap>> {
        let url = format!("{}/tables/{}/rows/{}", self.base_url, table, partition);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.session_token)
            .send()
            .await
            .map_err(|e| Error::operation("query", e.to_string()))?;

        let response = Self::check("query", response).await?;
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::operation("query", e.to_string()))?;

        Ok(body.rows)
    }

    async fn delete_row(&self, table: &str, partition: &str, sort: &str) -> Result<()> {
        let url = format!(
            "{}/tables/{}/rows/{}/{}",
            self.base_url, table, partition, sort
        );
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.session_token)
            .send()
            .await
            .map_err(|e| Error::operation("delete", e.to_string()))?;

        Self::check("delete", response).await.map(|_| ())
    }
}

/// Connector producing [`HttpTableTransport`]s.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: String,
}

impl HttpConnector {
    /// Create a connector for the given service URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TableConnector for HttpConnector {
    async fn connect(&self, credentials: Credentials) -> Result<Arc<dyn TableTransport>> {
        Ok(Arc::new(HttpTableTransport::new(
            &self.base_url,
            &credentials,
        )?))
    }
}

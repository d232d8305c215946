//! The credential supplier seam.
//!
//! The core never performs a credential exchange itself; it asks an injected
//! [`CredentialProvider`] for temporary credentials when establishing the
//! table connection. Expiry handling beyond what the supplier guarantees is
//! out of scope.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::Result;

/// Temporary credentials for the remote table.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Access key id.
    pub access_key: String,
    /// Secret key.
    pub secret: String,
    /// Session token presented to the table service.
    pub session_token: String,
    /// When the credentials expire, if the supplier reports it.
    pub expires_at: Option<OffsetDateTime>,
}

/// Supplier of temporary credentials, injected into the store.
///
/// The first resolution may be slow and may fail; the store only calls it
/// when establishing (or re-establishing) the connection.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve credentials for the current user identity.
    async fn resolve(&self) -> Result<Credentials>;
}

/// Fixed credentials, for tests and development setups.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Wrap a fixed set of credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn resolve(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }
}

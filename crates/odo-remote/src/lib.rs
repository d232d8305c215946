//! Remote persistence for the odo vehicle service tracker.
//!
//! This crate owns the connection to the remote partitioned key-value table
//! and the entity operations on top of it:
//!
//! - Lazy, memoized, single-flight connection establishment against an
//!   injected credential supplier
//! - Whole-row put/query/delete keyed by (user identity, entity id)
//!   (metadata vs. item rows share one table, split by a sort-key sentinel)
//! - Best-effort wipe with aggregate failure reporting
//!
//! Failures are surfaced, never retried internally. The only silent drop is
//! row-level decode skipping, which is still inspectable via
//! [`FetchOutcome::skipped`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use odo_remote::{Credentials, HttpConnector, RemoteStore, StaticCredentials};
//!
//! # async fn example() -> odo_remote::Result<()> {
//! let credentials = Arc::new(StaticCredentials::new(Credentials {
//!     access_key: "AK".into(),
//!     secret: "SK".into(),
//!     session_token: "token".into(),
//!     expires_at: None,
//! }));
//! let connector = Arc::new(HttpConnector::new("https://table.example.com"));
//! let store = RemoteStore::new("GarageUserData", "user-1", credentials, connector);
//!
//! let fetched = store.query_all().await?;
//! println!("{} items", fetched.items.len());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod mock;
pub mod store;
pub mod transport;

pub use credentials::{CredentialProvider, Credentials, StaticCredentials};
pub use error::{Error, Result};
pub use mock::{MockConnector, MockTableTransport};
pub use store::{FetchOutcome, RemoteStore, SkippedRow};
pub use transport::{HttpConnector, HttpTableTransport, TableConnector, TableTransport};

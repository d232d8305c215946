//! Prediction and orchestration for the odo vehicle service tracker.
//!
//! This crate turns the raw domain state into actionable output:
//!
//! - [`estimator`]: converts the odometer sample log into a daily usage
//!   rate over a 90-day trailing window
//! - [`scheduler`]: projects per-item due dates from that rate and derives
//!   the full reminder set, replaced wholesale on an injected sink
//! - [`garage`]: the in-memory source of truth that routes every mutation
//!   to remote persistence (best-effort, observable via [`status`]) and to
//!   a reminder rebuild
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use odo_core::{GarageStore, mock::RecordingSink};
//! use odo_remote::{Credentials, HttpConnector, RemoteStore, StaticCredentials};
//! use odo_store::LocalStore;
//!
//! # async fn example() -> odo_core::Result<()> {
//! let remote = Arc::new(RemoteStore::new(
//!     "GarageUserData",
//!     "user-1",
//!     Arc::new(StaticCredentials::new(Credentials {
//!         access_key: "AK".into(),
//!         secret: "SK".into(),
//!         session_token: "token".into(),
//!         expires_at: None,
//!     })),
//!     Arc::new(HttpConnector::new("https://table.example.com")),
//! ));
//! let garage = GarageStore::new(remote, LocalStore::open_default()?, Arc::new(RecordingSink::new()));
//!
//! let summary = garage.load().await?;
//! println!("{} items", summary.items);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod estimator;
pub mod garage;
pub mod mock;
pub mod scheduler;
pub mod status;

pub use error::{Error, Result};
pub use estimator::{DEFAULT_DAILY_RATE, RATE_WINDOW_DAYS, RateEstimate, estimate_daily_rate};
pub use garage::{GarageStore, LoadSummary};
pub use scheduler::{Reminder, ReminderSink, build_reminder_set, replace_reminders};
pub use status::{StatusDispatcher, StatusReceiver, SyncStatus};

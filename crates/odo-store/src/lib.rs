//! Local persistence for the odo vehicle service tracker.
//!
//! The odometer sample log never travels to the remote table; it lives in a
//! small SQLite key-value store on the device, serialized as a single JSON
//! blob under one fixed key. This keeps the rate estimator's input available
//! offline and independent of remote consistency.
//!
//! # Example
//!
//! ```no_run
//! use odo_store::LocalStore;
//!
//! let store = LocalStore::open_default()?;
//! let log = store.load_odometer_log()?;
//! println!("{} samples", log.len());
//! # Ok::<(), odo_store::Error>(())
//! ```

mod error;
mod schema;
mod store;

pub use error::{Error, Result};
pub use store::{LocalStore, ODOMETER_LOG_KEY};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/odo/local.db`
/// - macOS: `~/Library/Application Support/odo/local.db`
/// - Windows: `C:\Users\<user>\AppData\Local\odo\local.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("odo")
        .join("local.db")
}

//! Domain types for the odo vehicle service tracker.
//!
//! This crate provides the shared vocabulary used by the remote table
//! client, the local sample log, and the prediction engine:
//!
//! - Domain records: vehicle profile, maintenance items, service events,
//!   odometer samples
//! - The generic attribute representation ([`AttrValue`]/[`AttrMap`]) used
//!   by the schemaless remote table
//! - The pure codec between the two, with its lenient decode rules
//!
//! # Example
//!
//! ```
//! use odo_types::{ItemKind, ServiceEvent, ServiceItem, codec};
//! use time::OffsetDateTime;
//!
//! let item = ServiceItem::new(
//!     "Oil Change",
//!     5000,
//!     ItemKind::Maintenance,
//!     vec![ServiceEvent::new(OffsetDateTime::UNIX_EPOCH, 10_000)],
//! );
//!
//! let row = codec::encode_item("user-1", &item);
//! let back = codec::decode_item(&row).unwrap();
//! assert_eq!(back, item);
//! ```

pub mod attrs;
pub mod codec;
pub mod error;
pub mod types;

pub use attrs::{AttrMap, AttrValue};
pub use error::{DecodeError, DecodeResult};
pub use types::{ItemKind, OdometerSample, ServiceEvent, ServiceItem, Vehicle};

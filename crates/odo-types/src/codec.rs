//! Bidirectional mapping between domain records and the table's generic
//! attribute representation.
//!
//! Pure, no I/O. Decode is deliberately lenient where the data loses
//! precision rather than shape:
//!
//! - a required attribute that is absent or of the wrong variant fails the
//!   whole record;
//! - a numeric attribute of the right variant but with malformed content
//!   collapses to `0` and the record is kept;
//! - a malformed history entry is dropped (debug-logged) and the remaining
//!   entries are kept, re-sorted newest-first.
//!
//! The vehicle row and item rows share one table and are told apart by the
//! reserved sort-key value [`VEHICLE_SORT_KEY`], not by a type tag in the
//! payload; that dispatch happens in the remote store, one level up.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;
use uuid::Uuid;

use crate::attrs::{AttrMap, AttrValue};
use crate::error::DecodeError;
use crate::types::{ItemKind, ServiceEvent, ServiceItem, Vehicle};

/// Partition key attribute; its value is the user identity.
pub const ATTR_PARTITION: &str = "userId";
/// Sort key attribute; an item id, or [`VEHICLE_SORT_KEY`] for the vehicle.
pub const ATTR_SORT: &str = "itemId";
/// Reserved sort-key value identifying the single vehicle-profile row.
pub const VEHICLE_SORT_KEY: &str = "CAR_METADATA";

pub const ATTR_TITLE: &str = "title";
pub const ATTR_INTERVAL: &str = "intervalMileage";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_HISTORY: &str = "history";
pub const ATTR_MAKE: &str = "make";
pub const ATTR_MODEL: &str = "model";
pub const ATTR_YEAR: &str = "year";
pub const ATTR_MILEAGE: &str = "currentMileage";
pub const ATTR_UPDATED: &str = "lastUpdated";

const EVENT_ID: &str = "id";
const EVENT_DATE: &str = "date";
const EVENT_MILEAGE: &str = "mileage";

/// Serialize a maintenance item into a full table row.
#[must_use]
pub fn encode_item(user_id: &str, item: &ServiceItem) -> AttrMap {
    let mut history = Vec::with_capacity(item.history.len());
    for event in &item.history {
        let mut entry = AttrMap::new();
        entry.insert(EVENT_ID.to_string(), AttrValue::s(event.id.to_string()));
        entry.insert(EVENT_DATE.to_string(), encode_timestamp(event.date));
        entry.insert(EVENT_MILEAGE.to_string(), AttrValue::n(event.mileage));
        history.push(AttrValue::M(entry));
    }

    let mut row = AttrMap::new();
    row.insert(ATTR_PARTITION.to_string(), AttrValue::s(user_id));
    row.insert(ATTR_SORT.to_string(), AttrValue::s(item.id.to_string()));
    row.insert(ATTR_TITLE.to_string(), AttrValue::s(item.title.as_str()));
    row.insert(ATTR_INTERVAL.to_string(), AttrValue::n(item.interval_mileage));
    row.insert(ATTR_TYPE.to_string(), AttrValue::s(item.kind.as_wire()));
    row.insert(ATTR_HISTORY.to_string(), AttrValue::L(history));
    row
}

/// Deserialize a table row into a maintenance item.
///
/// # Errors
///
/// Fails the whole record if `title`, `itemId`, `type`, or
/// `intervalMileage` is absent or of the wrong variant, or if `itemId` is
/// not a UUID. Malformed history entries are dropped, not fatal.
pub fn decode_item(row: &AttrMap) -> Result<ServiceItem, DecodeError> {
    let title = require_s(row, ATTR_TITLE)?;
    let id_raw = require_s(row, ATTR_SORT)?;
    let id = Uuid::parse_str(id_raw).map_err(|_| DecodeError::InvalidId(id_raw.to_string()))?;

    let kind_raw = require_s(row, ATTR_TYPE)?;
    let kind = ItemKind::from_wire(kind_raw).unwrap_or_else(|| {
        debug!(value = kind_raw, "unknown entry kind, defaulting to maintenance");
        ItemKind::Maintenance
    });

    let interval = require_n(row, ATTR_INTERVAL)?;

    let mut history = Vec::new();
    if let Some(AttrValue::L(entries)) = row.get(ATTR_HISTORY) {
        for entry in entries {
            match decode_event(entry) {
                Some(event) => history.push(event),
                None => debug!(item = %id, "dropping malformed history entry"),
            }
        }
    }

    // with_id re-sorts the surviving entries newest-first.
    Ok(ServiceItem::with_id(id, title, interval, kind, history))
}

/// Serialize the vehicle profile into its reserved metadata row.
#[must_use]
pub fn encode_vehicle(user_id: &str, vehicle: &Vehicle) -> AttrMap {
    let mut row = AttrMap::new();
    row.insert(ATTR_PARTITION.to_string(), AttrValue::s(user_id));
    row.insert(ATTR_SORT.to_string(), AttrValue::s(VEHICLE_SORT_KEY));
    row.insert(ATTR_MAKE.to_string(), AttrValue::s(vehicle.make.as_str()));
    row.insert(ATTR_MODEL.to_string(), AttrValue::s(vehicle.model.as_str()));
    row.insert(ATTR_YEAR.to_string(), AttrValue::s(vehicle.year.as_str()));
    row.insert(ATTR_MILEAGE.to_string(), AttrValue::n(vehicle.current_mileage));
    row.insert(ATTR_UPDATED.to_string(), encode_timestamp(vehicle.last_updated));
    row
}

/// Deserialize the metadata row into a vehicle profile.
///
/// `now` is the fallback for an absent or unparseable `lastUpdated`; it is
/// passed in rather than read from the clock so the codec stays pure.
///
/// # Errors
///
/// Fails if `make`, `model`, or `year` is absent or of the wrong variant.
/// `currentMileage` defaults to `0` and `lastUpdated` to `now`.
pub fn decode_vehicle(row: &AttrMap, now: OffsetDateTime) -> Result<Vehicle, DecodeError> {
    let make = require_s(row, ATTR_MAKE)?.to_string();
    let model = require_s(row, ATTR_MODEL)?.to_string();
    let year = require_s(row, ATTR_YEAR)?.to_string();

    let current_mileage = match row.get(ATTR_MILEAGE) {
        Some(AttrValue::N(raw)) => parse_decimal(ATTR_MILEAGE, raw),
        _ => 0,
    };

    let last_updated = row
        .get(ATTR_UPDATED)
        .and_then(AttrValue::as_s)
        .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
        .unwrap_or(now);

    Ok(Vehicle {
        year,
        make,
        model,
        current_mileage,
        last_updated,
    })
}

fn decode_event(entry: &AttrValue) -> Option<ServiceEvent> {
    let map = entry.as_m()?;

    let date_raw = map.get(EVENT_DATE)?.as_s()?;
    let date = OffsetDateTime::parse(date_raw, &Rfc3339).ok()?;

    let mileage_raw = map.get(EVENT_MILEAGE)?.as_n()?;
    let mileage = parse_decimal(EVENT_MILEAGE, mileage_raw);

    // A missing or mangled event id does not cost us the entry; it gets a
    // fresh one. Present valid ids round-trip untouched.
    let id = map
        .get(EVENT_ID)
        .and_then(AttrValue::as_s)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(Uuid::new_v4);

    Some(ServiceEvent { id, date, mileage })
}

fn encode_timestamp(ts: OffsetDateTime) -> AttrValue {
    // RFC 3339 formatting only fails for years outside 0..=9999, which no
    // reachable timestamp in this domain produces.
    AttrValue::S(ts.format(&Rfc3339).expect("timestamp formats as RFC 3339"))
}

fn require_s<'a>(row: &'a AttrMap, name: &'static str) -> Result<&'a str, DecodeError> {
    match row.get(name) {
        Some(AttrValue::S(s)) => Ok(s),
        Some(_) => Err(DecodeError::WrongType(name)),
        None => Err(DecodeError::MissingAttribute(name)),
    }
}

fn require_n(row: &AttrMap, name: &'static str) -> Result<i64, DecodeError> {
    match row.get(name) {
        Some(AttrValue::N(raw)) => Ok(parse_decimal(name, raw)),
        Some(_) => Err(DecodeError::WrongType(name)),
        None => Err(DecodeError::MissingAttribute(name)),
    }
}

fn parse_decimal(name: &'static str, raw: &str) -> i64 {
    raw.parse().unwrap_or_else(|_| {
        debug!(attribute = name, value = raw, "malformed decimal string, using 0");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_item() -> ServiceItem {
        ServiceItem::new(
            "Oil Change",
            5000,
            ItemKind::Maintenance,
            vec![
                ServiceEvent::new(datetime!(2026-01-10 09:00 UTC), 10_000),
                ServiceEvent::new(datetime!(2025-08-02 14:30 UTC), 5_100),
            ],
        )
    }

    #[test]
    fn item_roundtrip() {
        let item = sample_item();
        let row = encode_item("user-1", &item);

        assert_eq!(row.get(ATTR_PARTITION), Some(&AttrValue::s("user-1")));
        assert_eq!(
            row.get(ATTR_SORT).and_then(AttrValue::as_s),
            Some(item.id.to_string().as_str())
        );

        let back = decode_item(&row).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn vehicle_roundtrip() {
        let vehicle = Vehicle {
            year: "2023".to_string(),
            make: "Acura".to_string(),
            model: "Integra Type S".to_string(),
            current_mileage: 12_570,
            last_updated: datetime!(2026-02-01 18:00 UTC),
        };

        let row = encode_vehicle("user-1", &vehicle);
        assert_eq!(row.get(ATTR_SORT), Some(&AttrValue::s(VEHICLE_SORT_KEY)));

        let back = decode_vehicle(&row, datetime!(2026-03-01 00:00 UTC)).unwrap();
        assert_eq!(back, vehicle);
    }

    #[test]
    fn malformed_history_entry_is_dropped_not_fatal() {
        let item = sample_item();
        let mut row = encode_item("user-1", &item);

        // Corrupt the date of one entry; the other must survive.
        if let Some(AttrValue::L(entries)) = row.get_mut(ATTR_HISTORY)
            && let Some(AttrValue::M(map)) = entries.first_mut()
        {
            map.insert("date".to_string(), AttrValue::s("not-a-date"));
        }

        let back = decode_item(&row).unwrap();
        assert_eq!(back.history.len(), 1);
        assert_eq!(back.history[0].mileage, 5_100);
    }

    #[test]
    fn history_resorted_newest_first_after_decode() {
        let item = sample_item();
        let mut row = encode_item("user-1", &item);

        // Reverse the wire order; decode must not trust it.
        if let Some(AttrValue::L(entries)) = row.get_mut(ATTR_HISTORY) {
            entries.reverse();
        }

        let back = decode_item(&row).unwrap();
        assert_eq!(back.history[0].mileage, 10_000);
        assert_eq!(back.history[1].mileage, 5_100);
    }

    #[test]
    fn malformed_interval_string_decodes_as_zero() {
        let mut row = encode_item("user-1", &sample_item());
        row.insert(ATTR_INTERVAL.to_string(), AttrValue::N("5k".to_string()));

        let back = decode_item(&row).unwrap();
        assert_eq!(back.interval_mileage, 0);
    }

    #[test]
    fn missing_title_fails_the_record() {
        let mut row = encode_item("user-1", &sample_item());
        row.remove(ATTR_TITLE);

        assert!(matches!(
            decode_item(&row),
            Err(DecodeError::MissingAttribute(ATTR_TITLE))
        ));
    }

    #[test]
    fn wrong_variant_interval_fails_the_record() {
        let mut row = encode_item("user-1", &sample_item());
        row.insert(ATTR_INTERVAL.to_string(), AttrValue::s("5000"));

        assert!(matches!(
            decode_item(&row),
            Err(DecodeError::WrongType(ATTR_INTERVAL))
        ));
    }

    #[test]
    fn bad_item_id_fails_the_record() {
        let mut row = encode_item("user-1", &sample_item());
        row.insert(ATTR_SORT.to_string(), AttrValue::s("not-a-uuid"));

        assert!(matches!(decode_item(&row), Err(DecodeError::InvalidId(_))));
    }

    #[test]
    fn unknown_kind_defaults_to_maintenance() {
        let mut row = encode_item("user-1", &sample_item());
        row.insert(ATTR_TYPE.to_string(), AttrValue::s("Upgrade"));

        let back = decode_item(&row).unwrap();
        assert_eq!(back.kind, ItemKind::Maintenance);
    }

    #[test]
    fn vehicle_defaults_for_optional_fields() {
        let now = datetime!(2026-03-01 00:00 UTC);
        let mut row = encode_vehicle(
            "user-1",
            &Vehicle {
                year: "2019".to_string(),
                make: "Mazda".to_string(),
                model: "MX-5".to_string(),
                current_mileage: 44_000,
                last_updated: datetime!(2026-01-01 00:00 UTC),
            },
        );
        row.remove(ATTR_MILEAGE);
        row.insert(ATTR_UPDATED.to_string(), AttrValue::s("yesterday"));

        let back = decode_vehicle(&row, now).unwrap();
        assert_eq!(back.current_mileage, 0);
        assert_eq!(back.last_updated, now);
    }

    #[test]
    fn vehicle_missing_make_fails() {
        let mut row = encode_vehicle("user-1", &Vehicle::blank(datetime!(2026-01-01 00:00 UTC)));
        row.remove(ATTR_MAKE);

        assert!(matches!(
            decode_vehicle(&row, datetime!(2026-01-01 00:00 UTC)),
            Err(DecodeError::MissingAttribute(ATTR_MAKE))
        ));
    }

    #[test]
    fn event_without_id_gets_a_generated_one() {
        let mut row = encode_item("user-1", &sample_item());
        if let Some(AttrValue::L(entries)) = row.get_mut(ATTR_HISTORY)
            && let Some(AttrValue::M(map)) = entries.first_mut()
        {
            map.remove("id");
        }

        let back = decode_item(&row).unwrap();
        // Both entries kept; the stripped one has a fresh id.
        assert_eq!(back.history.len(), 2);
    }
}

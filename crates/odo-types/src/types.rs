//! Core domain types for the odo vehicle service tracker.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Kind of tracked entry.
///
/// Maintenance items recur on a distance interval and participate in due-date
/// prediction; modifications are one-off installs that are never "due".
///
/// This enum is marked `#[non_exhaustive]` to allow adding new entry kinds
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ItemKind {
    /// Recurring service (oil change, brake pads, ...).
    Maintenance,
    /// One-off modification (exhaust, coilovers, ...).
    Modification,
}

impl ItemKind {
    /// The stable wire string stored in the remote table's `type` attribute.
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            ItemKind::Maintenance => "Maintenance",
            ItemKind::Modification => "Modification",
        }
    }

    /// Parse a wire string back into an `ItemKind`.
    ///
    /// Returns `None` for unknown values; callers decide the fallback
    /// (the codec defaults to [`ItemKind::Maintenance`]).
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "Maintenance" => Some(ItemKind::Maintenance),
            "Modification" => Some(ItemKind::Modification),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A single service event in an item's history.
///
/// Events are immutable once recorded: history only ever grows by appending,
/// and an event's odometer reading and date never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEvent {
    /// Generated unique identifier, stable for the event's lifetime.
    pub id: Uuid,
    /// When the service was performed.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Odometer reading at the time of the event, in kilometers.
    pub mileage: i64,
}

impl ServiceEvent {
    /// Create a new event with a generated id.
    #[must_use]
    pub fn new(date: OffsetDateTime, mileage: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            mileage,
        }
    }
}

/// A tracked maintenance item or modification.
///
/// The `title` doubles as a natural dedup key: callers match it
/// case-insensitively when deciding whether to append to an existing item or
/// create a new one.
///
/// # Invariant
///
/// `history` is kept sorted newest-first after any mutation. Both
/// constructors and [`record_event`](Self::record_event) re-sort, so
/// arbitrary insert order never leaks out. Derived fields are nevertheless
/// computed from the maximum-date event, not from the list head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Generated unique identifier; also the remote row's sort key.
    pub id: Uuid,
    /// Free-text title.
    pub title: String,
    /// Service interval in kilometers. Only meaningful for
    /// [`ItemKind::Maintenance`].
    pub interval_mileage: i64,
    /// Whether this is recurring maintenance or a one-off modification.
    pub kind: ItemKind,
    /// Service history, newest-first.
    pub history: Vec<ServiceEvent>,
}

impl ServiceItem {
    /// Create a new item with a generated id.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        interval_mileage: i64,
        kind: ItemKind,
        history: Vec<ServiceEvent>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, interval_mileage, kind, history)
    }

    /// Create an item with a known id (e.g. when decoding a remote row).
    #[must_use]
    pub fn with_id(
        id: Uuid,
        title: impl Into<String>,
        interval_mileage: i64,
        kind: ItemKind,
        mut history: Vec<ServiceEvent>,
    ) -> Self {
        history.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            id,
            title: title.into(),
            interval_mileage,
            kind,
            history,
        }
    }

    /// Append a service event, keeping the history sorted newest-first.
    pub fn record_event(&mut self, event: ServiceEvent) {
        self.history.push(event);
        self.history.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Odometer reading at the most recent service, by event date.
    #[must_use]
    pub fn last_service_mileage(&self) -> Option<i64> {
        self.history.iter().max_by_key(|e| e.date).map(|e| e.mileage)
    }

    /// Date of the most recent service.
    #[must_use]
    pub fn last_service_date(&self) -> Option<OffsetDateTime> {
        self.history.iter().map(|e| e.date).max()
    }

    /// Odometer reading at which the next service falls due, or `None` if
    /// the item has no recorded history yet.
    #[must_use]
    pub fn next_due_mileage(&self) -> Option<i64> {
        self.last_service_mileage()
            .map(|last| last + self.interval_mileage)
    }

    /// Kilometers left until the next service, measured from the last
    /// recorded service point (negative when overdue).
    ///
    /// An item with no history counts from odometer zero. Note that the
    /// reminder scheduler uses a different, cyclic computation
    /// (`interval - current % interval`); the two intentionally coexist.
    #[must_use]
    pub fn remaining_distance(&self, current_odometer: i64) -> i64 {
        let last = self.last_service_mileage().unwrap_or(0);
        last + self.interval_mileage - current_odometer
    }

    /// Whether the item is past its next due point.
    #[must_use]
    pub fn is_overdue(&self, current_odometer: i64) -> bool {
        self.remaining_distance(current_odometer) < 0
    }
}

/// The user's vehicle profile.
///
/// One per user, stored in the remote table under the reserved metadata
/// sort key. Never deleted except by a full wipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Model year, free text.
    pub year: String,
    /// Manufacturer, free text.
    pub make: String,
    /// Model name, free text.
    pub model: String,
    /// Current odometer reading in kilometers. Intended to be monotonic
    /// non-decreasing, but not enforced.
    pub current_mileage: i64,
    /// When the odometer or profile was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl Vehicle {
    /// A blank profile, used before onboarding and after a full reset.
    #[must_use]
    pub fn blank(now: OffsetDateTime) -> Self {
        Self {
            year: String::new(),
            make: String::new(),
            model: String::new(),
            current_mileage: 0,
            last_updated: now,
        }
    }
}

/// One odometer reading, recorded whenever the user updates their mileage.
///
/// Samples live in a local append-only log (oldest-first), independent of
/// the remote table, and feed only the usage-rate estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdometerSample {
    /// When the reading was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The odometer value in kilometers.
    pub kilometers: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn event(date: OffsetDateTime, mileage: i64) -> ServiceEvent {
        ServiceEvent::new(date, mileage)
    }

    #[test]
    fn history_sorted_newest_first_on_construction() {
        let item = ServiceItem::new(
            "Oil Change",
            5000,
            ItemKind::Maintenance,
            vec![
                event(datetime!(2026-01-01 00:00 UTC), 10_000),
                event(datetime!(2026-03-01 00:00 UTC), 12_000),
                event(datetime!(2026-02-01 00:00 UTC), 11_000),
            ],
        );

        let dates: Vec<_> = item.history.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                datetime!(2026-03-01 00:00 UTC),
                datetime!(2026-02-01 00:00 UTC),
                datetime!(2026-01-01 00:00 UTC),
            ]
        );
    }

    #[test]
    fn record_event_keeps_order() {
        let mut item = ServiceItem::new(
            "Oil Change",
            5000,
            ItemKind::Maintenance,
            vec![event(datetime!(2026-03-01 00:00 UTC), 12_000)],
        );

        // An older event appended later must not become the head.
        item.record_event(event(datetime!(2025-12-01 00:00 UTC), 8_000));

        assert_eq!(item.history[0].date, datetime!(2026-03-01 00:00 UTC));
        assert_eq!(item.history[1].date, datetime!(2025-12-01 00:00 UTC));
    }

    #[test]
    fn derived_fields_use_max_date_not_position() {
        let mut item = ServiceItem::new("Brakes", 60_000, ItemKind::Maintenance, Vec::new());
        // Bypass the sorting constructor to simulate arbitrary order.
        item.history = vec![
            event(datetime!(2025-06-01 00:00 UTC), 40_000),
            event(datetime!(2026-01-01 00:00 UTC), 55_000),
        ];

        assert_eq!(item.last_service_mileage(), Some(55_000));
        assert_eq!(item.last_service_date(), Some(datetime!(2026-01-01 00:00 UTC)));
        assert_eq!(item.next_due_mileage(), Some(115_000));
    }

    #[test]
    fn next_due_is_none_without_history() {
        let item = ServiceItem::new("Coolant", 40_000, ItemKind::Maintenance, Vec::new());
        assert_eq!(item.last_service_mileage(), None);
        assert_eq!(item.next_due_mileage(), None);
    }

    #[test]
    fn remaining_distance_additive_formula() {
        let item = ServiceItem::new(
            "Oil Change",
            5000,
            ItemKind::Maintenance,
            vec![event(datetime!(2026-01-01 00:00 UTC), 10_000)],
        );

        assert_eq!(item.remaining_distance(12_000), 3000);
        assert!(!item.is_overdue(12_000));
        assert_eq!(item.remaining_distance(15_500), -500);
        assert!(item.is_overdue(15_500));
    }

    #[test]
    fn item_kind_wire_roundtrip() {
        assert_eq!(ItemKind::from_wire("Maintenance"), Some(ItemKind::Maintenance));
        assert_eq!(ItemKind::from_wire("Modification"), Some(ItemKind::Modification));
        assert_eq!(ItemKind::from_wire("Upgrade"), None);
        assert_eq!(ItemKind::Modification.as_wire(), "Modification");
    }

    #[test]
    fn odometer_sample_serializes_rfc3339() {
        let sample = OdometerSample {
            date: datetime!(2026-02-14 08:30 UTC),
            kilometers: 12_570,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("2026-02-14T08:30:00Z"));
        assert!(json.contains("\"kilometers\":12570"));

        let back: OdometerSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}

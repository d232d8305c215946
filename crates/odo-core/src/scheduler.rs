//! Predictive reminder scheduling.
//!
//! Given the tracked items, the current odometer, and a daily usage rate,
//! this module derives the complete set of timed reminders. The set is a
//! pure function of its inputs and is always replaced wholesale on the sink
//! (clear, then install) — never patched incrementally.

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use odo_types::{ItemKind, ServiceItem};

use crate::error::Result;
use crate::estimator::DEFAULT_DAILY_RATE;

/// Identifier of the standing "update your odometer" nudge.
pub const NUDGE_ID: &str = "odometer_nudge";

/// How far ahead of a due date the advance warning fires.
pub const ADVANCE_WARNING: Duration = Duration::days(7);

/// Delay of the standing odometer nudge.
pub const NUDGE_DELAY: Duration = Duration::days(7);

/// Minimum positive delay for a reminder that is due right now.
pub const MIN_FIRE_DELAY: Duration = Duration::seconds(1);

/// A single timed notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// Stable identifier (`due_<item>`, `warn_<item>`, or [`NUDGE_ID`]).
    pub id: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// When the notice fires.
    pub fire_at: OffsetDateTime,
}

/// Destination for scheduled reminders, injected into the core.
///
/// Implementations wrap whatever notification runtime the platform
/// provides; the core only ever asks to schedule a notice or to drop every
/// previously scheduled one.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Schedule one timed notice.
    async fn schedule(&self, reminder: Reminder) -> Result<()>;

    /// Cancel every previously scheduled notice.
    async fn cancel_all(&self) -> Result<()>;
}

/// Derive the full reminder set for the given state.
///
/// Always contains the standing odometer nudge, plus per maintenance item
/// (modifications never generate reminders) a "due" notice and, when the
/// projection is more than a week out, an advance warning.
///
/// A rate of exactly zero falls back to [`DEFAULT_DAILY_RATE`] so a due
/// date is always finite.
#[must_use]
pub fn build_reminder_set(
    items: &[ServiceItem],
    current_mileage: i64,
    daily_rate: f64,
    now: OffsetDateTime,
) -> Vec<Reminder> {
    let mut set = vec![odometer_nudge(now)];

    let effective_rate = if daily_rate > 0.0 {
        daily_rate
    } else {
        DEFAULT_DAILY_RATE
    };

    for item in items {
        if item.kind != ItemKind::Maintenance {
            continue;
        }
        if item.interval_mileage <= 0 {
            debug!(item = %item.id, "skipping item without a positive interval");
            continue;
        }

        // Cyclic distance to the next interval boundary. This intentionally
        // ignores the item's own last-service point; the additive
        // last-service view lives on ServiceItem::remaining_distance.
        let remaining = item.interval_mileage - current_mileage.rem_euclid(item.interval_mileage);
        let days_until_due = remaining as f64 / effective_rate;

        set.extend(item_reminders(item, days_until_due, now));
    }

    set
}

fn item_reminders(item: &ServiceItem, days_until_due: f64, now: OffsetDateTime) -> Vec<Reminder> {
    if days_until_due <= 0.0 {
        // Overdue (or due right now): fire as soon as the sink allows.
        return vec![Reminder {
            id: format!("due_{}", item.id),
            title: format!("Service Overdue: {}", item.title),
            body: "This item is overdue, service immediately!".to_string(),
            fire_at: now + MIN_FIRE_DELAY,
        }];
    }

    let until_due = Duration::seconds_f64(days_until_due * 86_400.0);
    let due_at = now + until_due;

    let mut reminders = vec![Reminder {
        id: format!("due_{}", item.id),
        title: format!("Service Due: {}", item.title),
        body: "Based on your driving, this service may be due today.".to_string(),
        fire_at: due_at,
    }];

    if until_due > ADVANCE_WARNING {
        reminders.push(Reminder {
            id: format!("warn_{}", item.id),
            title: format!("Upcoming: {}", item.title),
            body: "Based on your driving, this service is due in less than a week.".to_string(),
            fire_at: due_at - ADVANCE_WARNING,
        });
    }

    reminders
}

fn odometer_nudge(now: OffsetDateTime) -> Reminder {
    Reminder {
        id: NUDGE_ID.to_string(),
        title: "Update your Odometer".to_string(),
        body: "It's been a week! Update your mileage to keep predictions accurate.".to_string(),
        fire_at: now + NUDGE_DELAY,
    }
}

/// Atomically swap the sink's scheduled set for `set`.
///
/// Two-phase: every previously scheduled notice is cancelled before the new
/// set is installed, so the sink never holds a mix of old and new state.
pub async fn replace_reminders(sink: &dyn ReminderSink, set: &[Reminder]) -> Result<()> {
    sink.cancel_all().await?;
    for reminder in set {
        sink.schedule(reminder.clone()).await?;
    }
    debug!(count = set.len(), "reminder set replaced");
    Ok(())
}

//! Mock reminder sink for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::scheduler::{Reminder, ReminderSink};

/// One operation the sink received.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    /// Every pending notice was cancelled.
    CancelAll,
    /// A notice was scheduled.
    Schedule(Reminder),
}

/// A [`ReminderSink`] that records every call for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    ops: Mutex<Vec<SinkOp>>,
    should_fail: AtomicBool,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent schedule/cancel calls fail.
    pub fn set_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Every operation received, in order.
    pub fn ops(&self) -> Vec<SinkOp> {
        self.ops.lock().unwrap().clone()
    }

    /// The currently installed reminder set: everything scheduled since the
    /// most recent cancel.
    pub fn installed(&self) -> Vec<Reminder> {
        let ops = self.ops.lock().unwrap();
        let start = ops
            .iter()
            .rposition(|op| *op == SinkOp::CancelAll)
            .map_or(0, |i| i + 1);
        ops[start..]
            .iter()
            .filter_map(|op| match op {
                SinkOp::Schedule(r) => Some(r.clone()),
                SinkOp::CancelAll => None,
            })
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            Err(Error::sink("injected sink failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReminderSink for RecordingSink {
    async fn schedule(&self, reminder: Reminder) -> Result<()> {
        self.check()?;
        self.ops.lock().unwrap().push(SinkOp::Schedule(reminder));
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        self.check()?;
        self.ops.lock().unwrap().push(SinkOp::CancelAll);
        Ok(())
    }
}

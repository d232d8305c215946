//! The garage store: in-memory source of truth and mutation router.
//!
//! Owns the vehicle profile, the item list, and the odometer sample log.
//! Every mutation updates local state synchronously, kicks persistence off
//! in the background (outcome observable on the status channel), and
//! re-derives the usage rate and the full reminder set — the reminder set
//! never reflects stale inputs.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use odo_remote::RemoteStore;
use odo_store::LocalStore;
use odo_types::{ItemKind, OdometerSample, ServiceEvent, ServiceItem, Vehicle};

use crate::error::Result;
use crate::estimator::{RateEstimate, estimate_daily_rate};
use crate::scheduler::{ReminderSink, build_reminder_set, replace_reminders};
use crate::status::{StatusDispatcher, StatusReceiver, SyncStatus};

/// Counts reported by [`GarageStore::load`].
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary {
    /// How many items were adopted.
    pub items: usize,
    /// Whether a vehicle profile row was found.
    pub vehicle_found: bool,
    /// Remote rows dropped by decode.
    pub skipped_rows: usize,
}

struct GarageState {
    vehicle: Vehicle,
    items: Vec<ServiceItem>,
    /// Odometer log, oldest-first.
    samples: Vec<OdometerSample>,
}

/// The single logical owner of domain state.
///
/// All mutations are expected to originate from one control flow at a time
/// (one active user session); the locks exist so background saves and
/// readers can overlap safely, not to arbitrate concurrent writers.
pub struct GarageStore {
    remote: Arc<RemoteStore>,
    local: Arc<Mutex<LocalStore>>,
    sink: Arc<dyn ReminderSink>,
    state: RwLock<GarageState>,
    status: StatusDispatcher,
}

impl GarageStore {
    /// Create a store with a blank vehicle profile.
    pub fn new(remote: Arc<RemoteStore>, local: LocalStore, sink: Arc<dyn ReminderSink>) -> Self {
        Self {
            remote,
            local: Arc::new(Mutex::new(local)),
            sink,
            state: RwLock::new(GarageState {
                vehicle: Vehicle::blank(OffsetDateTime::now_utc()),
                items: Vec::new(),
                samples: Vec::new(),
            }),
            status: StatusDispatcher::default(),
        }
    }

    /// Subscribe to persistence status events.
    pub fn status(&self) -> StatusReceiver {
        self.status.subscribe()
    }

    /// The current vehicle profile (last-known local state, no I/O).
    pub async fn vehicle(&self) -> Vehicle {
        self.state.read().await.vehicle.clone()
    }

    /// The current item list (last-known local state, no I/O).
    pub async fn items(&self) -> Vec<ServiceItem> {
        self.state.read().await.items.clone()
    }

    /// The current usage estimate over the in-memory sample log.
    pub async fn usage(&self, now: OffsetDateTime) -> RateEstimate {
        let state = self.state.read().await;
        estimate_daily_rate(&state.samples, now)
    }

    /// Fetch remote state and the local sample log, adopt both, and rebuild
    /// the reminder set.
    ///
    /// Remote rows that fail to decode are dropped, not fatal; their count
    /// is reported in the summary.
    pub async fn load(&self) -> Result<LoadSummary> {
        self.status.send(SyncStatus::Loading);

        let fetched = match self.remote.query_all().await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.status.send(SyncStatus::Failed {
                    operation: "load",
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };
        let samples = self.local.lock().await.load_odometer_log()?;

        let vehicle_found = fetched.vehicle.is_some();
        let summary = {
            let mut state = self.state.write().await;
            if let Some(vehicle) = fetched.vehicle {
                state.vehicle = vehicle;
            }
            state.items = fetched.items;
            state.samples = samples;
            LoadSummary {
                items: state.items.len(),
                vehicle_found,
                skipped_rows: fetched.skipped.len(),
            }
        };

        self.rebuild_reminders().await;
        self.status.send(SyncStatus::Loaded { items: summary.items });
        info!(
            items = summary.items,
            skipped = summary.skipped_rows,
            "garage state loaded"
        );
        Ok(summary)
    }

    /// Record a fresh odometer reading.
    ///
    /// Updates the vehicle, appends to the sample log (persisted locally,
    /// oldest-first even for backdated entries), saves the vehicle row in
    /// the background, and rebuilds reminders.
    pub async fn update_odometer(&self, date: OffsetDateTime, kilometers: i64) -> Result<()> {
        let (vehicle, samples) = {
            let mut state = self.state.write().await;
            state.vehicle.current_mileage = kilometers;
            state.vehicle.last_updated = date;
            state.samples.push(OdometerSample { date, kilometers });
            state.samples.sort_by_key(|s| s.date);
            (state.vehicle.clone(), state.samples.clone())
        };

        self.local.lock().await.save_odometer_log(&samples)?;

        self.spawn_vehicle_save(vehicle);
        self.rebuild_reminders().await;
        Ok(())
    }

    /// Edit the vehicle profile.
    pub async fn update_vehicle_details(
        &self,
        year: &str,
        make: &str,
        model: &str,
        mileage: i64,
    ) -> Result<()> {
        let vehicle = {
            let mut state = self.state.write().await;
            state.vehicle.year = year.to_string();
            state.vehicle.make = make.to_string();
            state.vehicle.model = model.to_string();
            state.vehicle.current_mileage = mileage;
            state.vehicle.last_updated = OffsetDateTime::now_utc();
            state.vehicle.clone()
        };

        self.spawn_vehicle_save(vehicle);
        self.rebuild_reminders().await;
        Ok(())
    }

    /// Log a service, matching items by title case-insensitively.
    ///
    /// An existing item gains a history event (and, for maintenance, the
    /// new interval); otherwise a new item is created with the event as its
    /// initial history. Returns the id of the affected item.
    pub async fn add_or_update_item(
        &self,
        title: &str,
        date: OffsetDateTime,
        mileage: i64,
        interval: i64,
        kind: ItemKind,
    ) -> Result<Uuid> {
        let saved = {
            let mut state = self.state.write().await;
            let event = ServiceEvent::new(date, mileage);
            let needle = title.to_lowercase();

            match state
                .items
                .iter_mut()
                .find(|item| item.title.to_lowercase() == needle)
            {
                Some(item) => {
                    item.record_event(event);
                    if kind == ItemKind::Maintenance {
                        item.interval_mileage = interval;
                    }
                    item.clone()
                }
                None => {
                    let item = ServiceItem::new(title, interval, kind, vec![event]);
                    state.items.push(item.clone());
                    item
                }
            }
        };

        let id = saved.id;
        self.spawn_item_save(saved);
        self.rebuild_reminders().await;
        Ok(id)
    }

    /// Remove one item locally and from the remote table.
    pub async fn remove_item(&self, id: Uuid) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.items.retain(|item| item.id != id);
        }

        let remote = Arc::clone(&self.remote);
        let status = self.status.clone();
        tokio::spawn(async move {
            match remote.delete_item(id).await {
                Ok(()) => status.send(SyncStatus::Saved {
                    what: "deletion".to_string(),
                }),
                Err(e) => {
                    warn!(error = %e, item = %id, "remote delete failed");
                    status.send(SyncStatus::Failed {
                        operation: "delete",
                        message: e.to_string(),
                    });
                }
            }
        });

        self.rebuild_reminders().await;
        Ok(())
    }

    /// Wipe all remote data and reset local state.
    ///
    /// The remote wipe deletes row by row and is not atomic; local state is
    /// cleared only after every delete attempt has completed — even when
    /// some attempts failed, since the remote set is already partially
    /// gone. A partial failure is surfaced once, as the returned error.
    pub async fn reset_all(&self) -> Result<()> {
        self.status.send(SyncStatus::Wiping);
        let wipe = self.remote.wipe_all().await;

        {
            let mut state = self.state.write().await;
            state.items.clear();
            state.samples.clear();
            state.vehicle = Vehicle::blank(OffsetDateTime::now_utc());
        }
        if let Err(e) = self.local.lock().await.clear_odometer_log() {
            warn!(error = %e, "failed to clear local sample log");
        }
        self.rebuild_reminders().await;

        match wipe {
            Ok(()) => {
                self.status.send(SyncStatus::Wiped);
                info!("all data wiped");
                Ok(())
            }
            Err(e) => {
                self.status.send(SyncStatus::Failed {
                    operation: "reset",
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Recompute the reminder set from current state and replace the
    /// installed set wholesale.
    ///
    /// Sink failures are logged, not propagated: a mutation must not fail
    /// because a notice could not be scheduled.
    async fn rebuild_reminders(&self) {
        let now = OffsetDateTime::now_utc();
        let set = {
            let state = self.state.read().await;
            let estimate = estimate_daily_rate(&state.samples, now);
            build_reminder_set(&state.items, state.vehicle.current_mileage, estimate.rate, now)
        };

        if let Err(e) = replace_reminders(self.sink.as_ref(), &set).await {
            warn!(error = %e, "failed to replace reminder set");
        }
    }

    fn spawn_vehicle_save(&self, vehicle: Vehicle) {
        let remote = Arc::clone(&self.remote);
        let status = self.status.clone();
        tokio::spawn(async move {
            status.send(SyncStatus::Saving {
                what: "vehicle".to_string(),
            });
            match remote.put_vehicle(&vehicle).await {
                Ok(()) => status.send(SyncStatus::Saved {
                    what: "vehicle".to_string(),
                }),
                Err(e) => {
                    warn!(error = %e, "vehicle save failed");
                    status.send(SyncStatus::Failed {
                        operation: "save",
                        message: e.to_string(),
                    });
                }
            }
        });
    }

    fn spawn_item_save(&self, item: ServiceItem) {
        let remote = Arc::clone(&self.remote);
        let status = self.status.clone();
        tokio::spawn(async move {
            status.send(SyncStatus::Saving {
                what: item.title.clone(),
            });
            match remote.put_item(&item).await {
                Ok(()) => status.send(SyncStatus::Saved {
                    what: item.title.clone(),
                }),
                Err(e) => {
                    warn!(error = %e, item = %item.title, "item save failed");
                    status.send(SyncStatus::Failed {
                        operation: "save",
                        message: e.to_string(),
                    });
                }
            }
        });
    }
}

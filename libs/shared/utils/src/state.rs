use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use shared_config::AppConfig;

/// Shared router state: configuration plus the in-process per-professional
/// write locks the scheduling engine serializes on.
pub struct AppState {
    pub config: AppConfig,
    pub calendar_locks: CalendarLocks,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            calendar_locks: CalendarLocks::new(),
        }
    }

    pub fn shared(config: AppConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}

/// One async mutex per professional id, created on first use and swept once
/// idle. The guard is held across the conflict-check-then-write section of a
/// booking; reads never touch this.
#[derive(Default)]
pub struct CalendarLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CalendarLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, professional_id: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            // An entry referenced only by the map has no writer holding or
            // awaiting it; sweeping here keeps the map bounded by writers in
            // flight rather than every professional ever booked.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(professional_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

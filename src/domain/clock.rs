use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, RwLock};

/// Source of the current instant for readiness checks.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub type SharedClock = Arc<dyn Clock>;

/// Local wall-clock time, matching the offset-free timestamps of the record files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock. Clones share the same instant, so a test can keep a handle
/// and move time while the registry holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<RwLock<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(time: NaiveDateTime) -> ManualClock {
        ManualClock { time: Arc::new(RwLock::new(time)) }
    }

    pub fn set(&self, time: NaiveDateTime) {
        let mut guard = self.time.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = time;
    }

    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.time.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_window::parse_timestamp;

    #[test]
    fn test_manual_clock_handles_share_time() {
        let clock = ManualClock::new(parse_timestamp("2025-01-01 00:00").unwrap());
        let shared = clock.shared();

        clock.set(parse_timestamp("2025-06-01 12:30").unwrap());
        assert_eq!(shared.now(), parse_timestamp("2025-06-01 12:30").unwrap());
    }
}

use crate::domain::registry::MissionRegistry;
use crate::domain::utils::id::{AircraftId, MissionName};
use crate::error::Result;

/// A successful registry mutation, naming the records it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryChange {
    AircraftAdded(AircraftId),

    /// New, rescheduled or re-bound missions, in registry order.
    MissionsChanged(Vec<MissionName>),

    TemplateAdded(MissionName),

    /// Removed on promotion. Followed by a `MissionsChanged` for the new mission.
    TemplateRemoved(MissionName),
}

/// Write-through hook for the persistence side.
///
/// Called after the registry state is final, so the observer may read any record
/// it needs from `registry`.
pub trait RegistryObserver: std::fmt::Debug {
    fn on_change(&self, change: &RegistryChange, registry: &MissionRegistry) -> Result<()>;
}

/// Collects changes in memory. Handy for callers that batch their writes.
#[derive(Debug, Default)]
pub struct ChangeLog {
    changes: std::sync::Mutex<Vec<RegistryChange>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<RegistryChange> {
        let mut guard = self.changes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl RegistryObserver for std::sync::Arc<ChangeLog> {
    fn on_change(&self, change: &RegistryChange, _registry: &MissionRegistry) -> Result<()> {
        let mut guard = self.changes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.push(change.clone());
        Ok(())
    }
}

use std::collections::BTreeMap;

use crate::domain::mission::Mission;
use crate::domain::mission_store::{MissionKey, MissionStore};
use crate::domain::utils::id::AircraftId;

/// Registered aircraft keyed and iterated by ascending id.
pub type Fleet = BTreeMap<AircraftId, Aircraft>;

/// A registered aircraft.
///
/// `committed` is an index into the registry's [`MissionStore`] and only mirrors
/// the missions' own assigned sets. The sweep clears and rebuilds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aircraft {
    id: AircraftId,
    committed: Vec<MissionKey>,
}

impl Aircraft {
    pub fn new(id: AircraftId) -> Self {
        Aircraft { id, committed: Vec::new() }
    }

    pub fn get_id(&self) -> AircraftId {
        self.id
    }

    pub fn get_commitments(&self) -> &[MissionKey] {
        &self.committed
    }

    pub fn is_committed_to(&self, mission_name: &str, missions: &MissionStore) -> bool {
        self.committed.iter().filter_map(|key| missions.get(*key)).any(|mission| mission.get_name().as_str() == mission_name)
    }

    pub fn clear_commitments(&mut self) {
        self.committed.clear();
    }

    pub fn record_commitment(&mut self, key: MissionKey) {
        if !self.committed.contains(&key) {
            self.committed.push(key);
        }
    }

    /// True if any committed mission (other than the candidate itself) is not
    /// time-compatible with `candidate`.
    pub fn has_conflict(&self, candidate_key: MissionKey, candidate: &Mission, missions: &MissionStore) -> bool {
        self.committed
            .iter()
            .filter(|key| **key != candidate_key)
            .filter_map(|key| missions.get(*key))
            .any(|committed| !committed.can_bind_with(candidate))
    }
}

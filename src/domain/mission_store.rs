use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

use crate::domain::mission::Mission;
use crate::domain::utils::id::MissionName;

new_key_type! {
    pub struct MissionKey;
}

/// Arena of live missions.
///
/// Missions are never removed, so keys stay valid for the lifetime of the store.
/// Iteration follows insertion order, which is the order the assignment sweep uses.
#[derive(Debug, Default)]
pub struct MissionStore {
    /// Mission storage.
    slots: SlotMap<MissionKey, Mission>,

    /// Insertion order of keys.
    order: Vec<MissionKey>,

    /// Index lookup MissionKey using the mission name.
    name_index: HashMap<MissionName, MissionKey>,
}

impl MissionStore {
    pub fn new() -> Self {
        Self { slots: SlotMap::with_key(), order: Vec::new(), name_index: HashMap::new() }
    }

    /// Adds a mission. The caller guarantees the name is not taken.
    ///
    /// # Returns
    /// Returns the MissionKey (internal key of the MissionStore).
    pub fn add(&mut self, mission: Mission) -> MissionKey {
        let name = mission.get_name().clone();
        let key = self.slots.insert(mission);
        self.order.push(key);

        if let Some(previous) = self.name_index.insert(name.clone(), key) {
            log::error!("Mission name {} was indexed twice (previous key {:?}).", name, previous);
        }

        key
    }

    pub fn get(&self, key: MissionKey) -> Option<&Mission> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: MissionKey) -> Option<&mut Mission> {
        self.slots.get_mut(key)
    }

    pub fn key_for_name(&self, name: &MissionName) -> Option<MissionKey> {
        self.name_index.get(name).copied()
    }

    pub fn get_by_name(&self, name: &MissionName) -> Option<&Mission> {
        self.key_for_name(name).and_then(|key| self.slots.get(key))
    }

    pub fn contains_name(&self, name: &MissionName) -> bool {
        self.name_index.contains_key(name)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<MissionKey> {
        self.order.clone()
    }

    /// Missions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MissionKey, &Mission)> + '_ {
        self.order.iter().filter_map(move |key| self.slots.get(*key).map(|mission| (*key, mission)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

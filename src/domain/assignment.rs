use chrono::NaiveDateTime;

use crate::domain::aircraft::{Aircraft, Fleet};
use crate::domain::mission_store::{MissionKey, MissionStore};
use crate::domain::time_window::TimeWindow;
use crate::domain::utils::id::AircraftId;

/// Greedy first-fit binding of aircraft to missions.
///
/// Aircraft are visited by ascending id and missions in insertion order. No
/// backtracking: the first eligible pair wins, so the outcome depends on that order
/// and nothing else.
#[derive(Debug)]
pub struct AssignmentEngine<'a> {
    fleet: &'a mut Fleet,
    missions: &'a mut MissionStore,
    now: NaiveDateTime,
}

/// Missions whose bindings changed during an engine call, in insertion order.
pub type ChangedMissions = Vec<MissionKey>;

impl<'a> AssignmentEngine<'a> {
    pub fn new(fleet: &'a mut Fleet, missions: &'a mut MissionStore, now: NaiveDateTime) -> Self {
        AssignmentEngine { fleet, missions, now }
    }

    /// Tries the new aircraft against every existing mission.
    pub fn on_aircraft_added(&mut self, id: AircraftId) -> ChangedMissions {
        let mut changed = ChangedMissions::new();
        for key in self.missions.keys() {
            if self.try_bind(id, key) {
                changed.push(key);
            }
        }
        changed
    }

    /// Tries every existing aircraft against the new mission.
    pub fn on_mission_added(&mut self, key: MissionKey) -> ChangedMissions {
        let ids: Vec<AircraftId> = self.fleet.keys().copied().collect();
        let mut bound_any = false;
        for id in ids {
            bound_any |= self.try_bind(id, key);
        }
        if bound_any { vec![key] } else { Vec::new() }
    }

    /// Moves the mission, drops its old bindings and re-evaluates every pair.
    ///
    /// The rescheduled mission is always reported as changed.
    pub fn on_reschedule(&mut self, key: MissionKey, window: TimeWindow) -> ChangedMissions {
        match self.missions.get_mut(key) {
            Some(mission) => {
                log::info!("Rescheduling mission {} to {}. Clearing {} binding(s).", mission.get_name(), window, mission.assigned_count());
                mission.reschedule(window);
            }
            None => {
                log::error!("Reschedule of unknown mission key {:?} was not possible.", key);
                return Vec::new();
            }
        }

        let mut changed = self.sweep();
        if !changed.contains(&key) {
            changed.insert(0, key);
        }
        changed
    }

    /// Full reconciliation: rebuild every aircraft's commitment cache from the
    /// missions' assigned sets, then try every (aircraft, mission) pair.
    pub fn sweep(&mut self) -> ChangedMissions {
        self.rebuild_commitments();

        let ids: Vec<AircraftId> = self.fleet.keys().copied().collect();
        let keys = self.missions.keys();
        let mut changed = ChangedMissions::new();

        for id in ids {
            for key in &keys {
                if self.try_bind(id, *key) && !changed.contains(key) {
                    changed.push(*key);
                }
            }
        }

        // Report in insertion order regardless of which aircraft bound first.
        changed.sort_by_key(|key| keys.iter().position(|k| k == key));
        log::debug!("Sweep over {} aircraft and {} missions changed {} mission(s).", self.fleet.len(), keys.len(), changed.len());
        changed
    }

    fn rebuild_commitments(&mut self) {
        for aircraft in self.fleet.values_mut() {
            aircraft.clear_commitments();
        }

        for (key, mission) in self.missions.iter() {
            for id in mission.get_assigned() {
                match self.fleet.get_mut(id) {
                    Some(aircraft) => aircraft.record_commitment(key),
                    None => log::warn!("Mission {} lists unknown aircraft {}.", mission.get_name(), id),
                }
            }
        }
    }

    /// Checks the binding rules for `(aircraft, mission)` without mutating anything.
    pub fn is_eligible(&self, id: AircraftId, key: MissionKey) -> bool {
        match self.fleet.get(&id) {
            Some(aircraft) => is_eligible(aircraft, key, &self.missions, self.now),
            None => false,
        }
    }

    /// Binds the pair if every rule holds.
    ///
    /// # Returns
    /// `true` if a new binding was made.
    pub fn try_bind(&mut self, id: AircraftId, key: MissionKey) -> bool {
        let Some(aircraft) = self.fleet.get_mut(&id) else {
            return false;
        };

        if !is_eligible(aircraft, key, &self.missions, self.now) {
            return false;
        }

        let Some(mission) = self.missions.get_mut(key) else {
            return false;
        };

        mission.assign(id);
        aircraft.record_commitment(key);
        log::debug!("Aircraft {} bound to mission {} ({}/{}).", id, mission.get_name(), mission.assigned_count(), mission.get_info().get_required_aircraft());
        true
    }
}

/// Binding rules, all of which must hold:
/// 1. the mission has free capacity,
/// 2. the mission is not ready yet,
/// 3. the aircraft is not already bound to it,
/// 4. every other mission holding the aircraft is time-compatible with it,
/// 5. the aircraft's own commitment cache reports no conflict.
pub fn is_eligible(aircraft: &Aircraft, key: MissionKey, missions: &MissionStore, now: NaiveDateTime) -> bool {
    let Some(mission) = missions.get(key) else {
        return false;
    };
    let id = aircraft.get_id();

    if mission.reached_capacity() {
        log::trace!("Mission {} is at capacity, skipping aircraft {}.", mission.get_name(), id);
        return false;
    }

    if mission.is_ready(now) {
        log::trace!("Mission {} is already ready, skipping aircraft {}.", mission.get_name(), id);
        return false;
    }

    if mission.is_aircraft_assigned(id) {
        return false;
    }

    let clash = missions.iter().filter(|(other_key, other)| *other_key != key && other.is_aircraft_assigned(id)).find(|(_, other)| !other.can_bind_with(mission));
    if let Some((_, other)) = clash {
        log::trace!("Aircraft {} is bound to {} which conflicts with {}.", id, other.get_name(), mission.get_name());
        return false;
    }

    if aircraft.has_conflict(key, mission, missions) {
        log::warn!("Commitment cache of aircraft {} disagrees with mission bindings for {}.", id, mission.get_name());
        return false;
    }

    true
}

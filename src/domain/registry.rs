use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::domain::aircraft::{Aircraft, Fleet};
use crate::domain::assignment::{AssignmentEngine, ChangedMissions};
use crate::domain::clock::SharedClock;
use crate::domain::mission::Mission;
use crate::domain::mission_store::MissionStore;
use crate::domain::registry_observer::{RegistryChange, RegistryObserver};
use crate::domain::template::{MissionTemplate, PromotionKind};
use crate::domain::time_window::TimeWindow;
use crate::domain::utils::id::{AircraftId, MissionName};
use crate::error::{Error, Result};

/// Owner of all aircraft, missions and templates, and the entry point for every
/// mutation. Each mutation runs the assignment engine before it returns.
///
/// Business-rule rejections (duplicate id or name, unknown template) return
/// `false`/`None` and are only logged.
#[derive(Debug)]
pub struct MissionRegistry {
    fleet: Fleet,
    missions: MissionStore,
    templates: Vec<MissionTemplate>,
    clock: SharedClock,
    observer: Option<Box<dyn RegistryObserver>>,
    restored_changes: Option<RegistryChange>,
    persistence_errors: Vec<Error>,
}

impl MissionRegistry {
    pub fn new(clock: SharedClock) -> Self {
        MissionRegistry { fleet: Fleet::new(), missions: MissionStore::new(), templates: Vec::new(), clock, observer: None, restored_changes: None, persistence_errors: Vec::new() }
    }

    /// Rebuilds a registry from persisted records.
    ///
    /// Stored bindings go through the capacity and exclusivity rules in mission
    /// order. Bindings to unregistered aircraft or clashing with an earlier stored
    /// binding are dropped. A full sweep then rebuilds the commitment caches and
    /// fills free capacity. Duplicate ids or names are fatal.
    ///
    /// Missions whose bindings differ from the records are reported to the first
    /// observer installed with [`MissionRegistry::set_observer`].
    pub fn from_records(clock: SharedClock, aircraft: Vec<AircraftId>, missions: Vec<Mission>, templates: Vec<MissionTemplate>) -> Result<Self> {
        let mut registry = MissionRegistry::new(clock);

        for id in aircraft {
            if registry.fleet.insert(id, Aircraft::new(id)).is_some() {
                return Err(Error::ModelConstructionError(format!("Aircraft id {} is listed twice", id)));
            }
        }

        let mut names: HashSet<MissionName> = HashSet::new();
        for template in &templates {
            if !names.insert(template.get_name().clone()) {
                return Err(Error::ModelConstructionError(format!("Name '{}' is used by more than one template", template.get_name())));
            }
        }
        registry.templates = templates;

        let mut pruned = ChangedMissions::new();
        for mut mission in missions {
            if !names.insert(mission.get_name().clone()) {
                return Err(Error::ModelConstructionError(format!("Name '{}' is used by more than one mission or template", mission.get_name())));
            }

            let fleet = &registry.fleet;
            let unknown = mission.retain_assigned(|id| fleet.contains_key(&id));
            if !unknown.is_empty() {
                log::warn!("Mission {} referenced unregistered aircraft {:?}. Dropping those bindings.", mission.get_name(), unknown);
            }

            let window = *mission.get_window();
            let stored = &registry.missions;
            let clashing = mission.retain_assigned(|id| stored.iter().all(|(_, other)| !other.is_aircraft_assigned(id) || other.get_window().is_compatible_with(&window)));
            if !clashing.is_empty() {
                log::warn!("Mission {} lists aircraft {:?} already bound to a conflicting mission. Dropping those bindings.", mission.get_name(), clashing);
            }

            let key = registry.missions.add(mission);
            if !unknown.is_empty() || !clashing.is_empty() {
                pruned.push(key);
            }
        }

        let now = registry.clock.now();
        let mut changed = AssignmentEngine::new(&mut registry.fleet, &mut registry.missions, now).sweep();
        log::info!(
            "Registry restored: {} aircraft, {} missions, {} templates ({} missions re-bound, {} pruned).",
            registry.fleet.len(),
            registry.missions.len(),
            registry.templates.len(),
            changed.len(),
            pruned.len()
        );

        for key in pruned {
            if !changed.contains(&key) {
                changed.push(key);
            }
        }
        let order = registry.missions.keys();
        changed.sort_by_key(|key| order.iter().position(|k| k == key));

        if !changed.is_empty() {
            let names = changed.into_iter().filter_map(|key| registry.missions.get(key)).map(|mission| mission.get_name().clone()).collect();
            registry.restored_changes = Some(RegistryChange::MissionsChanged(names));
        }

        Ok(registry)
    }

    /// Installs the write-through hook. Replaces any previous one.
    ///
    /// Pending changes from [`MissionRegistry::from_records`] are delivered to it
    /// right away.
    pub fn set_observer(&mut self, observer: Box<dyn RegistryObserver>) {
        self.observer = Some(observer);
        if let Some(change) = self.restored_changes.take() {
            self.notify(change);
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Registers an aircraft and offers it to every mission.
    ///
    /// # Returns
    /// `false` if the id is already registered.
    pub fn add_aircraft(&mut self, id: AircraftId) -> bool {
        if self.fleet.contains_key(&id) {
            log::warn!("Aircraft {} is already registered.", id);
            return false;
        }

        self.fleet.insert(id, Aircraft::new(id));
        log::info!("Aircraft {} registered.", id);

        let now = self.clock.now();
        let changed = AssignmentEngine::new(&mut self.fleet, &mut self.missions, now).on_aircraft_added(id);

        self.notify(RegistryChange::AircraftAdded(id));
        self.notify_missions(changed);
        true
    }

    /// Adds a scheduled mission and offers it every aircraft.
    ///
    /// # Returns
    /// `false` if the name is taken by a mission or a template.
    pub fn add_mission(&mut self, mission: Mission) -> bool {
        if self.name_exists(mission.get_name().as_str()) {
            log::warn!("Name {} is already used by a mission or template.", mission.get_name());
            return false;
        }

        log::info!("Mission added: {}.", mission);
        let key = self.missions.add(mission);

        let now = self.clock.now();
        AssignmentEngine::new(&mut self.fleet, &mut self.missions, now).on_mission_added(key);

        // A new mission record must be written even when nothing bound to it.
        self.notify_missions(vec![key]);
        true
    }

    /// # Returns
    /// `false` if the name is taken by a mission or a template.
    pub fn add_template(&mut self, template: MissionTemplate) -> bool {
        if self.name_exists(template.get_name().as_str()) {
            log::warn!("Name {} is already used by a mission or template.", template.get_name());
            return false;
        }

        let name = template.get_name().clone();
        log::info!("Template {} added (requires {} aircraft).", name, template.get_info().get_required_aircraft());
        self.templates.push(template);
        self.notify(RegistryChange::TemplateAdded(name));
        true
    }

    /// Turns a template into a scheduled mission and removes the template.
    ///
    /// # Returns
    /// The new mission, or `None` if no template has that name (or a surveillance
    /// promotion has no sensor fields at all).
    pub fn promote_template(&mut self, name: &str, window: TimeWindow, kind: PromotionKind) -> Option<&Mission> {
        let Some(index) = self.templates.iter().position(|t| t.get_name().as_str() == name) else {
            log::warn!("No template named {} to promote.", name);
            return None;
        };

        let Some(mission) = self.templates[index].promote(window, kind) else {
            log::warn!("Template {} has no surveillance profile and none was given.", name);
            return None;
        };

        let template = self.templates.remove(index);
        log::info!("Template {} promoted to a {} mission.", template.get_name(), mission.get_kind().label());
        self.notify(RegistryChange::TemplateRemoved(template.get_name().clone()));

        if !self.add_mission(mission) {
            log::error!("Promoted mission {} could not be added.", name);
            return None;
        }
        self.find_mission(name)
    }

    /// Moves a mission to a new window. Its bindings are cleared and the whole
    /// registry is re-swept.
    ///
    /// # Returns
    /// `false` if no mission has that name.
    pub fn reschedule(&mut self, name: &str, window: TimeWindow) -> bool {
        let Some(key) = self.missions.key_for_name(&MissionName::new(name)) else {
            log::warn!("No mission named {} to reschedule.", name);
            return false;
        };

        let now = self.clock.now();
        let changed = AssignmentEngine::new(&mut self.fleet, &mut self.missions, now).on_reschedule(key, window);
        self.notify_missions(changed);
        true
    }

    pub fn find_mission(&self, name: &str) -> Option<&Mission> {
        self.missions.get_by_name(&MissionName::new(name))
    }

    pub fn find_template(&self, name: &str) -> Option<&MissionTemplate> {
        self.templates.iter().find(|t| t.get_name().as_str() == name)
    }

    pub fn template_exists(&self, name: &str) -> bool {
        self.find_template(name).is_some()
    }

    /// True if a live mission or a template carries the name.
    pub fn name_exists(&self, name: &str) -> bool {
        self.missions.contains_name(&MissionName::new(name)) || self.template_exists(name)
    }

    /// Readiness at the registry clock's current instant.
    pub fn is_mission_ready(&self, name: &str) -> Option<bool> {
        self.find_mission(name).map(|mission| mission.is_ready(self.clock.now()))
    }

    /// Missions whose window intersects `[start, end]`, endpoints included.
    pub fn missions_overlapping(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&Mission> {
        self.missions.iter().map(|(_, mission)| mission).filter(|mission| mission.get_window().intersects(start, end)).collect()
    }

    /// Missions starting within `lookahead_hours` of `now` that are not ready.
    pub fn unprepared_missions(&self, lookahead_hours: i64, now: NaiveDateTime) -> Vec<&Mission> {
        self.missions
            .iter()
            .map(|(_, mission)| mission)
            .filter(|mission| mission.is_within_lookahead(lookahead_hours, now) && !mission.is_ready(now))
            .collect()
    }

    /// Registered aircraft ids, ascending.
    pub fn aircraft(&self) -> impl Iterator<Item = AircraftId> + '_ {
        self.fleet.keys().copied()
    }

    /// Missions the aircraft is committed to, per its commitment cache.
    pub fn commitments_of(&self, id: AircraftId) -> Vec<&Mission> {
        match self.fleet.get(&id) {
            Some(aircraft) => aircraft.get_commitments().iter().filter_map(|key| self.missions.get(*key)).collect(),
            None => Vec::new(),
        }
    }

    /// Missions in insertion order.
    pub fn missions(&self) -> impl Iterator<Item = &Mission> + '_ {
        self.missions.iter().map(|(_, mission)| mission)
    }

    pub fn templates(&self) -> &[MissionTemplate] {
        &self.templates
    }

    /// Errors the observer reported since the last call.
    pub fn take_persistence_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.persistence_errors)
    }

    /// Logs a listing of the whole registry.
    pub fn summary(&self) {
        let now = self.clock.now();
        log::info!("--- Registry Summary ---");
        log::info!("Aircraft: {}", self.fleet.len());
        for aircraft in self.fleet.values() {
            let names: Vec<String> = self.commitments_of(aircraft.get_id()).iter().map(|m| m.get_name().to_string()).collect();
            log::info!("  - Aircraft {} committed to {:?}", aircraft.get_id(), names);
        }

        log::info!("Missions: {}", self.missions.len());
        for mission in self.missions() {
            log::info!("  - {} [{:?}]", mission, mission.phase(now));
        }

        log::info!("Templates: {}", self.templates.len());
        for template in &self.templates {
            log::info!("  * {} ({} aircraft)", template.get_name(), template.get_info().get_required_aircraft());
        }
        log::info!("------------------------");
    }

    fn notify_missions(&mut self, changed: ChangedMissions) {
        if changed.is_empty() {
            return;
        }
        let names = changed.into_iter().filter_map(|key| self.missions.get(key)).map(|mission| mission.get_name().clone()).collect();
        self.notify(RegistryChange::MissionsChanged(names));
    }

    fn notify(&mut self, change: RegistryChange) {
        let result = match &self.observer {
            Some(observer) => observer.on_change(&change, self),
            None => Ok(()),
        };

        if let Err(e) = result {
            log::error!("Persisting {:?} failed: {}", change, e);
            self.persistence_errors.push(e);
        }
    }
}

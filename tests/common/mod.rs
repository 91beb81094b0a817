#![allow(dead_code)]

use chrono::NaiveDateTime;

use ops_scheduler::domain::clock::ManualClock;
use ops_scheduler::domain::mission::{Mission, MissionInfo, TargetLocation};
use ops_scheduler::domain::registry::MissionRegistry;
use ops_scheduler::domain::time_window::{TimeWindow, parse_timestamp};

pub fn ts(value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap()
}

pub fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

pub fn strike(name: &str, required: u32, start: &str, end: &str) -> Mission {
    let info = MissionInfo::new(name, "strike test", required).unwrap();
    Mission::strike(info, window(start, end), "guided", TargetLocation::new(32.1, 34.8))
}

pub fn surveillance(name: &str, required: u32, start: &str, end: &str) -> Mission {
    let info = MissionInfo::new(name, "surveillance test", required).unwrap();
    Mission::surveillance(info, window(start, end), "EO/IR", "coastal loop")
}

/// Registry driven by a manual clock set to `now`.
pub fn registry_at(now: &str) -> (MissionRegistry, ManualClock) {
    let clock = ManualClock::new(ts(now));
    (MissionRegistry::new(clock.shared()), clock)
}

pub fn assigned_ids(mission: &Mission) -> Vec<u32> {
    mission.get_assigned().iter().map(|id| id.0).collect()
}

/// Panics if any mission exceeds its headcount or any aircraft is bound to two
/// time-incompatible missions.
pub fn assert_registry_invariants(registry: &MissionRegistry) {
    let missions: Vec<&Mission> = registry.missions().collect();

    for mission in &missions {
        assert!(
            mission.assigned_count() <= mission.get_info().get_required_aircraft(),
            "mission {} over capacity: {}",
            mission.get_name(),
            mission
        );
    }

    for id in registry.aircraft() {
        let bound: Vec<&&Mission> = missions.iter().filter(|m| m.is_aircraft_assigned(id)).collect();
        for (i, first) in bound.iter().enumerate() {
            for second in &bound[i + 1..] {
                assert!(first.can_bind_with(second), "aircraft {} double-booked on {} and {}", id, first.get_name(), second.get_name());
            }
        }

        let mut cached: Vec<String> = registry.commitments_of(id).iter().map(|m| m.get_name().to_string()).collect();
        let mut authoritative: Vec<String> = bound.iter().map(|m| m.get_name().to_string()).collect();
        cached.sort();
        authoritative.sort();
        assert_eq!(cached, authoritative, "commitment cache of aircraft {} is out of sync", id);
    }
}

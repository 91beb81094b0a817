use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;

use crate::api::mission_dto::{MissionDetailsDto, MissionDto};
use crate::domain::time_window::TimeWindow;
use crate::domain::utils::id::{AircraftId, MissionName};
use crate::error::{Error, Result};

/// A strike mission is only ready inside this many hours before its start.
pub const STRIKE_READINESS_LEAD_HOURS: i64 = 10;

/// A surveillance mission is only ready inside this many hours before its start.
pub const SURVEILLANCE_READINESS_LEAD_HOURS: i64 = 3;

/// Minimum staffing, in percent of the required headcount, for surveillance readiness.
pub const SURVEILLANCE_MIN_COVERAGE_PERCENT: u32 = 80;

/// Name, description and headcount shared by missions and templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionInfo {
    name: MissionName,
    description: String,
    required_aircraft: u32,
}

impl MissionInfo {
    pub fn new(name: impl Into<MissionName>, description: impl Into<String>, required_aircraft: u32) -> Result<Self> {
        if required_aircraft == 0 {
            return Err(Error::InvalidRequiredCount(required_aircraft));
        }
        Ok(MissionInfo { name: name.into(), description: description.into(), required_aircraft })
    }

    pub fn get_name(&self) -> &MissionName {
        &self.name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_required_aircraft(&self) -> u32 {
        self.required_aircraft
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetLocation {
    pub x: f64,
    pub y: f64,
}

impl TargetLocation {
    pub fn new(x: f64, y: f64) -> Self {
        TargetLocation { x, y }
    }
}

/// Variant payload of a mission. Readiness rules differ per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionKind {
    /// Needs the full headcount to launch.
    Strike { payload_type: String, target: TargetLocation },

    /// Tolerates partial staffing down to [`SURVEILLANCE_MIN_COVERAGE_PERCENT`].
    Surveillance { sensor_type: String, route: String },
}

impl MissionKind {
    pub fn strike(payload_type: impl Into<String>, target: TargetLocation) -> Self {
        MissionKind::Strike { payload_type: payload_type.into(), target }
    }

    pub fn surveillance(sensor_type: impl Into<String>, route: impl Into<String>) -> Self {
        MissionKind::Surveillance { sensor_type: sensor_type.into(), route: route.into() }
    }

    pub fn readiness_lead_hours(&self) -> i64 {
        match self {
            MissionKind::Strike { .. } => STRIKE_READINESS_LEAD_HOURS,
            MissionKind::Surveillance { .. } => SURVEILLANCE_READINESS_LEAD_HOURS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissionKind::Strike { .. } => "strike",
            MissionKind::Surveillance { .. } => "surveillance",
        }
    }
}

/// Where a scheduled mission stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    /// Before start, staffing or lookahead condition not (yet) met.
    Understaffed,

    /// Before start, staffed and inside the readiness lead time.
    Ready,

    /// Start has passed. Terminal for readiness purposes.
    Launched,
}

/// A scheduled mission.
///
/// `assigned` is the single source of truth for bindings. The per-aircraft
/// commitment lists are rebuilt from it by the assignment sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    info: MissionInfo,
    window: TimeWindow,
    assigned: BTreeSet<AircraftId>,
    kind: MissionKind,
}

impl Mission {
    pub fn new(info: MissionInfo, window: TimeWindow, kind: MissionKind) -> Self {
        Mission { info, window, assigned: BTreeSet::new(), kind }
    }

    pub fn strike(info: MissionInfo, window: TimeWindow, payload_type: impl Into<String>, target: TargetLocation) -> Self {
        Mission::new(info, window, MissionKind::strike(payload_type, target))
    }

    pub fn surveillance(info: MissionInfo, window: TimeWindow, sensor_type: impl Into<String>, route: impl Into<String>) -> Self {
        Mission::new(info, window, MissionKind::surveillance(sensor_type, route))
    }

    /// Restores persisted bindings. Fails if they exceed the headcount.
    pub(crate) fn with_assigned(mut self, assigned: impl IntoIterator<Item = AircraftId>) -> Result<Self> {
        self.assigned = assigned.into_iter().collect();
        if self.assigned.len() > self.info.required_aircraft as usize {
            return Err(Error::ModelConstructionError(format!(
                "Mission '{}' lists {} assigned aircraft but requires only {}",
                self.info.name,
                self.assigned.len(),
                self.info.required_aircraft
            )));
        }
        Ok(self)
    }

    pub fn get_info(&self) -> &MissionInfo {
        &self.info
    }

    pub fn get_name(&self) -> &MissionName {
        &self.info.name
    }

    pub fn get_window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn get_start(&self) -> NaiveDateTime {
        self.window.get_start()
    }

    pub fn get_end(&self) -> NaiveDateTime {
        self.window.get_end()
    }

    pub fn get_kind(&self) -> &MissionKind {
        &self.kind
    }

    pub fn get_assigned(&self) -> &BTreeSet<AircraftId> {
        &self.assigned
    }

    pub fn assigned_count(&self) -> u32 {
        self.assigned.len() as u32
    }

    pub fn is_aircraft_assigned(&self, id: AircraftId) -> bool {
        self.assigned.contains(&id)
    }

    /// Adds the aircraft without validation. Callers check capacity and overlap first.
    ///
    /// # Returns
    /// `true` if the aircraft was newly bound, `false` if it already was.
    pub fn assign(&mut self, id: AircraftId) -> bool {
        self.assigned.insert(id)
    }

    /// Drops aircraft that no longer exist. Only used when restoring records.
    pub(crate) fn retain_assigned(&mut self, keep: impl Fn(AircraftId) -> bool) -> Vec<AircraftId> {
        let dropped: Vec<AircraftId> = self.assigned.iter().copied().filter(|id| !keep(*id)).collect();
        for id in &dropped {
            self.assigned.remove(id);
        }
        dropped
    }

    /// Moves the mission and clears all bindings made under the old schedule.
    pub(crate) fn reschedule(&mut self, window: TimeWindow) {
        self.window = window;
        self.assigned.clear();
    }

    pub fn reached_capacity(&self) -> bool {
        self.assigned.len() >= self.info.required_aircraft as usize
    }

    /// Assigned headcount in percent of the required headcount, rounded up.
    pub fn coverage_percent(&self) -> u32 {
        (self.assigned_count() * 100).div_ceil(self.info.required_aircraft)
    }

    fn is_staffed(&self) -> bool {
        match self.kind {
            MissionKind::Strike { .. } => self.assigned_count() == self.info.required_aircraft,
            MissionKind::Surveillance { .. } => self.coverage_percent() >= SURVEILLANCE_MIN_COVERAGE_PERCENT,
        }
    }

    /// Readiness at `now`: not started, staffed per variant, and inside the
    /// variant's readiness lead time.
    pub fn is_ready(&self, now: NaiveDateTime) -> bool {
        self.window.starts_within(self.kind.readiness_lead_hours(), now) && self.is_staffed()
    }

    /// `now ∈ [start - hours, start)`.
    pub fn is_within_lookahead(&self, hours: i64, now: NaiveDateTime) -> bool {
        self.window.starts_within(hours, now)
    }

    /// An aircraft bound to `other` may also fly this mission.
    pub fn can_bind_with(&self, other: &Mission) -> bool {
        self.window.is_compatible_with(&other.window)
    }

    pub fn phase(&self, now: NaiveDateTime) -> MissionPhase {
        if self.window.has_started(now) {
            MissionPhase::Launched
        } else if self.is_ready(now) {
            MissionPhase::Ready
        } else {
            MissionPhase::Understaffed
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}/{} aircraft",
            self.info.name,
            self.kind.label(),
            self.window,
            self.assigned.len(),
            self.info.required_aircraft
        )
    }
}

impl TryFrom<MissionDto> for Mission {
    type Error = Error;

    fn try_from(dto: MissionDto) -> Result<Self> {
        let info = MissionInfo::new(dto.operation_name, dto.task_description, dto.num_of_aircrafts)?;
        let window = TimeWindow::parse(&dto.start, &dto.end)?;
        let kind = match dto.details {
            MissionDetailsDto::Strike { armament_type, x, y } => MissionKind::strike(armament_type, TargetLocation::new(x, y)),
            MissionDetailsDto::Surveillance { camera_type, flight_route } => MissionKind::surveillance(camera_type, flight_route),
        };

        Mission::new(info, window, kind).with_assigned(dto.assigned_aircrafts.into_iter().map(AircraftId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_window::parse_timestamp;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    fn strike(name: &str, required: u32, start: &str, end: &str) -> Mission {
        let info = MissionInfo::new(name, "test strike", required).unwrap();
        Mission::strike(info, TimeWindow::parse(start, end).unwrap(), "guided", TargetLocation::new(31.5, 34.8))
    }

    fn surveillance(name: &str, required: u32, start: &str, end: &str) -> Mission {
        let info = MissionInfo::new(name, "test recon", required).unwrap();
        Mission::surveillance(info, TimeWindow::parse(start, end).unwrap(), "EO/IR", "north corridor")
    }

    #[test]
    fn test_info_rejects_zero_headcount() {
        assert!(matches!(MissionInfo::new("Empty", "", 0), Err(Error::InvalidRequiredCount(0))));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut mission = strike("Hammer", 2, "2025-01-01 10:00", "2025-01-01 12:00");
        assert!(mission.assign(AircraftId(1)));
        assert!(!mission.assign(AircraftId(1)));
        assert_eq!(mission.assigned_count(), 1);
        assert!(mission.is_aircraft_assigned(AircraftId(1)));
        assert!(!mission.reached_capacity());

        mission.assign(AircraftId(2));
        assert!(mission.reached_capacity());
    }

    #[test]
    fn test_strike_readiness_boundaries() {
        let mut mission = strike("Hammer", 3, "2025-01-01 10:00", "2025-01-01 12:00");
        mission.assign(AircraftId(1));
        mission.assign(AircraftId(2));
        assert!(!mission.is_ready(ts("2025-01-01 05:00")));

        mission.assign(AircraftId(3));
        assert!(!mission.is_ready(ts("2024-12-31 23:59")));
        assert!(mission.is_ready(ts("2025-01-01 00:00")));
        assert!(mission.is_ready(ts("2025-01-01 09:59")));
        assert!(!mission.is_ready(ts("2025-01-01 10:00")));
        assert!(!mission.is_ready(ts("2025-01-01 11:00")));
    }

    #[test]
    fn test_surveillance_readiness_with_partial_staffing() {
        let mut mission = surveillance("Lookout", 5, "2025-01-01 10:00", "2025-01-01 12:00");
        for id in 1..=3 {
            mission.assign(AircraftId(id));
        }
        assert_eq!(mission.coverage_percent(), 60);
        assert!(!mission.is_ready(ts("2025-01-01 08:00")));

        mission.assign(AircraftId(4));
        assert_eq!(mission.coverage_percent(), 80);
        assert!(!mission.is_ready(ts("2025-01-01 06:59")));
        assert!(mission.is_ready(ts("2025-01-01 07:00")));
        assert!(mission.is_ready(ts("2025-01-01 09:59")));
        assert!(!mission.is_ready(ts("2025-01-01 10:00")));
    }

    #[test]
    fn test_coverage_rounds_up() {
        let mut mission = surveillance("Lookout", 3, "2025-01-01 10:00", "2025-01-01 12:00");
        mission.assign(AircraftId(1));
        assert_eq!(mission.coverage_percent(), 34);
        mission.assign(AircraftId(2));
        assert_eq!(mission.coverage_percent(), 67);
    }

    #[test]
    fn test_phase_transitions() {
        let mut mission = strike("Hammer", 1, "2025-01-01 10:00", "2025-01-01 12:00");
        assert_eq!(mission.phase(ts("2025-01-01 05:00")), MissionPhase::Understaffed);

        mission.assign(AircraftId(7));
        assert_eq!(mission.phase(ts("2024-12-31 20:00")), MissionPhase::Understaffed);
        assert_eq!(mission.phase(ts("2025-01-01 05:00")), MissionPhase::Ready);
        assert_eq!(mission.phase(ts("2025-01-01 10:00")), MissionPhase::Launched);

        mission.reschedule(TimeWindow::parse("2025-01-02 10:00", "2025-01-02 12:00").unwrap());
        assert_eq!(mission.assigned_count(), 0);
        assert_eq!(mission.phase(ts("2025-01-02 05:00")), MissionPhase::Understaffed);
    }

    #[test]
    fn test_can_bind_with_uses_turnaround_margin() {
        let first = strike("A", 1, "2025-01-01 10:00", "2025-01-01 12:00");
        let spaced = strike("B", 1, "2025-01-01 13:00", "2025-01-01 14:00");
        let tight = surveillance("C", 1, "2025-01-01 12:30", "2025-01-01 14:00");
        assert!(first.can_bind_with(&spaced));
        assert!(spaced.can_bind_with(&first));
        assert!(!first.can_bind_with(&tight));
        assert!(!tight.can_bind_with(&first));
    }

    #[test]
    fn test_strike_record_conversion() {
        let json = r#"{
            "operationName": "Hammer",
            "taskDescription": "bridge",
            "numOfAircrafts": 2,
            "start": "2025-01-01 10:00",
            "end": "2025-01-01 12:00",
            "assignedAircrafts": [4],
            "armamentType": "JDAM",
            "x": 31.5,
            "y": 34.75
        }"#;
        let dto: MissionDto = serde_json::from_str(json).unwrap();
        let mission = Mission::try_from(dto.clone()).unwrap();

        assert_eq!(mission.get_kind(), &MissionKind::strike("JDAM", TargetLocation::new(31.5, 34.75)));
        assert!(mission.is_aircraft_assigned(AircraftId(4)));
        assert_eq!(MissionDto::from(&mission), dto);
    }

    #[test]
    fn test_surveillance_record_conversion() {
        let json = r#"{
            "operationName": "Lookout",
            "taskDescription": "coast",
            "numOfAircrafts": 5,
            "start": "2025-01-01 10:00",
            "end": "2025-01-01 12:00",
            "assignedAircrafts": [],
            "cameraType": "EO/IR",
            "flightRoute": "A-B-C"
        }"#;
        let mission = Mission::try_from(serde_json::from_str::<MissionDto>(json).unwrap()).unwrap();
        assert_eq!(mission.get_kind(), &MissionKind::surveillance("EO/IR", "A-B-C"));
    }

    #[test]
    fn test_record_with_bad_timestamp_is_rejected() {
        let json = r#"{
            "operationName": "Broken",
            "taskDescription": "",
            "numOfAircrafts": 1,
            "start": "2025-01-01T10:00",
            "end": "2025-01-01 12:00",
            "armamentType": "none",
            "x": 0.0,
            "y": 0.0
        }"#;
        let result = Mission::try_from(serde_json::from_str::<MissionDto>(json).unwrap());
        assert!(matches!(result, Err(Error::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_with_assigned_enforces_capacity() {
        let mission = strike("Hammer", 1, "2025-01-01 10:00", "2025-01-01 12:00");
        let result = mission.with_assigned([AircraftId(1), AircraftId(2)]);
        assert!(matches!(result, Err(Error::ModelConstructionError(_))));
    }
}

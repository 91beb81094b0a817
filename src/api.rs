pub mod mission_dto;
pub mod template_dto;

/// `aircraft.json`: a plain array of ids.
pub type AircraftRecordsDto = Vec<u32>;

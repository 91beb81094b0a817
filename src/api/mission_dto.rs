use serde::{Deserialize, Serialize};

use crate::domain::mission::{Mission, MissionKind};
use crate::domain::time_window::format_timestamp;

/// One entry of `operations.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissionDto {
    pub operation_name: String,
    pub task_description: String,
    pub num_of_aircrafts: u32,

    /// `yyyy-MM-dd HH:mm`, local time.
    pub start: String,
    pub end: String,

    #[serde(default)]
    pub assigned_aircrafts: Vec<u32>,

    #[serde(flatten)]
    pub details: MissionDetailsDto,
}

/// Variant fields. A record with `cameraType` is surveillance, otherwise strike.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MissionDetailsDto {
    #[serde(rename_all = "camelCase")]
    Surveillance { camera_type: String, flight_route: String },

    #[serde(rename_all = "camelCase")]
    Strike { armament_type: String, x: f64, y: f64 },
}

impl From<&Mission> for MissionDto {
    fn from(mission: &Mission) -> Self {
        let info = mission.get_info();
        let details = match mission.get_kind() {
            MissionKind::Strike { payload_type, target } => MissionDetailsDto::Strike { armament_type: payload_type.clone(), x: target.x, y: target.y },
            MissionKind::Surveillance { sensor_type, route } => MissionDetailsDto::Surveillance { camera_type: sensor_type.clone(), flight_route: route.clone() },
        };

        MissionDto {
            operation_name: info.get_name().to_string(),
            task_description: info.get_description().to_string(),
            num_of_aircrafts: info.get_required_aircraft(),
            start: format_timestamp(mission.get_start()),
            end: format_timestamp(mission.get_end()),
            assigned_aircrafts: mission.get_assigned().iter().map(|id| id.0).collect(),
            details,
        }
    }
}

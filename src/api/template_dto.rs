use serde::{Deserialize, Serialize};

use crate::domain::template::MissionTemplate;

/// One entry of `templates.json`. Sensor fields mark a surveillance template.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    pub operation_name: String,
    pub task_description: String,
    pub num_of_aircrafts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_route: Option<String>,
}

impl From<&MissionTemplate> for TemplateDto {
    fn from(template: &MissionTemplate) -> Self {
        let info = template.get_info();
        let profile = template.get_surveillance_profile();

        TemplateDto {
            operation_name: info.get_name().to_string(),
            task_description: info.get_description().to_string(),
            num_of_aircrafts: info.get_required_aircraft(),
            camera_type: profile.map(|p| p.sensor_type.clone()),
            flight_route: profile.map(|p| p.route.clone()),
        }
    }
}

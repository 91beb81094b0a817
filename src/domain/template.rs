use crate::api::template_dto::TemplateDto;
use crate::domain::mission::{Mission, MissionInfo, MissionKind, TargetLocation};
use crate::domain::time_window::TimeWindow;
use crate::domain::utils::id::MissionName;
use crate::error::{Error, Result};

/// Sensor package and route pre-planned on a surveillance template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveillanceProfile {
    pub sensor_type: String,
    pub route: String,
}

/// A mission skeleton without schedule or bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionTemplate {
    info: MissionInfo,
    surveillance_profile: Option<SurveillanceProfile>,
}

/// Variant chosen when a template is promoted.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind {
    Strike { payload_type: String, target: TargetLocation },

    /// Explicit sensor fields. `None` falls back to the template's stored profile.
    Surveillance { profile: Option<SurveillanceProfile> },
}

impl MissionTemplate {
    pub fn new(info: MissionInfo) -> Self {
        MissionTemplate { info, surveillance_profile: None }
    }

    pub fn with_surveillance_profile(mut self, sensor_type: impl Into<String>, route: impl Into<String>) -> Self {
        self.surveillance_profile = Some(SurveillanceProfile { sensor_type: sensor_type.into(), route: route.into() });
        self
    }

    pub fn get_info(&self) -> &MissionInfo {
        &self.info
    }

    pub fn get_name(&self) -> &MissionName {
        self.info.get_name()
    }

    pub fn get_surveillance_profile(&self) -> Option<&SurveillanceProfile> {
        self.surveillance_profile.as_ref()
    }

    /// Builds the concrete mission carrying this template's info.
    ///
    /// # Returns
    /// `None` for a surveillance promotion when neither the request nor the
    /// template carries sensor fields.
    pub fn promote(&self, window: TimeWindow, kind: PromotionKind) -> Option<Mission> {
        let kind = match kind {
            PromotionKind::Strike { payload_type, target } => MissionKind::Strike { payload_type, target },
            PromotionKind::Surveillance { profile } => {
                let SurveillanceProfile { sensor_type, route } = profile.or_else(|| self.surveillance_profile.clone())?;
                MissionKind::Surveillance { sensor_type, route }
            }
        };
        Some(Mission::new(self.info.clone(), window, kind))
    }
}

impl TryFrom<TemplateDto> for MissionTemplate {
    type Error = Error;

    fn try_from(dto: TemplateDto) -> Result<Self> {
        let template = MissionTemplate::new(MissionInfo::new(dto.operation_name, dto.task_description, dto.num_of_aircrafts)?);
        match (dto.camera_type, dto.flight_route) {
            (Some(sensor_type), Some(route)) => Ok(template.with_surveillance_profile(sensor_type, route)),
            (None, None) => Ok(template),
            _ => Err(Error::ModelConstructionError(format!("Template '{}' must carry both cameraType and flightRoute or neither", template.get_name()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TimeWindow {
        TimeWindow::parse("2025-02-01 06:00", "2025-02-01 09:00").unwrap()
    }

    #[test]
    fn test_promote_to_strike_keeps_info() {
        let info = MissionInfo::new("T1", "coastal battery", 2).unwrap();
        let template = MissionTemplate::new(info.clone());

        let mission = template.promote(window(), PromotionKind::Strike { payload_type: "JDAM".into(), target: TargetLocation::new(1.0, 2.0) }).unwrap();
        assert_eq!(mission.get_info(), &info);
        assert_eq!(mission.get_kind().label(), "strike");
        assert_eq!(mission.assigned_count(), 0);
    }

    #[test]
    fn test_surveillance_promotion_uses_stored_profile() {
        let info = MissionInfo::new("T2", "border watch", 3).unwrap();
        let template = MissionTemplate::new(info).with_surveillance_profile("SAR", "ridge line");

        let mission = template.promote(window(), PromotionKind::Surveillance { profile: None }).unwrap();
        assert_eq!(mission.get_kind(), &MissionKind::surveillance("SAR", "ridge line"));
    }

    #[test]
    fn test_template_record_conversion() {
        let plain: TemplateDto = serde_json::from_str(r#"{"operationName":"T1","taskDescription":"d","numOfAircrafts":2}"#).unwrap();
        let plain = MissionTemplate::try_from(plain).unwrap();
        assert!(plain.get_surveillance_profile().is_none());
        assert_eq!(serde_json::to_string(&TemplateDto::from(&plain)).unwrap(), r#"{"operationName":"T1","taskDescription":"d","numOfAircrafts":2}"#);

        let recon: TemplateDto =
            serde_json::from_str(r#"{"operationName":"T2","taskDescription":"d","numOfAircrafts":2,"cameraType":"SAR","flightRoute":"R1"}"#).unwrap();
        let recon = MissionTemplate::try_from(recon).unwrap();
        assert_eq!(recon.get_surveillance_profile(), Some(&SurveillanceProfile { sensor_type: "SAR".into(), route: "R1".into() }));
    }

    #[test]
    fn test_template_record_with_half_profile_is_rejected() {
        let dto: TemplateDto = serde_json::from_str(r#"{"operationName":"T3","taskDescription":"d","numOfAircrafts":1,"cameraType":"SAR"}"#).unwrap();
        assert!(matches!(MissionTemplate::try_from(dto), Err(Error::ModelConstructionError(_))));
    }

    #[test]
    fn test_surveillance_promotion_without_any_profile_fails() {
        let info = MissionInfo::new("T3", "", 1).unwrap();
        assert!(MissionTemplate::new(info).promote(window(), PromotionKind::Surveillance { profile: None }).is_none());
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::AircraftRecordsDto;
use crate::api::mission_dto::MissionDto;
use crate::api::template_dto::TemplateDto;
use crate::domain::clock::SharedClock;
use crate::domain::mission::Mission;
use crate::domain::registry::MissionRegistry;
use crate::domain::registry_observer::{RegistryChange, RegistryObserver};
use crate::domain::template::MissionTemplate;
use crate::domain::utils::id::AircraftId;
use crate::error::Result;
use crate::loader::parser::{parse_json_file, write_json_file};

pub const AIRCRAFT_FILE: &str = "aircraft.json";
pub const TEMPLATES_FILE: &str = "templates.json";
pub const OPERATIONS_FILE: &str = "operations.json";

/// The three JSON record sets in one data directory.
///
/// Loading requires all three files. After that the store is installed as the
/// registry's observer and rewrites the affected file after every mutation.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        JsonStore { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Creates the data directory and any missing record file as an empty list.
    /// Existing files are left untouched.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        for file in [AIRCRAFT_FILE, TEMPLATES_FILE, OPERATIONS_FILE] {
            let path = self.path(file);
            if !path.exists() {
                write_json_file(&path, &Vec::<u32>::new())?;
                log::info!("Created empty record set '{}'.", path.display());
            }
        }
        Ok(())
    }

    /// Reads all record sets and rebuilds the registry.
    ///
    /// A missing, unreadable or malformed file is fatal.
    pub fn load(&self, clock: SharedClock) -> Result<MissionRegistry> {
        log::info!("Loading record sets from '{}'.", self.data_dir.display());

        let aircraft: AircraftRecordsDto = parse_json_file(self.path(AIRCRAFT_FILE))?;
        let templates: Vec<TemplateDto> = parse_json_file(self.path(TEMPLATES_FILE))?;
        let missions: Vec<MissionDto> = parse_json_file(self.path(OPERATIONS_FILE))?;
        log::debug!("Parsed {} aircraft, {} templates, {} missions.", aircraft.len(), templates.len(), missions.len());

        let aircraft = aircraft.into_iter().map(AircraftId).collect();
        let templates = templates.into_iter().map(MissionTemplate::try_from).collect::<Result<Vec<_>>>()?;
        let missions = missions.into_iter().map(Mission::try_from).collect::<Result<Vec<_>>>()?;

        MissionRegistry::from_records(clock, aircraft, missions, templates)
    }

    /// Loads the registry and installs a clone of this store as its observer.
    /// Bindings the load changed are written back at once.
    pub fn open(&self, clock: SharedClock) -> Result<MissionRegistry> {
        let mut registry = self.load(clock)?;
        registry.set_observer(Box::new(self.clone()));
        Ok(registry)
    }

    pub fn save_aircraft(&self, registry: &MissionRegistry) -> Result<()> {
        let records: AircraftRecordsDto = registry.aircraft().map(|id| id.0).collect();
        write_json_file(self.path(AIRCRAFT_FILE), &records)
    }

    pub fn save_missions(&self, registry: &MissionRegistry) -> Result<()> {
        let records: Vec<MissionDto> = registry.missions().map(MissionDto::from).collect();
        write_json_file(self.path(OPERATIONS_FILE), &records)
    }

    pub fn save_templates(&self, registry: &MissionRegistry) -> Result<()> {
        let records: Vec<TemplateDto> = registry.templates().iter().map(TemplateDto::from).collect();
        write_json_file(self.path(TEMPLATES_FILE), &records)
    }

}

impl RegistryObserver for JsonStore {
    fn on_change(&self, change: &RegistryChange, registry: &MissionRegistry) -> Result<()> {
        log::debug!("Writing through {:?}.", change);
        match change {
            RegistryChange::AircraftAdded(_) => self.save_aircraft(registry),
            RegistryChange::MissionsChanged(_) => self.save_missions(registry),
            RegistryChange::TemplateAdded(_) | RegistryChange::TemplateRemoved(_) => self.save_templates(registry),
        }
    }
}

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::clock::SharedClock;
use crate::domain::mission::{Mission, MissionInfo, MissionKind, TargetLocation};
use crate::domain::registry::MissionRegistry;
use crate::domain::template::{MissionTemplate, PromotionKind, SurveillanceProfile};
use crate::domain::time_window::{TimeWindow, format_timestamp};
use crate::domain::utils::id::AircraftId;
use crate::loader::store::JsonStore;

#[derive(Parser, Debug)]
#[command(name = "ops-scheduler")]
#[command(about = "Assign aircraft to scheduled missions and track their readiness")]
#[command(version)]
pub struct Cli {
    /// Directory holding aircraft.json, templates.json and operations.json
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and empty record sets
    Init,

    /// Register an aircraft by id
    AddAircraft { id: u32 },

    /// Add a scheduled mission
    AddMission {
        name: String,
        #[command(flatten)]
        details: MissionArgs,
        #[command(flatten)]
        window: WindowArgs,
        #[command(subcommand)]
        kind: KindArgs,
    },

    /// List missions whose window touches [start, end]
    ListWindow {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Check whether a mission is ready right now
    Ready { name: String },

    /// Move a mission to a new window and re-run assignment
    Reschedule {
        name: String,
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Add an unscheduled mission template
    AddTemplate {
        name: String,
        #[command(flatten)]
        details: MissionArgs,
        /// Sensor package of a surveillance template
        #[arg(long, requires = "route")]
        sensor: Option<String>,
        /// Planned route of a surveillance template
        #[arg(long, requires = "sensor")]
        route: Option<String>,
    },

    /// Schedule a template as a concrete mission
    Promote {
        name: String,
        #[command(flatten)]
        window: WindowArgs,
        #[command(subcommand)]
        kind: PromoteArgs,
    },

    /// List missions starting within the next HOURS that are not ready
    Unprepared {
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        hours: i64,
    },

    /// Log the full registry
    Summary,
}

#[derive(Args, Debug)]
pub struct MissionArgs {
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub required: u32,
}

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// yyyy-MM-dd HH:mm
    #[arg(long)]
    pub start: String,
    /// yyyy-MM-dd HH:mm
    #[arg(long)]
    pub end: String,
}

impl WindowArgs {
    fn parse(&self) -> anyhow::Result<TimeWindow> {
        TimeWindow::parse(&self.start, &self.end).context("invalid mission window")
    }
}

#[derive(Subcommand, Debug)]
pub enum KindArgs {
    Strike {
        #[arg(long)]
        payload: String,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    Surveillance {
        #[arg(long)]
        sensor: String,
        #[arg(long)]
        route: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromoteArgs {
    Strike {
        #[arg(long)]
        payload: String,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    /// Without --sensor/--route the template's stored profile is used
    Surveillance {
        #[arg(long, requires = "route")]
        sensor: Option<String>,
        #[arg(long, requires = "sensor")]
        route: Option<String>,
    },
}

impl From<KindArgs> for MissionKind {
    fn from(args: KindArgs) -> Self {
        match args {
            KindArgs::Strike { payload, x, y } => MissionKind::strike(payload, TargetLocation::new(x, y)),
            KindArgs::Surveillance { sensor, route } => MissionKind::surveillance(sensor, route),
        }
    }
}

impl From<PromoteArgs> for PromotionKind {
    fn from(args: PromoteArgs) -> Self {
        match args {
            PromoteArgs::Strike { payload, x, y } => PromotionKind::Strike { payload_type: payload, target: TargetLocation::new(x, y) },
            PromoteArgs::Surveillance { sensor, route } => {
                PromotionKind::Surveillance { profile: sensor.zip(route).map(|(sensor_type, route)| SurveillanceProfile { sensor_type, route }) }
            }
        }
    }
}

/// Runs one command against the store in `cli.data_dir`.
///
/// # Returns
/// The lines to show the operator. Rejected business operations are reported as
/// lines, not errors. Errors are load or write failures and invalid input.
pub fn run(cli: Cli, clock: SharedClock) -> anyhow::Result<Vec<String>> {
    let store = JsonStore::new(&cli.data_dir);

    if let Command::Init = cli.command {
        store.init().with_context(|| format!("could not initialise '{}'", cli.data_dir.display()))?;
        return Ok(vec![format!("Initialised record sets in {}", cli.data_dir.display())]);
    }

    let mut registry = store.open(clock).with_context(|| format!("could not load record sets from '{}'", cli.data_dir.display()))?;
    let output = execute(cli.command, &mut registry)?;

    let errors = registry.take_persistence_errors();
    if let Some(first) = errors.into_iter().next() {
        bail!("state changed but could not be written: {}", first);
    }
    Ok(output)
}

fn execute(command: Command, registry: &mut MissionRegistry) -> anyhow::Result<Vec<String>> {
    let lines = match command {
        Command::Init => Vec::new(),

        Command::AddAircraft { id } => {
            if registry.add_aircraft(AircraftId(id)) {
                let names: Vec<String> = registry.commitments_of(AircraftId(id)).iter().map(|m| m.get_name().to_string()).collect();
                vec![format!("Aircraft {} added, assigned to {:?}", id, names)]
            } else {
                vec!["Aircraft ID already exists".to_string()]
            }
        }

        Command::AddMission { name, details, window, kind } => {
            let info = MissionInfo::new(name.as_str(), details.description, details.required)?;
            let mission = Mission::new(info, window.parse()?, kind.into());
            if registry.add_mission(mission) {
                describe(registry.find_mission(&name))
            } else {
                vec!["Operation name already exists".to_string()]
            }
        }

        Command::ListWindow { window } => {
            let window = window.parse()?;
            let mut lines = vec!["Operations:".to_string()];
            lines.extend(registry.missions_overlapping(window.get_start(), window.get_end()).iter().map(|m| m.get_name().to_string()));
            lines
        }

        Command::Ready { name } => match registry.is_mission_ready(&name) {
            Some(true) => vec!["Operation is ready".to_string()],
            Some(false) => vec!["Operation is not ready".to_string()],
            None => vec!["Operation does not exist".to_string()],
        },

        Command::Reschedule { name, window } => {
            if registry.reschedule(&name, window.parse()?) {
                describe(registry.find_mission(&name))
            } else {
                vec!["Operation does not exist".to_string()]
            }
        }

        Command::AddTemplate { name, details, sensor, route } => {
            let mut template = MissionTemplate::new(MissionInfo::new(name.as_str(), details.description, details.required)?);
            if let (Some(sensor), Some(route)) = (sensor, route) {
                template = template.with_surveillance_profile(sensor, route);
            }
            if registry.add_template(template) {
                vec![format!("Template {} added", name)]
            } else {
                vec!["Operation name already exists".to_string()]
            }
        }

        Command::Promote { name, window, kind } => {
            if !registry.template_exists(&name) {
                vec!["Template does not exist".to_string()]
            } else {
                match registry.promote_template(&name, window.parse()?, kind.into()) {
                    Some(mission) => describe(Some(mission)),
                    None => vec!["Cannot create operation".to_string()],
                }
            }
        }

        Command::Unprepared { hours } => {
            let now = registry.now();
            let mut lines = vec![format!("Unprepared operations within {} hours of {}:", hours, format_timestamp(now))];
            lines.extend(registry.unprepared_missions(hours, now).iter().map(|m| m.to_string()));
            lines
        }

        Command::Summary => {
            registry.summary();
            Vec::new()
        }
    };
    Ok(lines)
}

fn describe(mission: Option<&Mission>) -> Vec<String> {
    match mission {
        Some(mission) => vec![mission.to_string()],
        None => Vec::new(),
    }
}

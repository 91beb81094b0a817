use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;
use std::path::Path;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "ops_scheduler.log";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sets up the process-wide logger for the `ops-scheduler` binary.
///
/// Records go to stderr with colored levels and, when `logs/` is writable, to
/// `logs/ops_scheduler.log` without colors. `RUST_LOG` picks the level
/// (`RUST_LOG=debug ops-scheduler summary` shows every binding decision); an unset
/// or unparsable value means `info`. Only the first call installs anything.
pub fn init() {
    let level = std::env::var("RUST_LOG").ok().and_then(|value| value.parse::<LevelFilter>().ok()).unwrap_or(LevelFilter::Info);

    let mut dispatch = Dispatch::new().level(level).level_for("serde", LevelFilter::Warn).chain(console_dispatch());

    let log_file_path = Path::new(LOG_DIR).join(LOG_FILE);
    match file_dispatch(&log_file_path) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(e) => eprintln!("Logging to stderr only, '{}' is not writable: {}", log_file_path.display(), e),
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Logger already installed: {}", e);
        return;
    }

    log::info!("Logging at {} to stderr and '{}'.", level, log_file_path.display());
}

fn console_dispatch() -> Dispatch {
    let colors = ColoredLevelConfig::new().error(Color::Red).warn(Color::Yellow).info(Color::Green).debug(Color::Blue).trace(Color::BrightBlack);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIME_FORMAT), colors.color(record.level()), record.target(), message))
        })
        .chain(std::io::stderr())
}

fn file_dispatch(path: &Path) -> std::io::Result<Dispatch> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fern::log_file(path)?;

    Ok(Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIME_FORMAT), record.level(), record.target(), message)))
        .chain(file))
}

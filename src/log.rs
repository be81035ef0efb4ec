//! Logger set-up for the sizing tool.
//!
//! Routine messages (info and below) go to stdout and problems (warnings and errors) go to stderr.
//! When an output directory is given, each of these streams is also copied to its own log file.
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::OnceLock;

/// Set once the global logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The log level used when neither `SWH_LOG_LEVEL` nor `settings.toml` gives one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable which overrides the log level in `settings.toml`
pub const LOG_LEVEL_ENV_VAR: &str = "SWH_LOG_LEVEL";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// The class of messages a log sink receives
#[derive(Clone, Copy, Debug, PartialEq)]
enum Severity {
    /// Info, debug and trace messages
    Routine,
    /// Warnings and errors
    Problem,
}

impl Severity {
    /// Whether a message at `level` belongs to this class
    fn includes(self, level: Level) -> bool {
        match self {
            Self::Routine => level > Level::Warn,
            Self::Problem => level <= Level::Warn,
        }
    }

    /// The maximum level shown on the console, given the user's chosen level
    fn console_level(self, chosen: LevelFilter) -> LevelFilter {
        match self {
            Self::Routine => chosen,
            Self::Problem => chosen.min(LevelFilter::Warn),
        }
    }

    /// The maximum level written to file. Files always get at least info and all problems.
    fn file_level(self, chosen: LevelFilter) -> LevelFilter {
        match self {
            Self::Routine => chosen.max(LevelFilter::Info),
            Self::Problem => LevelFilter::Warn,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::Routine => "swh_info.log",
            Self::Problem => "swh_error.log",
        }
    }
}

/// Initialise the program logger.
///
/// The level comes from the `SWH_LOG_LEVEL` environment variable if set, then from
/// `log_level_from_settings`, and is otherwise `info`. Accepted levels are `off`, `error`, `warn`,
/// `info`, `debug` and `trace` (in any case).
///
/// If `log_file_path` is given, `swh_info.log` and `swh_error.log` are created (or truncated)
/// there.
pub fn init(log_level_from_settings: Option<&str>, log_file_path: Option<&Path>) -> Result<()> {
    let env_level = env::var(LOG_LEVEL_ENV_VAR).ok();
    let level = resolve_log_level(env_level.as_deref(), log_level_from_settings)?;

    let stdout = console_sink(Severity::Routine, level, io::stdout().is_terminal());
    let stderr = console_sink(Severity::Problem, level, io::stderr().is_terminal());
    let mut dispatch = Dispatch::new()
        .chain(stdout.chain(io::stdout()))
        .chain(stderr.chain(io::stderr()));

    if let Some(dir) = log_file_path {
        for severity in [Severity::Routine, Severity::Problem] {
            dispatch = dispatch.chain(file_sink(severity, level, open_log_file(dir, severity)?));
        }
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Pick the log level, with the environment taking precedence over the settings file
fn resolve_log_level(from_env: Option<&str>, from_settings: Option<&str>) -> Result<LevelFilter> {
    let name = from_env.or(from_settings).unwrap_or(DEFAULT_LOG_LEVEL);
    name.parse().map_err(|_| anyhow!("Unknown log level: {name}"))
}

fn open_log_file(dir: &Path, severity: Severity) -> Result<File> {
    let path = dir.join(severity.file_name());
    File::create(&path).with_context(|| format!("Could not create log file {}", path.display()))
}

/// A dispatcher for the terminal, coloured if `use_colour` is set
fn console_sink(severity: Severity, level: LevelFilter, use_colour: bool) -> Dispatch {
    let colours = use_colour.then(level_colours);
    Dispatch::new()
        .filter(move |metadata| severity.includes(metadata.level()))
        .level(severity.console_level(level))
        .format(move |out, message, record| format_line(out, message, record, colours.as_ref()))
}

fn file_sink(severity: Severity, level: LevelFilter, file: File) -> Dispatch {
    Dispatch::new()
        .filter(move |metadata| severity.includes(metadata.level()))
        .level(severity.file_level(level))
        .format(|out, message, record| format_line(out, message, record, None))
        .chain(file)
}

fn level_colours() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta)
}

/// Format a log line as `HH:MM:SS LEVEL [target] message`
fn format_line(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: Option<&ColoredLevelConfig>,
) {
    let timestamp = Local::now().format("%H:%M:%S");
    let target = record.target();
    match colours {
        Some(colours) => out.finish(format_args!(
            "{timestamp} {} [{target}] {message}",
            colours.color(record.level())
        )),
        None => out.finish(format_args!(
            "{timestamp} {} [{target}] {message}",
            record.level()
        )),
    }
}

//! The command line interface for the sizing tool.
use crate::analysis::{AnalysisReport, AnalysisRequest, run_analysis};
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_results};
use crate::parameters::Defaults;
use crate::settings::Settings;
use crate::site::WardTable;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the sizing tool.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// TOML file with default assumptions, replacing the built-in ones
    #[arg(long)]
    pub defaults: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Size a solar water heating system and appraise its costs and emissions.
    Run {
        /// Path to the analysis request file.
        request_file: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example analyses.
    Example {
        /// The available subcommands for managing example analyses.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate an analysis request without writing any output.
    Validate {
        /// Path to the analysis request file.
        request_file: PathBuf,
        /// TOML file with default assumptions, replacing the built-in ones
        #[arg(long)]
        defaults: Option<PathBuf>,
    },
    /// List the wards in a site data file.
    Wards {
        /// Path to the ward data CSV file.
        ward_file: PathBuf,
    },
    /// Manage program settings.
    Settings {
        /// The subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { request_file, opts } => handle_run_command(&request_file, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate {
                request_file,
                defaults,
            } => handle_validate_command(&request_file, defaults.as_deref(), None),
            Self::Wards { ward_file } => handle_wards_command(&ward_file),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ swh --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load the default assumptions.
///
/// A file given on the command line takes precedence over one named in the settings. If neither
/// is given, the built-in defaults are used.
fn load_defaults(defaults_path: Option<&Path>, settings: &Settings) -> Result<Defaults> {
    match defaults_path.or(settings.defaults_file.as_deref()) {
        Some(path) => {
            info!("Loading default assumptions from {}", path.display());
            Defaults::from_path(path).context("Failed to load default assumptions.")
        }
        None => Ok(Defaults::default()),
    }
}

/// Load and analyse the request at `request_path`
fn analyse_request(request_path: &Path, defaults: &Defaults) -> Result<AnalysisReport> {
    let request =
        AnalysisRequest::from_path(request_path).context("Failed to load analysis request.")?;
    info!("Loaded analysis request from {}", request_path.display());

    run_analysis(&request, defaults).context("Analysis failed.")
}

/// Handle the `run` command.
pub fn handle_run_command(
    request_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(request_path)?;
        &pathbuf
    };

    // This setting can be overridden by command-line argument
    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite =
        create_output_directory(output_path, allow_overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(settings.log_level.as_str()), Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }
    info!("Output folder: {}", output_path.display());

    let defaults = load_defaults(opts.defaults.as_deref(), &settings)?;
    let report = analyse_request(request_path, &defaults)?;
    report.log_summary();

    let results_path = write_results(output_path, &report)?;
    info!("Results written to {}", results_path.display());

    Ok(())
}

/// Handle the `validate` command.
///
/// The full calculation is carried out, so that errors in the site data or assumptions are found,
/// but nothing is written to disk.
pub fn handle_validate_command(
    request_path: &Path,
    defaults_path: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let defaults = load_defaults(defaults_path, &settings)?;
    analyse_request(request_path, &defaults)?;
    info!("Validation successful!");

    Ok(())
}

/// Handle the `wards` command.
pub fn handle_wards_command(ward_file: &Path) -> Result<()> {
    let wards = WardTable::from_path(ward_file).context("Failed to load ward data.")?;
    print!("{}", ward_listing(&wards)?);

    Ok(())
}

/// The ward names in alphabetical order, one per line, followed by a count
fn ward_listing(wards: &WardTable) -> Result<String> {
    ensure!(!wards.is_empty(), "No wards found");

    Ok(format!(
        "{}\n\n{} wards\n",
        wards.ward_names().join("\n"),
        wards.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, write_file};
    use tempfile::tempdir;

    #[test]
    fn test_ward_listing() {
        let dir = tempdir().unwrap();
        let file_path = write_file(
            dir.path(),
            "wards.csv",
            "Ward,Irradiance_kWh/m2/day,Ambient_Temperature_C\n\
            Nyali,6.04,26.8\n\
            kilimani,5.42,19.4\n\
            Karen,5.31,18.6\n\
            NYALI,1.0,1.0\n",
        );
        let wards = WardTable::from_path(&file_path).unwrap();
        assert_eq!(
            ward_listing(&wards).unwrap(),
            "Karen\nkilimani\nNyali\n\n3 wards\n"
        );
    }

    #[test]
    fn test_ward_listing_empty() {
        assert_error!(ward_listing(&WardTable::default()), "No wards found");
    }

    #[test]
    fn test_handle_wards_command() {
        let ward_file: PathBuf = [
            env!("CARGO_MANIFEST_DIR"),
            "demos",
            "residential_nairobi",
            "wards.csv",
        ]
        .iter()
        .collect();
        handle_wards_command(&ward_file).unwrap();

        let dir = tempdir().unwrap();
        assert!(handle_wards_command(&dir.path().join("missing.csv")).is_err());
    }
}

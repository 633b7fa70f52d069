// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use fcptitles::app_config::{self, Config, OutputFormat};
use fcptitles::app_controller::{Controller, RunOutcome};
use fcptitles::file_utils::FileManager;

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputFormat {
    Csv,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract titles from a project, bundle or directory (default command)
    #[command(alias = "x")]
    Extract(ExtractArgs),

    /// Convert a JSON title report back into CSV
    Csv(ConvertArgs),

    /// Generate shell completions for fcptitles
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Project file (.fcpxml), bundle (.fcpxmld, .fcpbundle) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Directory to write output files to (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Do not prefix CSV output with a byte-order mark
    #[arg(long)]
    no_bom: bool,

    /// Print the result to stdout instead of writing a file
    #[arg(long, conflicts_with = "output_dir")]
    stdout: bool,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// JSON report written by `fcptitles --format json`
    #[arg(value_name = "REPORT_PATH")]
    report_path: PathBuf,

    /// Directory to write the CSV to (defaults to the report's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of an existing CSV file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not prefix CSV output with a byte-order mark
    #[arg(long)]
    no_bom: bool,
}

/// fcptitles - Final Cut Pro title extractor
///
/// Extracts on-screen titles from Final Cut Pro XML exports and lists them
/// with HH:MM:SS:FF timecodes, ready to open in a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "fcptitles")]
#[command(version)]
#[command(about = "Extract Final Cut Pro titles to CSV")]
#[command(long_about = "fcptitles reads Final Cut Pro project exports and lists every title with its timecodes.

EXAMPLES:
    fcptitles Project.fcpxml                    # Write Project.titles.csv next to the input
    fcptitles Export.fcpxmld                    # Read Info.fcpxml from a bundle
    fcptitles -f Project.fcpxml                 # Overwrite an existing output file
    fcptitles --format json Project.fcpxml      # Write a JSON report instead of CSV
    fcptitles --stdout Project.fcpxml           # Print the CSV to stdout
    fcptitles -o out/ ~/Exports/                # Process every project in a directory
    fcptitles csv Project.titles.json           # Turn a JSON report into Project.titles.csv
    fcptitles completions bash > fcptitles.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project file (.fcpxml), bundle (.fcpxmld, .fcpbundle) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Directory to write output files to (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Do not prefix CSV output with a byte-order mark
    #[arg(long)]
    no_bom: bool,

    /// Print the result to stdout instead of writing a file
    #[arg(long, conflicts_with = "output_dir")]
    stdout: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself passes everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "fcptitles", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::Csv(args)) => run_convert(args),
        None => {
            // Default behavior - top-level args behave like the extract subcommand
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let extract_args = ExtractArgs {
                input_path,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
                format: cli.format,
                no_bom: cli.no_bom,
                stdout: cli.stdout,
            };
            run_extract(extract_args)
        }
    }
}

fn load_config(
    config_path: &str,
    log_level: Option<&CliLogLevel>,
    format: Option<&CliOutputFormat>,
    no_bom: bool,
) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save_to_file(config_path)?;
        config
    };

    // Override config with CLI options if provided
    if let Some(log_level) = log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(format) = format {
        config.output.format = format.clone().into();
    }

    if no_bom {
        config.output.include_bom = false;
    }

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

// Apply a CLI log level before the config file is read
fn apply_cli_log_level(log_level: Option<&CliLogLevel>) {
    if let Some(cmd_log_level) = log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }
}

fn run_extract(options: ExtractArgs) -> Result<()> {
    apply_cli_log_level(options.log_level.as_ref());

    let config = load_config(
        &options.config_path,
        options.log_level.as_ref(),
        options.format.as_ref(),
        options.no_bom,
    )?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.stdout {
        if !FileManager::file_exists(&options.input_path) && !FileManager::dir_exists(&options.input_path) {
            return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
        }
        let mut stdout = std::io::stdout().lock();
        controller.run_to_writer(&options.input_path, &mut stdout)?;
        return Ok(());
    }

    if FileManager::dir_exists(&options.input_path) && !is_bundle(&options.input_path) {
        let summary = controller.run_folder(
            options.input_path.clone(),
            options.output_dir.clone(),
            options.force_overwrite,
        )?;
        if summary.failed > 0 {
            return Err(anyhow!("{} project(s) failed", summary.failed));
        }
    } else if options.input_path.exists() {
        match controller.run(options.input_path.clone(), options.output_dir.clone(), options.force_overwrite)? {
            RunOutcome::Written { path, .. } => println!("{}", path.display()),
            RunOutcome::Skipped { .. } => {}
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    apply_cli_log_level(options.log_level.as_ref());

    let config = load_config(&options.config_path, options.log_level.as_ref(), None, options.no_bom)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    match controller.convert_report(&options.report_path, options.output_dir.as_deref(), options.force_overwrite)? {
        RunOutcome::Written { path, .. } => println!("{}", path.display()),
        RunOutcome::Skipped { .. } => {}
    }

    Ok(())
}

// Bundle packages are directories on macOS but are processed as one project
fn is_bundle(path: &Path) -> bool {
    fcptitles::project_source::ProjectKind::from_path(path)
        == fcptitles::project_source::ProjectKind::Bundle
}

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Input handling
    #[serde(default)]
    pub input: InputConfig,

    /// Output handling
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output file format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    // @format: Comma separated values, one row per title
    #[default]
    Csv,
    // @format: JSON report with a count and the title list
    Json,
}

impl OutputFormat {
    // @returns: File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Invalid output format: {}", s)),
        }
    }
}

/// Settings applied when reading project files
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    /// Largest project file or bundle member accepted, in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

/// Settings applied when writing extracted titles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Prefix CSV output with a UTF-8 byte-order mark so spreadsheet
    /// applications detect the encoding
    #[serde(default = "default_true")]
    pub include_bom: bool,

    /// CSV header row
    #[serde(default = "default_csv_headers")]
    pub headers: [String; 3],

    /// Directory for output files; defaults to the input file's directory
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_bom: default_true(),
            headers: default_csv_headers(),
            output_dir: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_input_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_csv_headers() -> [String; 3] {
    [
        "start timecode".to_string(),
        "end timecode".to_string(),
        "title text".to_string(),
    ]
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.input.max_input_bytes == 0 {
            return Err(anyhow!("max_input_bytes must be greater than zero"));
        }

        if let Some(empty) = self.output.headers.iter().position(|h| h.trim().is_empty()) {
            return Err(anyhow!("CSV header {} must not be empty", empty + 1));
        }

        if let Some(dir) = &self.output.output_dir {
            if dir.trim().is_empty() {
                return Err(anyhow!("output_dir must not be an empty string"));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

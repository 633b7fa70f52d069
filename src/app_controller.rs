use anyhow::{Context, Result};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, OutputFormat};
use crate::errors::AppError;
use crate::export::{CsvExporter, ExtractionReport};
use crate::file_utils::FileManager;
use crate::project_source::{self, ProjectSource};
use crate::title_extractor::{self, TitleRecord};

// @module: Application controller for title extraction

/// Outcome of processing a single project
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Titles were extracted and written to the given path
    Written { path: PathBuf, count: usize },
    /// The output already existed and overwriting was not requested
    Skipped { path: PathBuf },
}

/// Totals for a folder run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for title extraction
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load and extract the titles of a single project without writing anything
    pub fn extract_titles<P: AsRef<Path>>(&self, input_file: P) -> Result<(ProjectSource, Vec<TitleRecord>), AppError> {
        let input_file = input_file.as_ref();
        let source = project_source::load_project_xml(input_file, self.config.input.max_input_bytes)?;
        debug!("Loaded {} bytes of XML from {:?}", source.xml.len(), source.origin);

        let extraction = title_extractor::extract_with_stats(&source.xml)?;
        if extraction.titles_dropped > 0 {
            warn!(
                "{} of {} title(s) in {:?} had no text and were skipped",
                extraction.titles_dropped, extraction.titles_found, input_file
            );
        }

        if extraction.records.is_empty() {
            return Err(AppError::NoTitles(input_file.display().to_string()));
        }

        Ok((source, extraction.records))
    }

    /// Render records in the configured output format
    pub fn render(&self, records: Vec<TitleRecord>) -> Result<Vec<u8>, AppError> {
        match self.config.output.format {
            OutputFormat::Csv => Ok(CsvExporter::from_config(&self.config.output).to_bytes(&records)),
            OutputFormat::Json => Ok(ExtractionReport::new(records).to_json_string()?.into_bytes()),
        }
    }

    /// Output path for `input_file`, honoring the configured output directory
    pub fn output_path_for(&self, input_file: &Path, output_dir: Option<&Path>) -> PathBuf {
        let dir = self.resolve_output_dir(input_file, output_dir);
        FileManager::generate_output_path(input_file, dir, self.config.output.format.extension())
    }

    // CLI directory first, then the configured one, then the input's own directory
    fn resolve_output_dir(&self, input_file: &Path, output_dir: Option<&Path>) -> PathBuf {
        match (output_dir, &self.config.output.output_dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(configured)) => PathBuf::from(configured),
            (None, None) => input_file.parent().unwrap_or(Path::new(".")).to_path_buf(),
        }
    }

    /// Extract the titles of one project and write them next to it (or into `output_dir`)
    pub fn run(&self, input_file: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<RunOutcome> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = self.output_path_for(&input_file, output_dir.as_deref());
        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(RunOutcome::Skipped { path: output_path });
        }

        let (_, records) = self.extract_titles(&input_file)?;
        let count = records.len();

        let bytes = self.render(records)?;
        FileManager::write_bytes(&output_path, &bytes)?;

        info!(
            "Extracted {} title(s) to {:?} in {:.2?}",
            count,
            output_path,
            start_time.elapsed()
        );

        Ok(RunOutcome::Written { path: output_path, count })
    }

    /// Process every project found under `input_dir`
    pub fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<FolderSummary> {
        info!("Scanning directory: {:?}", input_dir);

        let projects = FileManager::find_project_files(&input_dir)?;
        if projects.is_empty() {
            warn!("No project files found in {:?}", input_dir);
        }

        let mut summary = FolderSummary::default();
        for project in projects {
            info!("Processing project: {:?}", project);
            match self.run(project.clone(), output_dir.clone(), force_overwrite) {
                Ok(RunOutcome::Written { .. }) => summary.processed += 1,
                Ok(RunOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing {:?}: {}", project, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Finished: {} processed, {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        );

        Ok(summary)
    }

    /// Convert a saved JSON report back into CSV.
    ///
    /// `Project.titles.json` becomes `Project.titles.csv`. Every record is
    /// validated before anything is written.
    pub fn convert_report(&self, report_file: &Path, output_dir: Option<&Path>, force_overwrite: bool) -> Result<RunOutcome> {
        if !FileManager::file_exists(report_file) {
            return Err(anyhow::anyhow!("Report file does not exist: {:?}", report_file));
        }

        let stem = report_file.file_stem().unwrap_or_default().to_string_lossy();
        let output_path = self
            .resolve_output_dir(report_file, output_dir)
            .join(format!("{}.{}", stem, OutputFormat::Csv.extension()));
        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(RunOutcome::Skipped { path: output_path });
        }

        let json = FileManager::read_to_string(report_file)?;
        let report = ExtractionReport::from_json_str(&json)
            .with_context(|| format!("Invalid title report: {:?}", report_file))?;
        if report.count != report.titles.len() {
            warn!(
                "Report count {} does not match its {} title(s); using the titles",
                report.count,
                report.titles.len()
            );
        }

        CsvExporter::from_config(&self.config.output).write_to_file(&report.titles, &output_path)?;
        info!("Converted {} title(s) to {:?}", report.titles.len(), output_path);

        Ok(RunOutcome::Written { path: output_path, count: report.titles.len() })
    }

    /// Extract one project and return the rendered output instead of writing it
    pub fn run_to_writer<W: std::io::Write>(&self, input_file: &Path, writer: &mut W) -> Result<usize> {
        let (_, records) = self.extract_titles(input_file)?;
        let count = records.len();

        let bytes = self.render(records)?;
        writer.write_all(&bytes).context("Failed to write output")?;
        writer.flush()?;

        Ok(count)
    }
}

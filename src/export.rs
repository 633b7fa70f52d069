/*!
 * CSV and JSON output for extracted titles.
 */

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::app_config::OutputConfig;
use crate::errors::ExportError;
use crate::timecode;
use crate::title_extractor::TitleRecord;

/// UTF-8 byte-order mark, lets spreadsheet applications pick the right encoding
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes title records as CSV
#[derive(Debug, Clone)]
pub struct CsvExporter {
    // @field: Header row
    pub headers: [String; 3],

    // @field: Prefix output with a BOM
    pub include_bom: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::from_config(&OutputConfig::default())
    }
}

impl CsvExporter {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            headers: config.headers.clone(),
            include_bom: config.include_bom,
        }
    }

    /// Render the header row followed by one row per record
    pub fn to_csv_string(&self, records: &[TitleRecord]) -> String {
        let mut output = String::new();
        Self::push_row(&mut output, self.headers.iter().map(String::as_str));

        for record in records {
            Self::push_row(
                &mut output,
                [
                    record.start_timecode.as_str(),
                    record.end_timecode.as_str(),
                    record.text.as_str(),
                ],
            );
        }

        output
    }

    /// Encoded CSV, with the BOM when enabled
    pub fn to_bytes(&self, records: &[TitleRecord]) -> Vec<u8> {
        let csv = self.to_csv_string(records);
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + csv.len());
        if self.include_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(csv.as_bytes());
        bytes
    }

    /// Write the CSV to `path`, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(&self, records: &[TitleRecord], path: P) -> anyhow::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        file.write_all(&self.to_bytes(records))
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

        Ok(())
    }

    fn push_row<'a, I>(output: &mut String, fields: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                output.push(',');
            }
            output.push_str(&escape_field(field));
        }
        output.push_str("\r\n");
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// JSON report of an extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub success: bool,
    pub count: usize,
    pub titles: Vec<TitleRecord>,
}

impl ExtractionReport {
    pub fn new(titles: Vec<TitleRecord>) -> Self {
        Self {
            success: true,
            count: titles.len(),
            titles,
        }
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report, rejecting records whose timecodes are malformed
    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        let report: ExtractionReport = serde_json::from_str(json)?;
        validate_records(&report.titles)?;
        Ok(report)
    }
}

/// Check that every record carries well-formed timecodes with end >= start
pub fn validate_records(records: &[TitleRecord]) -> Result<(), ExportError> {
    for (index, record) in records.iter().enumerate() {
        let invalid = |reason: String| ExportError::InvalidRecord { index, reason };

        let start = timecode::timecode_to_seconds(&record.start_timecode)
            .ok_or_else(|| invalid(format!("bad start timecode '{}'", record.start_timecode)))?;
        let end = timecode::timecode_to_seconds(&record.end_timecode)
            .ok_or_else(|| invalid(format!("bad end timecode '{}'", record.end_timecode)))?;

        if end < start {
            return Err(invalid(format!(
                "end {} precedes start {}",
                record.end_timecode, record.start_timecode
            )));
        }
    }
    Ok(())
}

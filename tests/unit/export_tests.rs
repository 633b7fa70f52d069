/*!
 * Tests for CSV and JSON export
 */

use anyhow::Result;
use fcptitles::app_config::OutputConfig;
use fcptitles::errors::ExportError;
use fcptitles::export::{validate_records, CsvExporter, ExtractionReport, UTF8_BOM};
use fcptitles::title_extractor::TitleRecord;
use crate::common;

fn sample_records() -> Vec<TitleRecord> {
    vec![
        TitleRecord::new("00:00:00:00".into(), "00:00:06:00".into(), "First title".into()),
        TitleRecord::new("00:00:06:00".into(), "00:00:14:00".into(), "Hello, \"world\"".into()),
    ]
}

#[test]
fn test_toCsvString_withRecords_shouldWriteHeaderAndRows() {
    let exporter = CsvExporter::default();

    let csv = exporter.to_csv_string(&sample_records());

    assert_eq!(
        csv,
        "start timecode,end timecode,title text\r\n\
         00:00:00:00,00:00:06:00,First title\r\n\
         00:00:06:00,00:00:14:00,\"Hello, \"\"world\"\"\"\r\n"
    );
}

#[test]
fn test_toCsvString_withCustomHeaders_shouldUseThem() {
    let config = OutputConfig {
        headers: ["開始".to_string(), "終了".to_string(), "テロップ".to_string()],
        ..OutputConfig::default()
    };
    let exporter = CsvExporter::from_config(&config);

    let csv = exporter.to_csv_string(&[]);

    assert_eq!(csv, "開始,終了,テロップ\r\n");
}

#[test]
fn test_toBytes_withNonAsciiText_shouldStayUtf8AfterBom() {
    let exporter = CsvExporter::default();
    let records = vec![TitleRecord::new(
        "00:00:34:00".into(),
        "00:00:40:00".into(),
        "博多の中心地「天神」から10分のお部屋".into(),
    )];

    let bytes = exporter.to_bytes(&records);

    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    assert!(text.ends_with("00:00:34:00,00:00:40:00,博多の中心地「天神」から10分のお部屋\r\n"));
}

#[test]
fn test_writeToFile_withNestedPath_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out/nested/titles.csv");

    CsvExporter::default().write_to_file(&sample_records(), &path)?;

    let written = std::fs::read(&path)?;
    assert!(written.starts_with(UTF8_BOM));
    assert_eq!(written.len(), UTF8_BOM.len() + CsvExporter::default().to_csv_string(&sample_records()).len());
    Ok(())
}

#[test]
fn test_extractionReport_toJson_shouldIncludeCountAndSnakeCaseFields() -> Result<()> {
    let report = ExtractionReport::new(sample_records());

    let json = report.to_json_string()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    assert_eq!(value["success"], true);
    assert_eq!(value["count"], 2);
    assert_eq!(value["titles"][0]["start_timecode"], "00:00:00:00");
    assert_eq!(value["titles"][1]["text"], "Hello, \"world\"");
    Ok(())
}

#[test]
fn test_extractionReport_fromJson_withValidReport_shouldParse() -> Result<()> {
    let json = ExtractionReport::new(sample_records()).to_json_string()?;

    let report = ExtractionReport::from_json_str(&json)?;

    assert_eq!(report.titles, sample_records());
    Ok(())
}

#[test]
fn test_extractionReport_fromJson_withBadTimecode_shouldReportRecord() {
    let json = r#"{"success":true,"count":1,"titles":[{"start_timecode":"00:00:01","end_timecode":"00:00:02:00","text":"x"}]}"#;

    let result = ExtractionReport::from_json_str(json);

    assert!(matches!(result, Err(ExportError::InvalidRecord { index: 0, .. })));
}

#[test]
fn test_extractionReport_fromJson_withMalformedJson_shouldReportSerialization() {
    let result = ExtractionReport::from_json_str("{not json");

    assert!(matches!(result, Err(ExportError::Serialization(_))));
}

#[test]
fn test_validateRecords_withEndBeforeStart_shouldFail() {
    let records = vec![
        TitleRecord::new("00:00:01:00".into(), "00:00:02:00".into(), "ok".into()),
        TitleRecord::new("00:00:05:00".into(), "00:00:04:59".into(), "bad".into()),
    ];

    let err = validate_records(&records).unwrap_err();

    assert!(matches!(err, ExportError::InvalidRecord { index: 1, .. }));
    assert!(err.to_string().contains("precedes"));
}

use anyhow::Result;
use record_pipeline::app::export_use_case::ExportDocument;
use record_pipeline::{Config, Record, RecordProcessor, RecordStatus};
use std::io::Write;
use tempfile::tempdir;

#[tokio::test]
async fn test_export_document_reparses() -> Result<()> {
    let temp_dir = tempdir()?;
    let output = temp_dir.path().join("processed_data.json");

    let mut processor = RecordProcessor::new(Config {
        step_delay_ms: 0,
        ..Config::default()
    })?;
    let batch: Vec<Record> = (0..6)
        .map(|i| Record::new(format!("r{}", i), 25.0 * i as f64).map(|r| r.with_tags(["source", "type"])))
        .collect::<std::result::Result<_, _>>()?;
    let completed = processor.process_batch(batch).await;
    processor.accumulate(completed);

    let summary = processor.export(&output, "json").await?;
    assert_eq!(summary.record_count, 6);

    let document: ExportDocument = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(document.metadata.record_count, 6);
    assert_eq!(document.records.len(), 6);
    assert_eq!(document.metadata.statistics.processed_count, 6);
    for view in &document.records {
        assert_eq!(view.status, RecordStatus::Completed);
    }

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(raw["records"][0]["status"], "completed");
    assert!(raw["records"][0]["age_hours"].is_number());
    assert!(raw["metadata"]["export_time"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_export_preserves_each_status() -> Result<()> {
    let temp_dir = tempdir()?;
    let output = temp_dir.path().join("mixed.json");

    let mut processor = RecordProcessor::new(Config {
        step_delay_ms: 0,
        ..Config::default()
    })?;
    let report = processor
        .run_batch(vec![
            Record::new("ok", 10.0)?.with_tags(["source", "type"]),
            Record::new("bad", 10.0)?,
        ])
        .await;
    let failed: Vec<Record> = report.failed.into_iter().map(|f| f.record).collect();
    processor.accumulate(report.completed);
    processor.accumulate(failed);
    processor.accumulate([Record::new("untouched", 1.0)?]);

    processor.export(&output, "json").await?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    let statuses: Vec<(&str, &str)> = raw["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["id"].as_str().unwrap(), r["status"].as_str().unwrap()))
        .collect();
    assert_eq!(
        statuses,
        vec![("ok", "completed"), ("bad", "failed"), ("untouched", "pending")]
    );
    Ok(())
}

#[tokio::test]
async fn test_config_file_drives_processor() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    write!(
        file,
        r#"{{"processing_steps": ["categorize"], "validation_rules": {{"required_tags": []}}}}"#
    )?;

    let config = Config::load_or_default(Some(file.path()));
    let processor = RecordProcessor::new(config)?;
    let results = processor.process_batch(vec![Record::new("r1", 75.0)?]).await;

    assert_eq!(results[0].metadata["category"], "high");
    assert!(!results[0].metadata.contains_key("normalized"));
    Ok(())
}

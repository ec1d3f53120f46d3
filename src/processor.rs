use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::app::export_use_case::{ExportFormat, ExportSummary, ExportUseCase};
use crate::app::ports::ExportPort;
use crate::config::Config;
use crate::error::Result;
use crate::infra::JsonFileExportAdapter;
use crate::pipeline::{BatchCoordinator, BatchReport, PipelineExecutor, Statistics, StatsAggregator, StepKind, StepRegistry};
use crate::types::Record;

/// Totals for a multi-batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub batches: usize,
    pub timed_out_batches: usize,
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Owns the configuration, the resolved step plan, the running statistics and
/// the records accumulated across batches
pub struct RecordProcessor {
    config: Config,
    coordinator: BatchCoordinator,
    stats: Arc<StatsAggregator>,
    records: Vec<Record>,
}

impl RecordProcessor {
    /// Build a processor. Statistics start counting from here.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let plan = StepRegistry::global().resolve(config.processing_steps.as_slice(), config.unknown_steps)?;
        info!(
            "Resolved processing plan: [{}]",
            plan.iter().map(StepKind::as_str).collect::<Vec<_>>().join(", ")
        );

        let executor = PipelineExecutor::new(plan, config.validation_rules.clone(), config.step_delay());
        let stats = Arc::new(StatsAggregator::new());
        let coordinator = BatchCoordinator::new(executor, Arc::clone(&stats), config.timeout());

        Ok(Self {
            config,
            coordinator,
            stats,
            records: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The resolved step plan, after unknown names were dropped
    pub fn plan(&self) -> &[StepKind] {
        self.coordinator.executor().steps()
    }

    /// Process one batch and return only the records that completed
    pub async fn process_batch(&self, records: Vec<Record>) -> Vec<Record> {
        self.run_batch(records).await.into_completed()
    }

    /// Process one batch and return the full report
    pub async fn run_batch(&self, records: Vec<Record>) -> BatchReport {
        self.coordinator.run(records).await
    }

    /// Split `records` into sequential batches of `batch_size`, process each,
    /// and keep every completed record.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn process_all(&mut self, records: Vec<Record>) -> RunSummary {
        let batch_size = self.config.batch_size;
        let mut summary = RunSummary {
            submitted: records.len(),
            ..RunSummary::default()
        };

        let mut remaining = records.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<Record> = remaining.by_ref().take(batch_size).collect();
            let report = self.run_batch(batch).await;

            summary.batches += 1;
            if report.timed_out {
                summary.timed_out_batches += 1;
            }
            summary.completed += report.completed.len();
            summary.failed += report.failed_count();
            self.records.extend(report.completed);

            info!(
                "Completed batch {}, processed {} records",
                summary.batches,
                self.records.len()
            );
        }

        summary
    }

    /// Records accumulated by [`process_all`](Self::process_all) or [`accumulate`](Self::accumulate)
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn accumulate(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn statistics(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// Export the accumulated records.
    ///
    /// Fails with `UnsupportedFormat` for anything but `json`; nothing is
    /// written in that case.
    pub async fn export(&self, output_path: &Path, format: &str) -> Result<ExportSummary> {
        let format: ExportFormat = format.parse()?;
        let output: Box<dyn ExportPort> = match format {
            ExportFormat::Json => Box::new(JsonFileExportAdapter::new(output_path)),
        };
        let summary = ExportUseCase::new(output)
            .export(&self.records, self.statistics())
            .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownStepPolicy;
    use crate::error::{ConfigError, PipelineError};
    use crate::types::RecordStatus;

    fn fast_config() -> Config {
        Config {
            step_delay_ms: 0,
            ..Config::default()
        }
    }

    fn valid(id: &str, value: f64) -> Record {
        Record::new(id, value).unwrap().with_tags(["source", "type"])
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            timeout_seconds: -1.0,
            ..Config::default()
        };
        assert!(matches!(
            RecordProcessor::new(config),
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));

        let oversized = Config {
            timeout_seconds: 1e20,
            ..Config::default()
        };
        assert!(matches!(
            RecordProcessor::new(oversized),
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_unknown_step_policy() {
        let steps = vec!["validate".to_string(), "normalise".to_string()];
        let lenient = RecordProcessor::new(Config {
            processing_steps: steps.clone(),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(lenient.plan(), &[StepKind::Validate]);

        let strict = RecordProcessor::new(Config {
            processing_steps: steps,
            unknown_steps: UnknownStepPolicy::Error,
            ..Config::default()
        });
        assert!(matches!(
            strict,
            Err(PipelineError::Config(ConfigError::UnknownStep(_)))
        ));
    }

    #[tokio::test]
    async fn test_process_all_batches_sequentially() {
        let mut processor = RecordProcessor::new(Config {
            batch_size: 4,
            ..fast_config()
        })
        .unwrap();
        let mut records: Vec<Record> = (0..10).map(|i| valid(&format!("r{}", i), 20.0)).collect();
        records.push(Record::new("untagged", 20.0).unwrap());

        let summary = processor.process_all(records).await;

        assert_eq!(summary.batches, 3);
        assert_eq!(summary.submitted, 11);
        assert_eq!(summary.completed, 10);
        assert_eq!(summary.failed, 1);
        assert_eq!(processor.records().len(), 10);
        assert!(processor
            .records()
            .iter()
            .all(|r| r.status() == RecordStatus::Completed));

        let stats = processor.statistics();
        assert_eq!(stats.processed_count, 10);
        assert_eq!(stats.failed_count, 1);
    }

    #[tokio::test]
    async fn test_counters_accumulate_across_batches() {
        let processor = RecordProcessor::new(fast_config()).unwrap();
        processor.process_batch(vec![valid("a", 1.0), valid("b", 2.0)]).await;
        processor.process_batch(vec![valid("c", 3.0)]).await;
        assert_eq!(processor.statistics().processed_count, 3);
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let processor = RecordProcessor::new(fast_config()).unwrap();

        let err = processor.export(&path, "csv").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Export(crate::error::ExportError::UnsupportedFormat(_))
        ));
        assert!(!path.exists());
    }
}

//! Metrics for the record pipeline
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op. The binary installs a Prometheus recorder with
//! [`init`] and can render a snapshot at the end of a run.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

/// Every metric name used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Batch metrics
    BatchesProcessed,
    BatchesTimedOut,
    BatchSize,
    BatchDuration,
    RecordsCompleted,
    RecordsFailed,
    RecordsDiscarded,

    // Step metrics
    StepsApplied,
    StepFailures,

    // Export metrics
    ExportsWritten,
    ExportedRecords,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::BatchesProcessed => "pipeline_batches_processed_total",
            MetricName::BatchesTimedOut => "pipeline_batches_timed_out_total",
            MetricName::BatchSize => "pipeline_batch_size",
            MetricName::BatchDuration => "pipeline_batch_duration_seconds",
            MetricName::RecordsCompleted => "pipeline_records_completed_total",
            MetricName::RecordsFailed => "pipeline_records_failed_total",
            MetricName::RecordsDiscarded => "pipeline_records_discarded_total",
            MetricName::StepsApplied => "pipeline_steps_applied_total",
            MetricName::StepFailures => "pipeline_step_failures_total",
            MetricName::ExportsWritten => "pipeline_exports_written_total",
            MetricName::ExportedRecords => "pipeline_exported_records_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::BatchesProcessed,
            MetricName::BatchesTimedOut,
            MetricName::BatchSize,
            MetricName::BatchDuration,
            MetricName::RecordsCompleted,
            MetricName::RecordsFailed,
            MetricName::RecordsDiscarded,
            MetricName::StepsApplied,
            MetricName::StepFailures,
            MetricName::ExportsWritten,
            MetricName::ExportedRecords,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder and return a handle for rendering
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

// ============================================================================
// Batch Metrics
// ============================================================================

pub mod batch {
    use super::MetricName;

    /// Record a batch that finished inside its deadline
    pub fn completed(completed: usize, failed: usize, duration_secs: f64) {
        ::metrics::counter!(MetricName::BatchesProcessed.as_str()).increment(1);
        ::metrics::counter!(MetricName::RecordsCompleted.as_str()).increment(completed as u64);
        ::metrics::counter!(MetricName::RecordsFailed.as_str()).increment(failed as u64);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record((completed + failed) as f64);
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(duration_secs);
    }

    /// Record a batch discarded by its deadline
    pub fn timed_out(submitted: usize) {
        ::metrics::counter!(MetricName::BatchesTimedOut.as_str()).increment(1);
        ::metrics::counter!(MetricName::RecordsDiscarded.as_str()).increment(submitted as u64);
    }
}

// ============================================================================
// Step Metrics
// ============================================================================

pub mod steps {
    use super::MetricName;

    pub fn step_applied(step: &'static str) {
        ::metrics::counter!(MetricName::StepsApplied.as_str(), "step" => step).increment(1);
    }

    pub fn step_failed(step: &'static str) {
        ::metrics::counter!(MetricName::StepFailures.as_str(), "step" => step).increment(1);
    }
}

// ============================================================================
// Export Metrics
// ============================================================================

pub mod export {
    use super::MetricName;

    pub fn written(format: &'static str, records: usize) {
        ::metrics::counter!(MetricName::ExportsWritten.as_str(), "format" => format).increment(1);
        ::metrics::counter!(MetricName::ExportedRecords.as_str()).increment(records as u64);
    }
}

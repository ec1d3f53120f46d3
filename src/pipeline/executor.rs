use crate::config::ValidationRules;
use crate::error::StepError;
use crate::pipeline::steps::StepKind;
use crate::types::{Record, RecordStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// A record that did not make it through its steps, returned with the error
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub record: Record,
    /// The step that raised, if the failure happened inside one
    pub step: Option<StepKind>,
    pub error: StepError,
}

/// Threads one record through the resolved step plan
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    steps: Arc<[StepKind]>,
    rules: Arc<ValidationRules>,
    step_delay: Duration,
}

impl PipelineExecutor {
    pub fn new(steps: Vec<StepKind>, rules: ValidationRules, step_delay: Duration) -> Self {
        Self {
            steps: steps.into(),
            rules: Arc::new(rules),
            step_delay,
        }
    }

    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// The record is marked `Processing` on entry and `Completed` on success.
    /// A failing record is handed back unmarked; the caller decides how to
    /// record the failure. Each step boundary is a suspension point.
    pub async fn execute(&self, mut record: Record) -> Result<Record, RecordFailure> {
        if !record.advance_status(RecordStatus::Processing) {
            let error = StepError::InvalidState {
                record_id: record.id.clone(),
                status: record.status().to_string(),
            };
            return Err(RecordFailure { record, step: None, error });
        }

        for step in self.steps.iter() {
            self.pause().await;

            if let Err(e) = step.apply(&mut record, &self.rules) {
                error!("Error in step {} for record {}: {}", step, record.id, e);
                crate::observability::metrics::steps::step_failed(step.as_str());
                return Err(RecordFailure { record, step: Some(*step), error: e });
            }
            crate::observability::metrics::steps::step_applied(step.as_str());
        }

        record.advance_status(RecordStatus::Completed);
        debug!("Record {} completed {} steps", record.id, self.steps.len());
        Ok(record)
    }

    async fn pause(&self) {
        if self.step_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.step_delay).await;
        }
    }
}

use crate::pipeline::executor::{PipelineExecutor, RecordFailure};
use crate::pipeline::stats::StatsAggregator;
use crate::types::{Record, RecordStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

type RecordOutcome = Result<Record, RecordFailure>;

/// What happened to one batch
#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub submitted: usize,
    /// Records that finished every step, in completion order
    pub completed: Vec<Record>,
    /// Records whose steps failed, marked `Failed`
    pub failed: Vec<RecordFailure>,
    /// Tasks that panicked or were cancelled; their records are gone
    pub lost: usize,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl BatchReport {
    fn timed_out(batch_id: Uuid, submitted: usize, elapsed: Duration) -> Self {
        Self {
            batch_id,
            submitted,
            completed: Vec::new(),
            failed: Vec::new(),
            lost: 0,
            timed_out: true,
            elapsed,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len() + self.lost
    }

    pub fn into_completed(self) -> Vec<Record> {
        self.completed
    }
}

/// Runs one task per record and joins them under a single deadline
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    executor: Arc<PipelineExecutor>,
    stats: Arc<StatsAggregator>,
    timeout: Duration,
}

impl BatchCoordinator {
    pub fn new(executor: PipelineExecutor, stats: Arc<StatsAggregator>, timeout: Duration) -> Self {
        Self {
            executor: Arc::new(executor),
            stats,
            timeout,
        }
    }

    pub fn executor(&self) -> &PipelineExecutor {
        &self.executor
    }

    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    /// Process a batch concurrently.
    ///
    /// If the deadline passes before every task finishes, all tasks are
    /// aborted and the whole batch is discarded: nothing is returned and the
    /// statistics are left untouched. Otherwise each success increments the
    /// processed counter and each failure is marked `Failed` and increments
    /// the failed counter.
    pub async fn run(&self, records: Vec<Record>) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", %batch_id, size = records.len());
        self.run_inner(batch_id, records).instrument(span).await
    }

    async fn run_inner(&self, batch_id: Uuid, records: Vec<Record>) -> BatchReport {
        let submitted = records.len();
        info!("Processing batch of {} records", submitted);
        let started = Instant::now();

        let mut tasks = JoinSet::new();
        for record in records {
            let executor = Arc::clone(&self.executor);
            tasks.spawn(async move { executor.execute(record).await });
        }

        let joined = tokio::time::timeout(self.timeout, drain(&mut tasks)).await;
        let outcomes = match joined {
            Ok(outcomes) => outcomes,
            Err(_) => {
                tasks.abort_all();
                let elapsed = started.elapsed();
                error!(
                    "Batch processing timed out after {:.3}s, discarding {} records",
                    self.timeout.as_secs_f64(),
                    submitted
                );
                crate::observability::metrics::batch::timed_out(submitted);
                return BatchReport::timed_out(batch_id, submitted, elapsed);
            }
        };

        let mut report = BatchReport {
            batch_id,
            submitted,
            completed: Vec::with_capacity(submitted),
            failed: Vec::new(),
            lost: 0,
            timed_out: false,
            elapsed: Duration::ZERO,
        };

        for outcome in outcomes {
            self.settle(&mut report, outcome);
        }

        report.elapsed = started.elapsed();
        crate::observability::metrics::batch::completed(
            report.completed.len(),
            report.failed_count(),
            report.elapsed.as_secs_f64(),
        );
        info!(
            "Batch finished in {:.3}s: {} completed, {} failed",
            report.elapsed.as_secs_f64(),
            report.completed.len(),
            report.failed_count()
        );
        report
    }

    /// Fold one task outcome into the report and the counters.
    ///
    /// Step errors of any kind and tasks that panicked all count as failures
    /// of their own record only.
    fn settle(&self, report: &mut BatchReport, outcome: Result<RecordOutcome, JoinError>) {
        match outcome {
            Ok(Ok(record)) => {
                self.stats.record_processed();
                report.completed.push(record);
            }
            Ok(Err(mut failure)) => {
                error!(
                    record_id = %failure.record.id,
                    step = failure.step.map(|s| s.as_str()).unwrap_or("-"),
                    "Failed to process record {}: {}",
                    failure.record.id,
                    failure.error
                );
                if !failure.record.advance_status(RecordStatus::Failed) {
                    warn!(
                        "Record {} left as {} after failure",
                        failure.record.id,
                        failure.record.status()
                    );
                }
                self.stats.record_failed();
                report.failed.push(failure);
            }
            Err(e) => {
                error!("Record task did not finish: {}", e);
                self.stats.record_failed();
                report.lost += 1;
            }
        }
    }
}

async fn drain(tasks: &mut JoinSet<RecordOutcome>) -> Vec<Result<RecordOutcome, JoinError>> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(outcome) = tasks.join_next().await {
        outcomes.push(outcome);
    }
    outcomes
}

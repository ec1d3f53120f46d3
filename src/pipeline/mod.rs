// Pipeline execution: named steps, per-record executor, batch coordination, stats

pub mod batch;
pub mod executor;
pub mod stats;
pub mod steps;

// Re-export key types for convenience
pub use batch::{BatchCoordinator, BatchReport};
pub use executor::{PipelineExecutor, RecordFailure};
pub use stats::{Statistics, StatsAggregator};
pub use steps::{Category, StepKind, StepRegistry};

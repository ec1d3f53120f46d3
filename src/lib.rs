//! Batch record transformation pipeline
//!
//! Records flow through a configured sequence of named steps (validate,
//! normalize, categorize, enrich). Each batch is processed concurrently under
//! one deadline; statistics accumulate across batches and the final records
//! can be exported as JSON.

pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod processor;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;

// Re-export commonly used types
pub use config::{Config, UnknownStepPolicy, ValidationRules};
pub use error::{PipelineError, Result};
pub use processor::{RecordProcessor, RunSummary};
pub use types::{Record, RecordStatus, RecordView};

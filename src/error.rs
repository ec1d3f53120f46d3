use thiserror::Error;

/// Raised when a record cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Value cannot be negative: {0}")]
    NegativeValue(f64),

    #[error("Value must be a finite number: {0}")]
    NonFiniteValue(f64),
}

/// Raised by the validate step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Value {value} out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Missing required tags: {}", missing.join(", "))]
    MissingTags { missing: Vec<String> },
}

/// Any failure raised while a record moves through its steps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record {record_id} cannot enter the pipeline while {status}")]
    InvalidState { record_id: String, status: String },

    #[error("Step '{step}' failed: {message}")]
    Runtime { step: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown processing step: {0}")]
    UnknownStep(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

use crate::error::RecordError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Open-schema metadata carried by every record
pub type Metadata = Map<String, Value>;

/// Processing status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }

    /// Whether a record may move from this status to `next`.
    ///
    /// Status only ever moves forward: a pending record starts processing (or
    /// is rejected outright), and a processing record ends either completed
    /// or failed. Completed and failed are terminal.
    pub fn can_transition_to(&self, next: RecordStatus) -> bool {
        matches!(
            (self, next),
            (RecordStatus::Pending, RecordStatus::Processing)
                | (RecordStatus::Pending, RecordStatus::Failed)
                | (RecordStatus::Processing, RecordStatus::Completed)
                | (RecordStatus::Processing, RecordStatus::Failed)
        )
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "processing" => Ok(RecordStatus::Processing),
            "completed" => Ok(RecordStatus::Completed),
            "failed" => Ok(RecordStatus::Failed),
            other => Err(format!("unknown record status '{}'", other)),
        }
    }
}

/// The unit of work flowing through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub metadata: Metadata,
    pub tags: Vec<String>,
    status: RecordStatus,
}

impl Record {
    /// Create a pending record stamped with the current time.
    ///
    /// Fails when `value` is NaN, infinite or negative.
    pub fn new(id: impl Into<String>, value: f64) -> Result<Self, RecordError> {
        if !value.is_finite() {
            return Err(RecordError::NonFiniteValue(value));
        }
        if value < 0.0 {
            return Err(RecordError::NegativeValue(value));
        }

        Ok(Self {
            id: id.into(),
            timestamp: Utc::now(),
            value,
            metadata: Metadata::new(),
            tags: Vec::new(),
            status: RecordStatus::Pending,
        })
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Move to `next` if the transition is legal; returns whether it happened.
    pub(crate) fn advance_status(&mut self, next: RecordStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Age of the record in hours, computed against the current clock
    pub fn age_hours(&self) -> f64 {
        let age = Utc::now() - self.timestamp;
        age.num_milliseconds() as f64 / 3_600_000.0
    }

    pub fn to_view(&self) -> RecordView {
        RecordView {
            id: self.id.clone(),
            timestamp: self.timestamp.to_rfc3339(),
            value: self.value,
            metadata: self.metadata.clone(),
            status: self.status,
            tags: self.tags.clone(),
            age_hours: self.age_hours(),
        }
    }
}

/// Serialized shape of a record inside an export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordView {
    pub id: String,
    pub timestamp: String,
    pub value: f64,
    pub metadata: Metadata,
    pub status: RecordStatus,
    pub tags: Vec<String>,
    pub age_hours: f64,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        record.to_view()
    }
}

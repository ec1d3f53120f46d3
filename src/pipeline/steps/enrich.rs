use crate::constants::{PIPELINE_VERSION, QUALITY_SCORE_CAP, QUALITY_SCORE_FACTOR};
use crate::types::Record;
use chrono::Utc;
use serde_json::{json, Value};

/// Stamp processing time, pipeline version and a capped quality score.
pub fn enrich(record: &mut Record) {
    let metadata = &mut record.metadata;
    metadata.insert(
        "processing_time".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    metadata.insert(
        "pipeline_version".to_string(),
        Value::String(PIPELINE_VERSION.to_string()),
    );
    metadata.insert("quality_score".to_string(), json!(quality_score(record.value)));
}

pub fn quality_score(value: f64) -> f64 {
    (value * QUALITY_SCORE_FACTOR).min(QUALITY_SCORE_CAP)
}

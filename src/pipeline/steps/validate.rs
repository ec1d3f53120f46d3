use crate::config::ValidationRules;
use crate::error::ValidationError;
use crate::types::Record;

/// Check the record against the value range and required tags.
///
/// Pure: the record is never modified.
pub fn validate(record: &Record, rules: &ValidationRules) -> Result<(), ValidationError> {
    if !(rules.min_value <= record.value && record.value <= rules.max_value) {
        return Err(ValidationError::OutOfRange {
            value: record.value,
            min: rules.min_value,
            max: rules.max_value,
        });
    }

    let missing: Vec<String> = rules
        .required_tags
        .iter()
        .filter(|tag| !record.has_tag(tag))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingTags { missing });
    }

    Ok(())
}

use crate::constants::NORMALIZE_THRESHOLD;
use crate::types::Record;
use serde_json::Value;

/// Compress values above the threshold and mark the record normalized.
///
/// (100, 1000] maps linearly onto (100, 200]; the result is rounded to two
/// decimal places. Values at or below the threshold are left alone.
pub fn normalize(record: &mut Record) {
    record.value = normalized_value(record.value);
    record.metadata.insert("normalized".to_string(), Value::Bool(true));
}

pub fn normalized_value(value: f64) -> f64 {
    if value > NORMALIZE_THRESHOLD {
        round2(NORMALIZE_THRESHOLD * (1.0 + (value - NORMALIZE_THRESHOLD) / 900.0))
    } else {
        value
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values_untouched() {
        for value in [0.0, 12.345, 99.999, 100.0] {
            assert_eq!(normalized_value(value), value);
        }
    }

    #[test]
    fn test_large_values_compressed() {
        assert_eq!(normalized_value(1000.0), 200.0);
        assert_eq!(normalized_value(550.0), 150.0);
        assert_eq!(normalized_value(109.0), 101.0);
        // 100 * (1 + 23 / 900) = 102.5555...
        assert_eq!(normalized_value(123.0), 102.56);
    }

    #[test]
    fn test_sets_normalized_flag() {
        let mut record = Record::new("r1", 250.0).unwrap();
        normalize(&mut record);
        assert_eq!(record.value, 116.67);
        assert_eq!(record.metadata.get("normalized"), Some(&Value::Bool(true)));

        let mut small = Record::new("r2", 50.0).unwrap();
        normalize(&mut small);
        assert_eq!(small.value, 50.0);
        assert_eq!(small.metadata.get("normalized"), Some(&Value::Bool(true)));
    }
}

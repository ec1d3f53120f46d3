use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::RecordError;
use crate::types::Record;

/// Produces demo sensor records
pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Generate `count` records, one hour apart going back from now.
    ///
    /// Values fall in [10, 210), so roughly half the records exercise the
    /// normalize compression.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Record>, RecordError> {
        let now = Utc::now();
        (0..count)
            .map(|i| {
                let value = self.rng.gen_range(10.0..210.0_f64).floor();
                Ok(Record::new(format!("record_{:04}", i), value)?
                    .with_timestamp(now - Duration::hours(i as i64))
                    .with_tags(["source", "type", "source:api", "type:sensor"])
                    .with_metadata_entry("source_id", format!("sensor_{}", i % 10)))
            })
            .collect()
    }
}

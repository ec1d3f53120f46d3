/// Step name constants shared by the registry, the config defaults and the CLI

pub const VALIDATE_STEP: &str = "validate";
pub const NORMALIZE_STEP: &str = "normalize";
pub const CATEGORIZE_STEP: &str = "categorize";
pub const ENRICH_STEP: &str = "enrich";

/// Version stamped into every enriched record
pub const PIPELINE_VERSION: &str = "2.1.0";

/// Values above this threshold are compressed by the normalize step
pub const NORMALIZE_THRESHOLD: f64 = 100.0;

// Category boundaries (lower bound inclusive for medium and high)
pub const MEDIUM_CATEGORY_FLOOR: f64 = 30.0;
pub const HIGH_CATEGORY_FLOOR: f64 = 70.0;

pub const QUALITY_SCORE_FACTOR: f64 = 1.2;
pub const QUALITY_SCORE_CAP: f64 = 100.0;

// Environment variables read by the binary
pub const CONFIG_PATH_ENV: &str = "PIPELINE_CONFIG";
pub const LOG_DIR_ENV: &str = "PIPELINE_LOG_DIR";

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_OUTPUT_PATH: &str = "processed_data.json";

/// Get all supported step names in their default order
pub fn get_supported_steps() -> Vec<&'static str> {
    vec![VALIDATE_STEP, NORMALIZE_STEP, CATEGORIZE_STEP, ENRICH_STEP]
}

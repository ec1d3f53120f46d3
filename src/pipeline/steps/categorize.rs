use crate::constants::{HIGH_CATEGORY_FLOOR, MEDIUM_CATEGORY_FLOOR};
use crate::types::Record;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Low,
    Medium,
    High,
}

impl Category {
    pub fn for_value(value: f64) -> Self {
        if value < MEDIUM_CATEGORY_FLOOR {
            Category::Low
        } else if value < HIGH_CATEGORY_FLOOR {
            Category::Medium
        } else {
            Category::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Low => "low",
            Category::Medium => "medium",
            Category::High => "high",
        }
    }

    pub fn tag(&self) -> String {
        format!("category:{}", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record the value's category in metadata and append a `category:<name>` tag.
pub fn categorize(record: &mut Record) -> Category {
    let category = Category::for_value(record.value);
    record
        .metadata
        .insert("category".to_string(), Value::String(category.as_str().to_string()));
    record.tags.push(category.tag());
    category
}

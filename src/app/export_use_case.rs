use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::app::ports::ExportPort;
use crate::error::ExportError;
use crate::pipeline::stats::Statistics;
use crate::types::{Record, RecordView};

/// Supported export formats. Only JSON exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Header of an export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub export_time: DateTime<Utc>,
    pub record_count: usize,
    pub statistics: Statistics,
}

/// Final records plus the statistics they were produced under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub records: Vec<RecordView>,
}

impl ExportDocument {
    pub fn new(records: &[Record], statistics: Statistics) -> Self {
        Self {
            metadata: ExportMetadata {
                export_time: Utc::now(),
                record_count: records.len(),
                statistics,
            },
            records: records.iter().map(RecordView::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub format: ExportFormat,
    pub destination: String,
    pub record_count: usize,
}

/// Use case for exporting processed records
pub struct ExportUseCase {
    output: Box<dyn ExportPort>,
}

impl ExportUseCase {
    pub fn new(output: Box<dyn ExportPort>) -> Self {
        Self { output }
    }

    pub async fn export(&self, records: &[Record], statistics: Statistics) -> Result<ExportSummary, ExportError> {
        let document = ExportDocument::new(records, statistics);
        self.output.write_document(&document).await?;

        let format = self.output.format();
        let destination = self.output.destination();
        crate::observability::metrics::export::written(format.as_str(), records.len());
        info!("Exported {} records to {}", records.len(), destination);

        Ok(ExportSummary {
            format,
            destination,
            record_count: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stats::StatsAggregator;
    use crate::types::RecordStatus;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct MockExportOutput {
        pub documents: Arc<tokio::sync::Mutex<Vec<ExportDocument>>>,
    }

    impl MockExportOutput {
        pub fn new() -> Self {
            Self {
                documents: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ExportPort for MockExportOutput {
        fn format(&self) -> ExportFormat {
            ExportFormat::Json
        }

        fn destination(&self) -> String {
            "memory".to_string()
        }

        async fn write_document(&self, document: &ExportDocument) -> Result<(), ExportError> {
            self.documents.lock().await.push(document.clone());
            Ok(())
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "csv".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "csv"
        ));
    }

    #[tokio::test]
    async fn test_export_use_case() {
        let output = Box::new(MockExportOutput::new());
        let documents = output.documents.clone();
        let use_case = ExportUseCase::new(output);

        let records = vec![
            Record::new("a", 1.0).unwrap(),
            Record::new("b", 2.0).unwrap(),
        ];
        let stats = StatsAggregator::new();
        stats.record_processed();
        stats.record_processed();

        let summary = use_case.export(&records, stats.snapshot()).await.unwrap();
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.destination, "memory");

        let written = documents.lock().await;
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].metadata.record_count, 2);
        assert_eq!(written[0].metadata.statistics.processed_count, 2);
        assert_eq!(written[0].records[1].id, "b");
        assert_eq!(written[0].records[0].status, RecordStatus::Pending);
    }
}

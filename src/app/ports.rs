use crate::app::export_use_case::{ExportDocument, ExportFormat};
use crate::error::ExportError;
use async_trait::async_trait;

/// Destination for an export document
#[async_trait]
pub trait ExportPort: Send + Sync {
    /// The format this destination writes
    fn format(&self) -> ExportFormat;

    /// Where the document ends up, for logging
    fn destination(&self) -> String;

    async fn write_document(&self, document: &ExportDocument) -> Result<(), ExportError>;
}

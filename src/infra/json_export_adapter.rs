use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::app::export_use_case::{ExportDocument, ExportFormat};
use crate::app::ports::ExportPort;
use crate::error::ExportError;

/// Writes the export document as pretty-printed JSON to a file
pub struct JsonFileExportAdapter {
    path: PathBuf,
}

impl JsonFileExportAdapter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ExportPort for JsonFileExportAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }

    async fn write_document(&self, document: &ExportDocument) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

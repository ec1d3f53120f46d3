pub mod json_export_adapter;

pub use json_export_adapter::JsonFileExportAdapter;

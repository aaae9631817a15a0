// src/export/mod.rs
pub mod exporter;

pub use exporter::{render_csv, ExportFiles, JsonArtifact, ResultExporter};

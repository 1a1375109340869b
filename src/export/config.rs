//! Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::FormattingMode;

/// Configuration for DOCX export.
///
/// Every field has a default, so a partial JSON file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// How bold/italic/underline markers are applied.
    pub formatting: FormattingMode,
    /// Deepest content node rendered; deeper subtrees are skipped.
    pub max_depth: usize,
    /// Label strings printed on the title page.
    pub labels: TitleLabels,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            formatting: FormattingMode::Fragment,
            max_depth: 16,
            labels: TitleLabels::default(),
        }
    }
}

impl ExportConfig {
    /// Load a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) fn compression(&self) -> i64 {
        i64::from(self.compression_level.unwrap_or(6).min(9))
    }
}

/// Title page labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleLabels {
    pub intervention_type: String,
    pub loe: String,
    pub applicable: String,
    pub not_applicable: String,
    pub address: String,
    pub generated_at: String,
    /// chrono format string for the generation timestamp.
    pub date_format: String,
}

impl Default for TitleLabels {
    fn default() -> Self {
        Self {
            intervention_type: "Tipo de intervención".to_string(),
            loe: "Aplicación LOE".to_string(),
            applicable: "Aplicable".to_string(),
            not_applicable: "No aplicable".to_string(),
            address: "Emplazamiento".to_string(),
            generated_at: "Documento generado el".to_string(),
            date_format: "%d/%m/%Y %H:%M".to_string(),
        }
    }
}

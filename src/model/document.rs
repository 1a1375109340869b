//! The assembled, format-independent document.

use chrono::{DateTime, Utc};

use super::block::Block;
use crate::links::HyperlinkRegistry;
use crate::style::StyleCatalog;

/// Metadata printed on the title page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePage {
    pub project_title: String,
    pub intervention_type: String,
    pub loe_applicable: bool,
    pub address: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl TitlePage {
    pub fn new(project_title: impl Into<String>) -> Self {
        Self {
            project_title: project_title.into(),
            intervention_type: String::new(),
            loe_applicable: false,
            address: None,
            generated_at: Utc::now(),
        }
    }

    pub fn with_intervention_type(mut self, intervention_type: impl Into<String>) -> Self {
        self.intervention_type = intervention_type.into();
        self
    }

    pub fn with_loe_applicable(mut self, applicable: bool) -> Self {
        self.loe_applicable = applicable;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.address = (!address.trim().is_empty()).then_some(address);
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Output of the assembler: rebuilt on every export and never cached.
///
/// The writer emits `title_page`, a hard page break, then `body`.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub title_page: Vec<Block>,
    pub body: Vec<Block>,
    pub styles: StyleCatalog,
    pub hyperlinks: HyperlinkRegistry,
}

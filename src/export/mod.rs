//! DOCX export.
//!
//! [`DocxExporter`] drives one export call end to end:
//!
//! 1. open the target package (fresh, or a template when one is given)
//! 2. assemble the content tree into a [`DocumentModel`], allocating
//!    hyperlink ids around the ids the package already uses
//! 3. append the model to the package, request a field update on open and
//!    seal it into ZIP bytes
//!
//! Template problems never fail an export: the exporter logs them and
//! falls back to a fresh package. Serialization errors are returned and are
//! retryable (see [`Error::is_retryable`]).
//!
//! # Example
//!
//! ```no_run
//! use memoria::export::DocxExporter;
//! use memoria::{ContentTree, TitlePage};
//!
//! let tree = ContentTree::from_json(&std::fs::read("memoria.json")?)?;
//! let title = TitlePage::new("Vivienda unifamiliar aislada").with_loe_applicable(true);
//! let output = DocxExporter::new().export(&tree, &title)?;
//! std::fs::write(&output.file_name, &output.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use log::{debug, warn};

use crate::assemble::DocumentAssembler;
use crate::cache::{TemplateCache, TemplateKey, TemplateSource};
use crate::error::{Error, Result};
use crate::links::HyperlinkRegistry;
use crate::model::{ContentTree, DocumentModel, TitlePage};
use crate::package::Package;
use crate::style::StyleCatalog;
use crate::util::sanitize_file_name;

mod config;

pub use crate::render::FormattingMode;
pub use config::{ExportConfig, TitleLabels};

/// MIME type of the produced documents.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    /// Suggested download name, derived from the project title.
    pub file_name: String,
    pub content_type: &'static str,
    /// False when no template was given or the template was unusable.
    pub used_template: bool,
}

/// Exports content trees as `.docx` documents.
#[derive(Debug, Clone, Default)]
pub struct DocxExporter {
    config: ExportConfig,
}

impl DocxExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build a document from scratch.
    pub fn export(&self, tree: &ContentTree, title: &TitlePage) -> Result<ExportOutput> {
        let mut package = Package::fresh(&StyleCatalog::standard());
        self.populate(&mut package, tree, title)?;
        package.force_field_update()?;
        self.finish(&package, title, false)
    }

    /// Build a document into `template` (normally `.dotx` bytes). An
    /// unusable template is logged and the document is built from scratch.
    pub fn export_with_template(
        &self,
        tree: &ContentTree,
        title: &TitlePage,
        template: &[u8],
    ) -> Result<ExportOutput> {
        match self.merge(tree, title, template) {
            Ok(package) => self.finish(&package, title, true),
            Err(e) => {
                warn!("Template unusable, exporting without it: {e}");
                self.export(tree, title)
            }
        }
    }

    /// Like [`export_with_template`](Self::export_with_template), reading
    /// the template through `cache`. A failed fetch also falls back to a
    /// fresh document.
    pub fn export_with_cached_template(
        &self,
        tree: &ContentTree,
        title: &TitlePage,
        cache: &TemplateCache,
        source: &dyn TemplateSource,
        key: &TemplateKey,
    ) -> Result<ExportOutput> {
        match cache.get_or_fetch(key, source) {
            Ok(template) => self.export_with_template(tree, title, &template),
            Err(e) => {
                warn!("Could not fetch template {key:?}, exporting without it: {e}");
                self.export(tree, title)
            }
        }
    }

    /// Assemble the document model for `package` without writing it.
    pub fn assemble(
        &self,
        package: &Package,
        tree: &ContentTree,
        title: &TitlePage,
    ) -> DocumentModel {
        let registry = HyperlinkRegistry::reserving(package.relationship_ids());
        DocumentAssembler::new(&self.config).assemble_with(&tree.chapters, title, registry)
    }

    fn merge(&self, tree: &ContentTree, title: &TitlePage, template: &[u8]) -> Result<Package> {
        let mut package = Package::from_template(template)?;
        self.populate(&mut package, tree, title)?;
        package.force_field_update()?;
        Ok(package)
    }

    fn populate(
        &self,
        package: &mut Package,
        tree: &ContentTree,
        title: &TitlePage,
    ) -> Result<()> {
        let model = self.assemble(package, tree, title);
        debug!(
            "Assembled {} nodes into {} blocks with {} hyperlinks",
            tree.node_count(),
            model.body.len(),
            model.hyperlinks.len()
        );
        package.append_document(&model)
    }

    fn finish(
        &self,
        package: &Package,
        title: &TitlePage,
        used_template: bool,
    ) -> Result<ExportOutput> {
        let bytes = package.seal(self.config.compression())?;
        if bytes.is_empty() {
            return Err(Error::EmptyOutput);
        }
        Ok(ExportOutput {
            bytes,
            file_name: sanitize_file_name(&title.project_title),
            content_type: DOCX_CONTENT_TYPE,
            used_template,
        })
    }
}

//! # memoria
//!
//! Export engine that turns a tree of chapters and sections holding
//! sanitized HTML into Word (`.docx`) documents.
//!
//! ## Features
//!
//! - Headings from the chapter/section hierarchy, with embedded `h1..h6`
//!   re-based under the node they appear in
//! - Bold, italic and underline runs, lists, tables with repeating header
//!   rows, external hyperlinks
//! - LaTeX-style math (`$...$` inline, `$$...$$` display) written as native
//!   Office Math
//! - Export into a user-supplied `.dotx` template, falling back to a fresh
//!   document when the template is unusable
//!
//! ## Quick Start
//!
//! ```no_run
//! use memoria::{ContentTree, DocxExporter, TitlePage};
//!
//! let tree = ContentTree::from_json(br#"{"chapters": [
//!     {"id": "1", "title": "Memoria descriptiva",
//!      "content": "<p>Carga de nieve $q_n = \\mu \\cdot s_k$</p>"}
//! ]}"#)?;
//! let title = TitlePage::new("Vivienda unifamiliar")
//!     .with_intervention_type("Obra nueva")
//!     .with_loe_applicable(true);
//!
//! let output = DocxExporter::new().export(&tree, &title)?;
//! std::fs::write(&output.file_name, &output.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pipeline
//!
//! [`ContentTree`] → [`render::BlockRenderer`] (HTML to blocks, math via
//! [`math`]) → [`assemble::DocumentAssembler`] → [`DocumentModel`] →
//! [`package::Package`] → ZIP bytes.

pub mod assemble;
pub mod cache;
pub mod dom;
pub mod error;
pub mod export;
pub mod links;
pub mod math;
pub mod model;
pub mod package;
pub mod render;
pub mod style;
pub(crate) mod util;

pub use assemble::DocumentAssembler;
pub use cache::{TemplateCache, TemplateKey, TemplateSource};
pub use error::{Error, Result};
pub use export::{DocxExporter, ExportConfig, ExportOutput, FormattingMode, TitleLabels};
pub use links::HyperlinkRegistry;
pub use model::{Block, ContentNode, ContentTree, DocumentModel, MathNode, TitlePage};
pub use style::StyleCatalog;
pub use util::sanitize_file_name;

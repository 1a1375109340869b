//! Core data model for document export.
//!
//! This module contains:
//! - The authored content tree (chapters and sections)
//! - Inline runs, hyperlinks and blocks produced from HTML
//! - Parsed math expressions
//! - The assembled document and its title page

mod block;
mod content;
mod document;
mod math;

pub use block::{
    Alignment, Block, Cell, FormattedRun, Hyperlink, Inline, ListMarker, RunFormat, Table,
    inline_text,
};
pub use content::{ContentNode, ContentTree};
pub use document::{DocumentModel, TitlePage};
pub use math::{MathExpression, MathNode, linear_text};

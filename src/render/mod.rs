//! HTML content to blocks.
//!
//! [`BlockRenderer`] splits a node's HTML on block boundaries and hands each
//! inline stretch to [`InlineRunFormatter`], which produces formatted runs,
//! hyperlinks and formulas. Nothing here fails: malformed markup is repaired
//! by the HTML parser and malformed math degrades to literal text.

mod block;
mod inline;
mod table;

pub use block::BlockRenderer;
pub use inline::InlineRunFormatter;

use serde::{Deserialize, Serialize};

use crate::model::{FormattedRun, Inline};

/// How bold/italic/underline markers apply to text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormattingMode {
    /// A marker anywhere in the fragment formats all of its text.
    #[default]
    Fragment,
    /// Markers format only the text they enclose.
    Span,
}

/// True when the inlines carry no visible content.
pub(crate) fn is_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(|inline| match inline {
        Inline::Run(run) => run.text.trim().is_empty(),
        Inline::Hyperlink(_) | Inline::Math(_) => false,
    })
}

/// Strip leading whitespace from the first text and trailing whitespace from
/// the last, dropping runs that end up empty.
pub(crate) fn trim_inlines(inlines: &mut Vec<Inline>) {
    while let Some(Inline::Run(run)) = inlines.first_mut() {
        let trimmed = run.text.trim_start();
        if trimmed.is_empty() {
            inlines.remove(0);
        } else {
            run.text = trimmed.to_string();
            break;
        }
    }
    while let Some(Inline::Run(run)) = inlines.last_mut() {
        let trimmed = run.text.trim_end();
        if trimmed.is_empty() {
            inlines.pop();
        } else {
            run.text = trimmed.to_string();
            break;
        }
    }
    if let Some(Inline::Hyperlink(link)) = inlines.first_mut() {
        trim_runs_start(&mut link.display_runs);
    }
    if let Some(Inline::Hyperlink(link)) = inlines.last_mut() {
        trim_runs_end(&mut link.display_runs);
    }
}

fn trim_runs_start(runs: &mut [FormattedRun]) {
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
}

fn trim_runs_end(runs: &mut [FormattedRun]) {
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
}

//! Content tree to [`DocumentModel`].
//!
//! The assembler walks the tree depth-first. Each node contributes its title
//! heading (level = nesting depth, capped at 3), then its own content, then
//! its children in authored order.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use log::warn;

use crate::export::{ExportConfig, TitleLabels};
use crate::links::HyperlinkRegistry;
use crate::model::{Block, ContentNode, DocumentModel, FormattedRun, Inline, TitlePage};
use crate::render::BlockRenderer;
use crate::style::StyleCatalog;

/// Deepest heading level in the style scale.
pub const MAX_HEADING_LEVEL: u8 = 3;

pub struct DocumentAssembler<'c> {
    config: &'c ExportConfig,
}

impl<'c> DocumentAssembler<'c> {
    pub fn new(config: &'c ExportConfig) -> Self {
        Self { config }
    }

    /// Assemble with a fresh hyperlink registry.
    pub fn assemble(&self, roots: &[ContentNode], title_page: &TitlePage) -> DocumentModel {
        self.assemble_with(roots, title_page, HyperlinkRegistry::new())
    }

    /// Assemble, allocating hyperlink ids from `registry`. Use a registry
    /// seeded with the target package's relationship ids.
    pub fn assemble_with(
        &self,
        roots: &[ContentNode],
        title_page: &TitlePage,
        mut registry: HyperlinkRegistry,
    ) -> DocumentModel {
        let mut body = Vec::new();
        {
            let mut renderer = BlockRenderer::new(&mut registry, self.config.formatting);
            for root in roots {
                self.walk(&mut renderer, root, 1, &mut body);
            }
        }

        DocumentModel {
            title: title_page.project_title.trim().to_string(),
            generated_at: title_page.generated_at,
            title_page: title_blocks(title_page, &self.config.labels),
            body,
            styles: StyleCatalog::standard(),
            hyperlinks: registry,
        }
    }

    fn walk(
        &self,
        renderer: &mut BlockRenderer<'_>,
        node: &ContentNode,
        depth: usize,
        out: &mut Vec<Block>,
    ) {
        if depth > self.config.max_depth {
            warn!(
                "Content node {:?} is nested deeper than {} levels; skipping it",
                node.id, self.config.max_depth
            );
            return;
        }

        let level = depth.min(usize::from(MAX_HEADING_LEVEL)) as u8;
        let title = node.title.trim();
        let base_level = if title.is_empty() {
            level - 1
        } else {
            out.push(Block::heading(level, title));
            level
        };

        if let Some(html) = node.html() {
            out.extend(renderer.render(html, base_level));
        }

        for child in &node.children {
            self.walk(renderer, child, depth + 1, out);
        }
    }
}

/// Title page lines; the writer styles the first as Title and the rest as
/// Subtitle.
fn title_blocks(title_page: &TitlePage, labels: &TitleLabels) -> Vec<Block> {
    let mut lines = vec![title_page.project_title.trim().to_string()];

    let intervention = format!(
        "{}: {}",
        labels.intervention_type,
        title_page.intervention_type.trim()
    );
    lines.push(intervention.trim_end().to_string());

    let loe = if title_page.loe_applicable {
        &labels.applicable
    } else {
        &labels.not_applicable
    };
    lines.push(format!("{}: {}", labels.loe, loe));

    if let Some(address) = &title_page.address {
        lines.push(format!("{}: {}", labels.address, address.trim()));
    }

    lines.push(format!(
        "{} {}",
        labels.generated_at,
        format_timestamp(&title_page.generated_at, &labels.date_format)
    ));

    lines
        .into_iter()
        .map(|line| Block::paragraph(vec![Inline::Run(FormattedRun::plain(line))]))
        .collect()
}

/// Format with a user-supplied pattern, falling back to the default when
/// the pattern does not parse.
fn format_timestamp(at: &DateTime<Utc>, pattern: &str) -> String {
    let valid = !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
    if valid {
        at.format(pattern).to_string()
    } else {
        at.format(&TitleLabels::default().date_format).to_string()
    }
}

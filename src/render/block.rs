//! Block-level splitting of a node's HTML content.

use super::inline::InlineRunFormatter;
use super::{FormattingMode, is_blank, trim_inlines};
use crate::dom::{DomData, DomNodeId, HtmlDom, parse_fragment};
use crate::links::HyperlinkRegistry;
use crate::model::{Alignment, Block, Inline, ListMarker};

/// Containers whose children are rendered as blocks of their own.
const CONTAINER_TAGS: &[&str] = &[
    "div", "blockquote", "section", "article", "header", "footer", "main", "aside", "figure",
    "nav", "body", "html", "center", "dl", "dd", "dt", "figcaption", "address",
];

/// Elements that end the current paragraph and render their children as
/// one paragraph.
const PARAGRAPH_TAGS: &[&str] = &["p", "pre"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Tags that force block handling when nested inside inline markup.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "table", "ul", "ol", "li", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Deepest list nesting kept; deeper lists render at this level.
const MAX_LIST_LEVEL: u8 = 8;

/// Heading levels for embedded `h1..h6` under one content node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeadingScale {
    /// Output level for each of `h1..h6`.
    levels: [u8; 6],
}

impl HeadingScale {
    /// Rank the distinct heading levels present in the fragment; rank `r`
    /// (1-based) maps to `min(base + r, 3)`.
    fn new(dom: &HtmlDom, root: DomNodeId, base_level: u8) -> Self {
        let mut present = [false; 6];
        mark_headings(dom, root, &mut present);

        let mut levels = [3; 6];
        let mut rank = 0u8;
        for (i, found) in present.iter().enumerate() {
            if *found {
                rank += 1;
                levels[i] = base_level.saturating_add(rank).clamp(1, 3);
            }
        }
        Self { levels }
    }

    fn level(&self, tag: &str) -> u8 {
        HEADING_TAGS
            .iter()
            .position(|t| *t == tag)
            .map(|i| self.levels[i])
            .unwrap_or(3)
    }
}

fn mark_headings(dom: &HtmlDom, id: DomNodeId, present: &mut [bool; 6]) {
    if let Some(tag) = dom.tag(id)
        && let Some(i) = HEADING_TAGS.iter().position(|t| *t == tag)
    {
        present[i] = true;
    }
    for child in dom.children(id) {
        mark_headings(dom, child, present);
    }
}

/// Splits HTML into headings, paragraphs, list items and tables.
pub struct BlockRenderer<'r> {
    pub(super) formatter: InlineRunFormatter<'r>,
}

impl<'r> BlockRenderer<'r> {
    pub fn new(registry: &'r mut HyperlinkRegistry, mode: FormattingMode) -> Self {
        Self {
            formatter: InlineRunFormatter::new(registry, mode),
        }
    }

    /// Render one node's HTML. `base_level` is the level of the node's own
    /// heading; embedded headings are placed below it.
    pub fn render(&mut self, html: &str, base_level: u8) -> Vec<Block> {
        let fragment = parse_fragment(html);
        let scale = HeadingScale::new(&fragment.dom, fragment.root, base_level);
        let mut out = Vec::new();
        self.render_children(&fragment.dom, fragment.root, &scale, &mut out);
        out
    }

    pub(super) fn render_children(
        &mut self,
        dom: &HtmlDom,
        parent: DomNodeId,
        scale: &HeadingScale,
        out: &mut Vec<Block>,
    ) {
        let mut pending = Vec::new();
        for child in dom.children(parent) {
            let Some(tag) = dom.tag(child) else {
                if matches!(dom.get(child).map(|n| &n.data), Some(DomData::Text(_))) {
                    pending.push(child);
                }
                continue;
            };

            if tag == "br" || tag == "hr" {
                self.flush_paragraph(dom, &mut pending, out);
            } else if HEADING_TAGS.contains(&tag) {
                self.flush_paragraph(dom, &mut pending, out);
                self.render_heading(dom, child, scale.level(tag), out);
            } else if PARAGRAPH_TAGS.contains(&tag) {
                self.flush_paragraph(dom, &mut pending, out);
                self.render_children(dom, child, scale, out);
            } else if CONTAINER_TAGS.contains(&tag) || tag == "li" {
                self.flush_paragraph(dom, &mut pending, out);
                self.render_children(dom, child, scale, out);
            } else if tag == "ul" || tag == "ol" {
                self.flush_paragraph(dom, &mut pending, out);
                self.render_list(dom, child, 0, scale, out);
            } else if tag == "table" {
                self.flush_paragraph(dom, &mut pending, out);
                self.render_table(dom, child, scale, out);
            } else if dom.contains_tag(child, BLOCK_TAGS) {
                // Inline element wrapping blocks, e.g. `<b>` around a table.
                self.flush_paragraph(dom, &mut pending, out);
                self.render_children(dom, child, scale, out);
            } else {
                pending.push(child);
            }
        }
        self.flush_paragraph(dom, &mut pending, out);
    }

    fn render_heading(&mut self, dom: &HtmlDom, heading: DomNodeId, level: u8, out: &mut Vec<Block>) {
        let nodes: Vec<_> = dom.children(heading).collect();
        let runs = self.formatter.format(dom, &nodes);
        if !is_blank(&runs) {
            out.push(Block::Heading { level, runs });
        }
    }

    /// Emit the pending inline nodes as paragraphs, one per line. Display
    /// formulas split the paragraph and stand alone, centered.
    fn flush_paragraph(&mut self, dom: &HtmlDom, pending: &mut Vec<DomNodeId>, out: &mut Vec<Block>) {
        if pending.is_empty() {
            return;
        }
        let lines = self.formatter.format_lines(dom, pending);
        pending.clear();

        for line in lines {
            for segment in split_display_math(line) {
                match segment {
                    Segment::Runs(runs) => push_paragraph(out, runs, Alignment::Start),
                    Segment::Display(math) => push_paragraph(out, math, Alignment::Center),
                }
            }
        }
    }

    fn render_list(
        &mut self,
        dom: &HtmlDom,
        list: DomNodeId,
        level: u8,
        scale: &HeadingScale,
        out: &mut Vec<Block>,
    ) {
        let ordered = dom.tag(list) == Some("ol");
        let mut number = dom
            .attr(list, "start")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);

        for child in dom.children(list) {
            match dom.tag(child) {
                Some("li") => {
                    let marker = if ordered {
                        let marker = ListMarker::Ordered(number);
                        number = number.saturating_add(1);
                        marker
                    } else {
                        ListMarker::Bullet
                    };
                    let mut item = ListItemState {
                        marker: Some(marker),
                        level,
                        pending: Vec::new(),
                    };
                    self.render_list_content(dom, child, &mut item, scale, out);
                    self.flush_list_item(dom, &mut item, out);
                }
                Some("ul" | "ol") => {
                    self.render_list(dom, child, (level + 1).min(MAX_LIST_LEVEL), scale, out);
                }
                Some("table") => self.render_table(dom, child, scale, out),
                Some(_) => self.flush_paragraph(dom, &mut vec![child], out),
                // Stray text directly inside the list.
                None if matches!(dom.get(child).map(|n| &n.data), Some(DomData::Text(_))) => {
                    self.flush_paragraph(dom, &mut vec![child], out)
                }
                None => {}
            }
        }
    }

    fn render_list_content(
        &mut self,
        dom: &HtmlDom,
        container: DomNodeId,
        item: &mut ListItemState,
        scale: &HeadingScale,
        out: &mut Vec<Block>,
    ) {
        for child in dom.children(container) {
            match dom.tag(child) {
                Some("ul" | "ol") => {
                    self.flush_list_item(dom, item, out);
                    let level = (item.level + 1).min(MAX_LIST_LEVEL);
                    self.render_list(dom, child, level, scale, out);
                }
                Some("br") => self.flush_list_item(dom, item, out),
                Some("table") => {
                    self.flush_list_item(dom, item, out);
                    self.render_table(dom, child, scale, out);
                }
                Some(tag) if PARAGRAPH_TAGS.contains(&tag) || CONTAINER_TAGS.contains(&tag) => {
                    self.flush_list_item(dom, item, out);
                    self.render_list_content(dom, child, item, scale, out);
                    self.flush_list_item(dom, item, out);
                }
                _ => item.pending.push(child),
            }
        }
    }

    /// Emit the pending nodes of a list item. The first paragraph takes the
    /// marker; later lines continue the item, and display formulas stand
    /// alone as centered paragraphs.
    fn flush_list_item(&mut self, dom: &HtmlDom, item: &mut ListItemState, out: &mut Vec<Block>) {
        if item.pending.is_empty() {
            return;
        }
        let lines = self.formatter.format_lines(dom, &item.pending);
        item.pending.clear();

        for line in lines {
            for segment in split_display_math(line) {
                match segment {
                    Segment::Runs(mut runs) => {
                        trim_inlines(&mut runs);
                        if is_blank(&runs) {
                            continue;
                        }
                        out.push(Block::ListItem {
                            runs,
                            marker: item.marker.take(),
                            level: item.level,
                        });
                    }
                    Segment::Display(math) => push_paragraph(out, math, Alignment::Center),
                }
            }
        }
    }
}

struct ListItemState {
    /// Taken by the first paragraph of the item.
    marker: Option<ListMarker>,
    level: u8,
    pending: Vec<DomNodeId>,
}

enum Segment {
    Runs(Vec<Inline>),
    Display(Vec<Inline>),
}

/// Split a line around its display formulas.
fn split_display_math(line: Vec<Inline>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for inline in line {
        match inline {
            Inline::Math(math) if math.display => {
                segments.push(Segment::Runs(std::mem::take(&mut current)));
                segments.push(Segment::Display(vec![Inline::Math(math)]));
            }
            other => current.push(other),
        }
    }
    segments.push(Segment::Runs(current));
    segments
}

fn push_paragraph(out: &mut Vec<Block>, mut runs: Vec<Inline>, alignment: Alignment) {
    trim_inlines(&mut runs);
    if !is_blank(&runs) {
        out.push(Block::Paragraph { runs, alignment });
    }
}

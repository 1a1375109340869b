//! Inline HTML to formatted runs, hyperlinks and formulas.

use super::{FormattingMode, trim_inlines};
use crate::dom::{DomData, DomNodeId, HtmlDom, parse_fragment};
use crate::links::HyperlinkRegistry;
use crate::math::{MathSegment, split_math};
use crate::model::{FormattedRun, Hyperlink, Inline, RunFormat};
use crate::util::collapse_whitespace;

const BOLD_TAGS: &[&str] = &["b", "strong"];
const ITALIC_TAGS: &[&str] = &["i", "em"];
const UNDERLINE_TAGS: &[&str] = &["u", "ins"];

/// Elements whose text never reaches the document.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title", "template"];

/// Intermediate result of the walk, before merging and math splitting.
enum Piece {
    Text(String, RunFormat),
    Link(Hyperlink),
    /// A `br`, wherever it sits in the inline markup.
    Break,
}

/// Turns the inline content of one block into runs.
///
/// Every anchor with a non-empty `href` allocates one relationship id from
/// the registry, so the formatter must use the registry of the package the
/// runs will be written into.
pub struct InlineRunFormatter<'r> {
    registry: &'r mut HyperlinkRegistry,
    mode: FormattingMode,
}

impl<'r> InlineRunFormatter<'r> {
    pub fn new(registry: &'r mut HyperlinkRegistry, mode: FormattingMode) -> Self {
        Self { registry, mode }
    }

    /// Format a standalone HTML fragment.
    pub fn format_html(&mut self, html: &str) -> Vec<Inline> {
        let fragment = parse_fragment(html);
        let nodes: Vec<_> = fragment.dom.children(fragment.root).collect();
        self.format(&fragment.dom, &nodes)
    }

    /// Format a sequence of sibling nodes as one inline stretch. Line
    /// breaks become spaces.
    ///
    /// Whitespace is collapsed and trimmed at both ends; adjacent runs with
    /// the same formatting are merged before formulas are split out.
    pub fn format(&mut self, dom: &HtmlDom, nodes: &[DomNodeId]) -> Vec<Inline> {
        let base = self.base_format(dom, nodes);
        let mut pieces = Vec::new();
        for &node in nodes {
            self.walk(dom, node, base, &mut pieces);
        }
        let pieces = pieces
            .into_iter()
            .map(|piece| match piece {
                Piece::Break => Piece::Text(" ".to_string(), base),
                other => other,
            })
            .collect();
        finish_line(pieces)
    }

    /// Like [`format`](Self::format), but split at every `br`, including
    /// breaks nested inside inline markup. Each line is formatted and
    /// trimmed on its own; blank lines are kept as empty vectors.
    pub fn format_lines(&mut self, dom: &HtmlDom, nodes: &[DomNodeId]) -> Vec<Vec<Inline>> {
        let base = self.base_format(dom, nodes);
        let mut pieces = Vec::new();
        for &node in nodes {
            self.walk(dom, node, base, &mut pieces);
        }

        let mut lines = Vec::new();
        let mut line = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Break => lines.push(finish_line(std::mem::take(&mut line))),
                other => line.push(other),
            }
        }
        lines.push(finish_line(line));
        lines
    }

    fn base_format(&self, dom: &HtmlDom, nodes: &[DomNodeId]) -> RunFormat {
        match self.mode {
            FormattingMode::Fragment => fragment_format(dom, nodes),
            FormattingMode::Span => RunFormat::PLAIN,
        }
    }

    fn walk(&mut self, dom: &HtmlDom, id: DomNodeId, format: RunFormat, out: &mut Vec<Piece>) {
        let Some(node) = dom.get(id) else {
            return;
        };
        match &node.data {
            DomData::Text(text) => out.push(Piece::Text(collapse_whitespace(text), format)),
            DomData::Ignored => {}
            DomData::Document => {
                for child in dom.children(id) {
                    self.walk(dom, child, format, out);
                }
            }
            DomData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if SKIPPED_TAGS.contains(&tag) {
                    return;
                }
                if tag == "br" {
                    out.push(Piece::Break);
                    return;
                }
                let format = match self.mode {
                    FormattingMode::Fragment => format,
                    FormattingMode::Span => format.union(tag_format(tag)),
                };
                if tag == "a"
                    && let Some(href) = dom.attr(id, "href").filter(|h| !h.trim().is_empty())
                {
                    let link = self.hyperlink(dom, id, href, format);
                    out.push(Piece::Link(link));
                    return;
                }
                for child in dom.children(id) {
                    self.walk(dom, child, format, out);
                }
            }
        }
    }

    fn hyperlink(
        &mut self,
        dom: &HtmlDom,
        anchor: DomNodeId,
        href: &str,
        format: RunFormat,
    ) -> Hyperlink {
        let mut pieces = Vec::new();
        for child in dom.children(anchor) {
            self.walk(dom, child, format, &mut pieces);
        }

        let mut display_runs = Vec::new();
        for piece in merge_pieces(pieces) {
            match piece {
                Piece::Text(text, format) => display_runs.push(FormattedRun::new(text, format)),
                Piece::Link(inner) => display_runs.extend(inner.display_runs),
                Piece::Break => display_runs.push(FormattedRun::new(" ", format)),
            }
        }
        if display_runs.iter().all(|r| r.text.trim().is_empty()) {
            display_runs = vec![FormattedRun::new(href.trim(), format)];
        }

        let relationship_id = self.registry.allocate(href);
        Hyperlink {
            display_runs,
            target_uri: href.trim().to_string(),
            relationship_id,
        }
    }
}

/// Merge, split out formulas and trim one line of pieces.
fn finish_line(pieces: Vec<Piece>) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for piece in merge_pieces(pieces) {
        match piece {
            Piece::Text(text, format) => push_with_math(&mut inlines, &text, format),
            Piece::Link(link) => inlines.push(Inline::Hyperlink(link)),
            Piece::Break => {}
        }
    }
    trim_inlines(&mut inlines);
    inlines
}

/// Formatting implied by the marker tags present anywhere among `nodes`.
fn fragment_format(dom: &HtmlDom, nodes: &[DomNodeId]) -> RunFormat {
    let any = |tags: &[&str]| nodes.iter().any(|&n| dom.contains_tag(n, tags));
    RunFormat {
        bold: any(BOLD_TAGS),
        italic: any(ITALIC_TAGS),
        underline: any(UNDERLINE_TAGS),
    }
}

fn tag_format(tag: &str) -> RunFormat {
    RunFormat {
        bold: BOLD_TAGS.contains(&tag),
        italic: ITALIC_TAGS.contains(&tag),
        underline: UNDERLINE_TAGS.contains(&tag),
    }
}

/// Merge adjacent text pieces that share a format.
fn merge_pieces(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let Piece::Text(text, format) = &piece
            && let Some(Piece::Text(prev, prev_format)) = merged.last_mut()
            && prev_format == format
        {
            prev.push_str(text);
            continue;
        }
        merged.push(piece);
    }
    for piece in &mut merged {
        if let Piece::Text(text, _) = piece {
            *text = collapse_whitespace(text);
        }
    }
    merged
}

fn push_with_math(inlines: &mut Vec<Inline>, text: &str, format: RunFormat) {
    for segment in split_math(text) {
        match segment {
            MathSegment::Text(text) => inlines.push(Inline::Run(FormattedRun::new(text, format))),
            MathSegment::Math(math) => inlines.push(Inline::Math(math)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MathNode, inline_text};

    fn format(html: &str, mode: FormattingMode) -> (Vec<Inline>, HyperlinkRegistry) {
        let mut registry = HyperlinkRegistry::new();
        let inlines = InlineRunFormatter::new(&mut registry, mode).format_html(html);
        (inlines, registry)
    }

    fn runs(inlines: &[Inline]) -> Vec<&FormattedRun> {
        inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Run(run) => Some(run),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fragment_formatting_applies_to_all_text() {
        let (inlines, _) = format("Texto <b>importante</b> aquí", FormattingMode::Fragment);
        let runs = runs(&inlines);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Texto importante aquí");
        assert!(runs[0].bold());
        assert!(!runs[0].italic());
    }

    #[test]
    fn test_nested_breaks_split_lines() {
        let fragment = parse_fragment("<strong>Línea 1<br>Línea 2</strong>");
        let nodes: Vec<_> = fragment.dom.children(fragment.root).collect();
        let mut registry = HyperlinkRegistry::new();
        let mut formatter = InlineRunFormatter::new(&mut registry, FormattingMode::Fragment);

        let lines = formatter.format_lines(&fragment.dom, &nodes);
        let texts: Vec<_> = lines.iter().map(|line| inline_text(line)).collect();
        assert_eq!(texts, vec!["Línea 1", "Línea 2"]);
        assert!(runs(&lines[1])[0].bold());

        let joined = formatter.format(&fragment.dom, &nodes);
        assert_eq!(inline_text(&joined), "Línea 1 Línea 2");
    }

    #[test]
    fn test_span_formatting_tracks_elements() {
        let (inlines, _) = format(
            "Texto <b>importante <i>y urgente</i></b> aquí",
            FormattingMode::Span,
        );
        let runs = runs(&inlines);
        let texts: Vec<_> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Texto ", "importante ", "y urgente", " aquí"]);
        assert!(!runs[0].bold());
        assert!(runs[1].bold() && !runs[1].italic());
        assert!(runs[2].bold() && runs[2].italic());
        assert!(!runs[3].bold());
    }

    #[test]
    fn test_anchor_becomes_hyperlink() {
        let (inlines, registry) = format(
            r#"Ver <a href="https://www.codigotecnico.org/">el CTE</a>."#,
            FormattingMode::Fragment,
        );
        assert_eq!(inlines.len(), 3);
        let Inline::Hyperlink(link) = &inlines[1] else {
            panic!("expected hyperlink, got {:?}", inlines[1]);
        };
        assert_eq!(link.target_uri, "https://www.codigotecnico.org/");
        assert_eq!(link.text(), "el CTE");
        assert_eq!(
            registry.target(&link.relationship_id),
            Some("https://www.codigotecnico.org/")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_links_get_distinct_ids() {
        let (inlines, registry) = format(
            r#"<a href="https://boe.es">uno</a> y <a href="https://boe.es">dos</a>"#,
            FormattingMode::Fragment,
        );
        let ids: Vec<_> = inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Hyperlink(link) => Some(link.relationship_id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_anchor_without_href_is_text() {
        let (inlines, registry) = format(r#"<a name="x">ancla</a> <a href=" ">vacío</a>"#, FormattingMode::Fragment);
        assert!(registry.is_empty());
        assert_eq!(inline_text(&inlines), "ancla vacío");
    }

    #[test]
    fn test_empty_anchor_shows_target() {
        let (inlines, _) = format(r#"<a href="https://boe.es"></a>"#, FormattingMode::Fragment);
        assert_eq!(inline_text(&inlines), "https://boe.es");
    }

    #[test]
    fn test_inline_math_is_routed() {
        let (inlines, _) = format(
            r"El momento $I = b \cdot h^3 / 12$ se calcula.",
            FormattingMode::Fragment,
        );
        assert_eq!(inlines.len(), 3);
        let Inline::Math(math) = &inlines[1] else {
            panic!("expected math");
        };
        assert_eq!(math.source, r"I = b \cdot h^3 / 12");
        assert!(!math.display);
        assert!(
            math.nodes
                .iter()
                .any(|n| matches!(n, MathNode::SubSuperscript { .. }))
        );
    }

    #[test]
    fn test_math_spanning_markup_in_fragment_mode() {
        let (inlines, _) = format("<em>$x_i$</em> es", FormattingMode::Fragment);
        assert!(matches!(inlines[0], Inline::Math(_)));
    }

    #[test]
    fn test_whitespace_and_entities() {
        let (inlines, _) = format("  uno\n  dos&nbsp;tres &amp; <span>cuatro</span>  ", FormattingMode::Fragment);
        assert_eq!(inline_text(&inlines), "uno dos\u{a0}tres & cuatro");
    }

    #[test]
    fn test_scripts_are_dropped() {
        let (inlines, _) = format("a<script>alert(1)</script>b", FormattingMode::Fragment);
        assert_eq!(inline_text(&inlines), "ab");
    }
}

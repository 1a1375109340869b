//! HTML tables to [`Table`] blocks.

use super::block::{BlockRenderer, HeadingScale};
use crate::dom::{DomNodeId, HtmlDom};
use crate::model::{Alignment, Block, Cell, Table};

/// A row collected from the source, before padding.
struct SourceRow {
    cells: Vec<Cell>,
    header: bool,
}

impl BlockRenderer<'_> {
    /// Render a `table` element. A caption becomes a centered paragraph
    /// before the table; a table without rows is dropped entirely.
    pub(super) fn render_table(
        &mut self,
        dom: &HtmlDom,
        table: DomNodeId,
        scale: &HeadingScale,
        out: &mut Vec<Block>,
    ) {
        let mut rows = Vec::new();
        for child in dom.children(table) {
            match dom.tag(child) {
                Some("caption") => {
                    let nodes: Vec<_> = dom.children(child).collect();
                    let runs = self.formatter.format(dom, &nodes);
                    if !super::is_blank(&runs) {
                        out.push(Block::Paragraph {
                            runs,
                            alignment: Alignment::Center,
                        });
                    }
                }
                Some(section @ ("thead" | "tbody" | "tfoot")) => {
                    let in_head = section == "thead";
                    for row in dom.children(child) {
                        if dom.tag(row) == Some("tr") {
                            rows.extend(self.render_row(dom, row, in_head, scale));
                        }
                    }
                }
                Some("tr") => rows.extend(self.render_row(dom, child, false, scale)),
                _ => {}
            }
        }

        if let Some(table) = build_table(rows) {
            out.push(Block::Table(table));
        }
    }

    fn render_row(
        &mut self,
        dom: &HtmlDom,
        row: DomNodeId,
        in_head: bool,
        scale: &HeadingScale,
    ) -> Option<SourceRow> {
        let mut cells = Vec::new();
        let mut all_th = true;
        for cell in dom.children(row) {
            let Some(tag @ ("td" | "th")) = dom.tag(cell) else {
                continue;
            };
            all_th &= tag == "th";
            let mut blocks = Vec::new();
            self.render_children(dom, cell, scale, &mut blocks);
            cells.push(blocks);
        }
        if cells.is_empty() {
            return None;
        }
        Some(SourceRow {
            cells,
            header: in_head || all_th,
        })
    }
}

/// Header rows (from `thead`, or `th`-only rows) go first; only a leading
/// run of them is marked as repeating. Ragged rows are padded with empty
/// cells to the widest row.
fn build_table(rows: Vec<SourceRow>) -> Option<Table> {
    if rows.is_empty() {
        return None;
    }

    let (head, body): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.header);
    let header_rows = head.len();
    let mut rows: Vec<Vec<Cell>> = head.into_iter().chain(body).map(|r| r.cells).collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize_with(width, Vec::new);
    }
    Some(Table { rows, header_rows })
}

#[cfg(test)]
mod tests {
    use crate::links::HyperlinkRegistry;
    use crate::model::{Block, Inline, Table};
    use crate::render::{BlockRenderer, FormattingMode};

    fn render(html: &str) -> (Vec<Block>, HyperlinkRegistry) {
        let mut registry = HyperlinkRegistry::new();
        let blocks = BlockRenderer::new(&mut registry, FormattingMode::Fragment).render(html, 1);
        (blocks, registry)
    }

    fn only_table(blocks: &[Block]) -> &Table {
        let tables: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1, "expected one table in {blocks:?}");
        tables[0]
    }

    fn cell_texts(table: &Table) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.iter().map(Block::text).collect::<Vec<_>>().join("\n"))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_header_and_body_rows() {
        let (blocks, _) = render(
            "<table><thead><tr><th>Normativa</th><th>Referencia</th></tr></thead>\
             <tbody><tr><td>CTE DB-SI</td><td>Sección 1.1</td></tr></tbody></table>",
        );
        let table = only_table(&blocks);
        assert_eq!(table.header_rows, 1);
        assert_eq!(
            cell_texts(table),
            vec![
                vec!["Normativa".to_string(), "Referencia".to_string()],
                vec!["CTE DB-SI".to_string(), "Sección 1.1".to_string()],
            ]
        );
    }

    #[test]
    fn test_th_row_without_thead_is_header() {
        let (blocks, _) = render(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr>\
             <tr><td>3</td><td>4</td></tr></table>",
        );
        let table = only_table(&blocks);
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn test_empty_table_is_omitted() {
        let (blocks, _) = render("<p>antes</p><table></table><table><tr></tr></table>");
        assert_eq!(blocks.len(), 1);
        assert!(!blocks.iter().any(|b| matches!(b, Block::Table(_))));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let (blocks, _) = render("<table><tr><td>a</td><td>b</td><td>c</td></tr><tr><td>d</td></tr></table>");
        let table = only_table(&blocks);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1].len(), 3);
        assert!(table.rows[1][2].is_empty());
    }

    #[test]
    fn test_cells_keep_inline_formatting_and_links() {
        let (blocks, registry) = render(
            r#"<table><tr><td><b>Nota</b></td><td>Ver <a href="https://boe.es">BOE</a></td></tr></table>"#,
        );
        let table = only_table(&blocks);
        let Some(Inline::Run(run)) = table.rows[0][0][0].runs().and_then(|r| r.first()) else {
            panic!("expected a run");
        };
        assert!(run.bold());
        assert_eq!(registry.len(), 1);
        assert_eq!(table.rows[0][1][0].text(), "Ver BOE");
    }

    #[test]
    fn test_caption_precedes_table() {
        let (blocks, _) = render("<table><caption>Tabla 1</caption><tr><td>x</td></tr></table>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Tabla 1");
        assert!(matches!(blocks[1], Block::Table(_)));
    }
}

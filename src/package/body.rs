//! WordprocessingML for document blocks.

use super::omml::{write_math, write_math_paragraph};
use crate::model::{
    Alignment, Block, DocumentModel, FormattedRun, Hyperlink, Inline, ListMarker, RunFormat, Table,
};
use crate::style::{StyleCatalog, StyleMap};
use crate::util::escape_xml;

/// Usable width of an A4 page with the default margins, in twentieths of a
/// point.
pub const TEXT_WIDTH: u32 = 8504;

const LIST_INDENT_STEP: u32 = 360;
const LIST_HANGING: u32 = 360;

pub const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// Escape text for XML and drop characters XML 1.0 cannot carry.
pub fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{fffe}' && c != '\u{ffff}')
        })
        .collect();
    escape_xml(&cleaned)
}

/// Writes blocks as WordprocessingML, naming styles as the target package
/// knows them.
pub struct BodyWriter<'s> {
    styles: &'s StyleMap,
}

impl<'s> BodyWriter<'s> {
    pub fn new(styles: &'s StyleMap) -> Self {
        Self { styles }
    }

    /// Body markup for a model: title page, page break, then content.
    pub fn write_body(&self, model: &DocumentModel) -> String {
        let mut buf = String::new();
        for (i, block) in model.title_page.iter().enumerate() {
            let style = if i == 0 {
                StyleCatalog::TITLE
            } else {
                StyleCatalog::SUBTITLE
            };
            self.write_styled_paragraph(block, style, &mut buf);
        }
        buf.push_str(PAGE_BREAK);
        for block in &model.body {
            self.write_block(block, &mut buf);
        }
        buf
    }

    pub fn write_block(&self, block: &Block, buf: &mut String) {
        match block {
            Block::Heading { level, runs } => {
                buf.push_str("<w:p><w:pPr>");
                self.push_style(StyleCatalog::heading_style(*level), buf);
                buf.push_str("</w:pPr>");
                self.write_inlines(runs, buf);
                buf.push_str("</w:p>");
            }
            Block::Paragraph { runs, alignment } => {
                buf.push_str("<w:p>");
                if *alignment == Alignment::Center {
                    buf.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
                }
                match runs.as_slice() {
                    [Inline::Math(math)] if math.display => write_math_paragraph(math, buf),
                    _ => self.write_inlines(runs, buf),
                }
                buf.push_str("</w:p>");
            }
            Block::ListItem {
                runs,
                marker,
                level,
            } => {
                let left = LIST_INDENT_STEP * (u32::from(*level) + 1) + LIST_HANGING;
                buf.push_str("<w:p><w:pPr>");
                self.push_style(StyleCatalog::LIST_PARAGRAPH, buf);
                match marker {
                    Some(_) => buf.push_str(&format!(
                        r#"<w:ind w:left="{left}" w:hanging="{LIST_HANGING}"/>"#
                    )),
                    None => buf.push_str(&format!(r#"<w:ind w:left="{left}"/>"#)),
                }
                buf.push_str("</w:pPr>");
                if let Some(marker) = marker {
                    write_marker(marker, buf);
                }
                self.write_inlines(runs, buf);
                buf.push_str("</w:p>");
            }
            Block::Table(table) => self.write_table(table, buf),
        }
    }

    fn write_styled_paragraph(&self, block: &Block, style: &str, buf: &mut String) {
        buf.push_str("<w:p><w:pPr>");
        self.push_style(style, buf);
        buf.push_str("</w:pPr>");
        if let Some(runs) = block.runs() {
            self.write_inlines(runs, buf);
        }
        buf.push_str("</w:p>");
    }

    fn push_style(&self, style: &str, buf: &mut String) {
        buf.push_str(&format!(
            r#"<w:pStyle w:val="{}"/>"#,
            escape_xml(self.styles.resolve(style))
        ));
    }

    fn write_inlines(&self, inlines: &[Inline], buf: &mut String) {
        for inline in inlines {
            match inline {
                Inline::Run(run) => write_run(run, None, buf),
                Inline::Hyperlink(link) => self.write_hyperlink(link, buf),
                Inline::Math(math) => write_math(math, buf),
            }
        }
    }

    fn write_hyperlink(&self, link: &Hyperlink, buf: &mut String) {
        buf.push_str(&format!(
            r#"<w:hyperlink r:id="{}" w:history="1">"#,
            escape_xml(&link.relationship_id)
        ));
        let style = self.styles.resolve(StyleCatalog::HYPERLINK);
        for run in &link.display_runs {
            write_run(run, Some(style), buf);
        }
        buf.push_str("</w:hyperlink>");
    }

    fn write_table(&self, table: &Table, buf: &mut String) {
        let columns = table.column_count().max(1);
        let column_width = TEXT_WIDTH / columns as u32;

        buf.push_str("<w:tbl><w:tblPr>");
        buf.push_str(&format!(
            r#"<w:tblStyle w:val="{}"/>"#,
            escape_xml(self.styles.resolve(StyleCatalog::TABLE_GRID))
        ));
        buf.push_str(r#"<w:tblW w:w="5000" w:type="pct"/>"#);
        buf.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        buf.push_str("</w:tblPr><w:tblGrid>");
        for _ in 0..columns {
            buf.push_str(&format!(r#"<w:gridCol w:w="{column_width}"/>"#));
        }
        buf.push_str("</w:tblGrid>");

        for (i, row) in table.rows.iter().enumerate() {
            buf.push_str("<w:tr>");
            if i < table.header_rows {
                buf.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for cell in row {
                buf.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{column_width}" w:type="dxa"/></w:tcPr>"#
                ));
                for block in cell {
                    self.write_block(block, buf);
                }
                // A cell must end with a paragraph.
                if !matches!(cell.last(), Some(b) if !matches!(b, Block::Table(_))) {
                    buf.push_str("<w:p/>");
                }
                buf.push_str("</w:tc>");
            }
            buf.push_str("</w:tr>");
        }
        buf.push_str("</w:tbl>");
    }
}

fn write_marker(marker: &ListMarker, buf: &mut String) {
    buf.push_str(&format!(
        r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r><w:r><w:tab/></w:r>"#,
        xml_text(&marker.label())
    ));
}

fn write_run(run: &FormattedRun, char_style: Option<&str>, buf: &mut String) {
    if run.text.is_empty() {
        return;
    }
    buf.push_str("<w:r>");
    write_run_properties(run.format, char_style, buf);
    buf.push_str(r#"<w:t xml:space="preserve">"#);
    buf.push_str(&xml_text(&run.text));
    buf.push_str("</w:t></w:r>");
}

fn write_run_properties(format: RunFormat, char_style: Option<&str>, buf: &mut String) {
    if format.is_plain() && char_style.is_none() {
        return;
    }
    buf.push_str("<w:rPr>");
    if let Some(style) = char_style {
        buf.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, escape_xml(style)));
    }
    if format.bold {
        buf.push_str("<w:b/>");
    }
    if format.italic {
        buf.push_str("<w:i/>");
    }
    if format.underline {
        buf.push_str(r#"<w:u w:val="single"/>"#);
    }
    buf.push_str("</w:rPr>");
}

//! Named WordprocessingML styles shared by fresh and template exports.
//!
//! The catalog is the single source of style ids used by the body writer.
//! A fresh package gets the whole catalog as its styles part; a template
//! keeps its own styles and only receives the definitions it lacks.

use std::collections::{HashMap, HashSet};

use crate::package::xml::W_NS;

/// Types that serialize themselves as WordprocessingML markup.
pub trait ToXml {
    /// Write this value as XML to the buffer.
    fn to_xml(&self, buf: &mut String);

    /// Convert to an XML string (convenience method).
    fn to_xml_string(&self) -> String {
        let mut buf = String::new();
        self.to_xml(&mut buf);
        buf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
}

impl StyleKind {
    fn as_str(&self) -> &'static str {
        match self {
            StyleKind::Paragraph => "paragraph",
            StyleKind::Character => "character",
            StyleKind::Table => "table",
        }
    }
}

/// One style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: StyleKind,
    pub based_on: Option<&'static str>,
    pub next: Option<&'static str>,
    pub is_default: bool,
    /// Zero-based outline level; makes the style visible to TOC fields.
    pub outline_level: Option<u8>,
    pub keep_next: bool,
    pub centered: bool,
    /// Spacing before/after in twentieths of a point.
    pub spacing: Option<(u32, u32)>,
    /// Left indent in twentieths of a point.
    pub indent: Option<u32>,
    pub bold: bool,
    pub underline: bool,
    /// Font size in half-points.
    pub size: Option<u32>,
    pub color: Option<&'static str>,
    pub bordered: bool,
}

impl StyleDefinition {
    fn new(id: &'static str, name: &'static str, kind: StyleKind) -> Self {
        Self {
            id,
            name,
            kind,
            based_on: None,
            next: None,
            is_default: false,
            outline_level: None,
            keep_next: false,
            centered: false,
            spacing: None,
            indent: None,
            bold: false,
            underline: false,
            size: None,
            color: None,
            bordered: false,
        }
    }

    fn paragraph(id: &'static str, name: &'static str) -> Self {
        Self {
            based_on: Some("Normal"),
            ..Self::new(id, name, StyleKind::Paragraph)
        }
    }

    fn heading(level: u8, size: u32, before: u32) -> Self {
        let (id, name) = match level {
            1 => ("Heading1", "heading 1"),
            2 => ("Heading2", "heading 2"),
            _ => ("Heading3", "heading 3"),
        };
        Self {
            next: Some("Normal"),
            outline_level: Some(level - 1),
            keep_next: true,
            spacing: Some((before, 120)),
            bold: true,
            size: Some(size),
            ..Self::paragraph(id, name)
        }
    }

    fn has_paragraph_props(&self) -> bool {
        self.keep_next
            || self.centered
            || self.spacing.is_some()
            || self.indent.is_some()
            || self.outline_level.is_some()
    }

    fn has_run_props(&self) -> bool {
        self.bold || self.underline || self.size.is_some() || self.color.is_some()
    }
}

impl ToXml for StyleDefinition {
    fn to_xml(&self, buf: &mut String) {
        buf.push_str(&format!(r#"<w:style w:type="{}""#, self.kind.as_str()));
        if self.is_default {
            buf.push_str(r#" w:default="1""#);
        }
        buf.push_str(&format!(r#" w:styleId="{}">"#, self.id));
        buf.push_str(&format!(r#"<w:name w:val="{}"/>"#, self.name));
        if let Some(based_on) = self.based_on {
            buf.push_str(&format!(r#"<w:basedOn w:val="{based_on}"/>"#));
        }
        if let Some(next) = self.next {
            buf.push_str(&format!(r#"<w:next w:val="{next}"/>"#));
        }
        buf.push_str("<w:qFormat/>");

        if self.has_paragraph_props() {
            buf.push_str("<w:pPr>");
            if self.keep_next {
                buf.push_str("<w:keepNext/>");
            }
            if let Some((before, after)) = self.spacing {
                buf.push_str(&format!(
                    r#"<w:spacing w:before="{before}" w:after="{after}"/>"#
                ));
            }
            if let Some(indent) = self.indent {
                buf.push_str(&format!(r#"<w:ind w:left="{indent}"/>"#));
            }
            if self.centered {
                buf.push_str(r#"<w:jc w:val="center"/>"#);
            }
            if let Some(level) = self.outline_level {
                buf.push_str(&format!(r#"<w:outlineLvl w:val="{level}"/>"#));
            }
            buf.push_str("</w:pPr>");
        }

        if self.has_run_props() {
            buf.push_str("<w:rPr>");
            if self.bold {
                buf.push_str("<w:b/>");
            }
            if let Some(color) = self.color {
                buf.push_str(&format!(r#"<w:color w:val="{color}"/>"#));
            }
            if let Some(size) = self.size {
                buf.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));
            }
            if self.underline {
                buf.push_str(r#"<w:u w:val="single"/>"#);
            }
            buf.push_str("</w:rPr>");
        }

        if self.bordered {
            buf.push_str("<w:tblPr><w:tblBorders>");
            for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                buf.push_str(&format!(
                    r#"<w:{side} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
                ));
            }
            buf.push_str("</w:tblBorders></w:tblPr>");
        }

        buf.push_str("</w:style>");
    }
}

/// The set of styles the body writer refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCatalog {
    styles: Vec<StyleDefinition>,
}

impl StyleCatalog {
    pub const NORMAL: &'static str = "Normal";
    pub const TITLE: &'static str = "Title";
    pub const SUBTITLE: &'static str = "Subtitle";
    pub const LIST_PARAGRAPH: &'static str = "ListParagraph";
    pub const HYPERLINK: &'static str = "Hyperlink";
    pub const TABLE_GRID: &'static str = "TableGrid";

    pub fn standard() -> Self {
        let normal = StyleDefinition {
            is_default: true,
            spacing: Some((0, 160)),
            ..StyleDefinition::new(Self::NORMAL, "Normal", StyleKind::Paragraph)
        };
        let title = StyleDefinition {
            next: Some(Self::NORMAL),
            centered: true,
            spacing: Some((2400, 480)),
            bold: true,
            size: Some(48),
            ..StyleDefinition::paragraph(Self::TITLE, "Title")
        };
        let subtitle = StyleDefinition {
            next: Some(Self::NORMAL),
            centered: true,
            spacing: Some((120, 120)),
            size: Some(26),
            color: Some("595959"),
            ..StyleDefinition::paragraph(Self::SUBTITLE, "Subtitle")
        };
        let list_paragraph = StyleDefinition {
            indent: Some(720),
            spacing: Some((0, 80)),
            ..StyleDefinition::paragraph(Self::LIST_PARAGRAPH, "List Paragraph")
        };
        let hyperlink = StyleDefinition {
            color: Some("0563C1"),
            underline: true,
            ..StyleDefinition::new(Self::HYPERLINK, "Hyperlink", StyleKind::Character)
        };
        let table_grid = StyleDefinition {
            bordered: true,
            ..StyleDefinition::new(Self::TABLE_GRID, "Table Grid", StyleKind::Table)
        };

        Self {
            styles: vec![
                normal,
                title,
                subtitle,
                StyleDefinition::heading(1, 32, 360),
                StyleDefinition::heading(2, 28, 240),
                StyleDefinition::heading(3, 26, 240),
                list_paragraph,
                hyperlink,
                table_grid,
            ],
        }
    }

    /// Style id for a heading level; levels past 3 collapse to 3.
    pub fn heading_style(level: u8) -> &'static str {
        match level {
            0 | 1 => "Heading1",
            2 => "Heading2",
            _ => "Heading3",
        }
    }

    pub fn styles(&self) -> &[StyleDefinition] {
        &self.styles
    }

    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.styles.iter().map(|s| s.id)
    }

    /// Definitions whose ids are not among `present`, in catalog order.
    pub fn missing_from<'a, I>(&self, present: I) -> Vec<&StyleDefinition>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = present.into_iter().collect();
        self.styles
            .iter()
            .filter(|s| !present.contains(s.id))
            .collect()
    }

    /// A complete `word/styles.xml` part.
    pub fn to_xml(&self) -> String {
        let mut buf = String::new();
        buf.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        buf.push('\n');
        buf.push_str(&format!(r#"<w:styles xmlns:w="{W_NS}">"#));
        buf.push_str(concat!(
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>"#,
            r#"<w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="es-ES"/>"#,
            "</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>",
        ));
        for style in &self.styles {
            style.to_xml(&mut buf);
        }
        buf.push_str("</w:styles>");
        buf
    }
}

/// Catalog ids as they are named in a target package.
///
/// Localized templates often define the built-in styles under translated
/// ids (`Ttulo1` for `heading 1`); those are reused instead of injecting a
/// duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    renamed: HashMap<&'static str, String>,
}

impl StyleMap {
    /// Id to write for a catalog style.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.renamed.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn is_identity(&self) -> bool {
        self.renamed.is_empty()
    }
}

impl StyleCatalog {
    /// Match the catalog against existing `(styleId, name)` definitions:
    /// first by id, then by case-insensitive name. Returns the id mapping
    /// and the definitions that still have to be injected.
    pub fn map_onto(
        &self,
        existing: &[(String, Option<String>)],
    ) -> (StyleMap, Vec<&StyleDefinition>) {
        let mut map = StyleMap::default();
        let ids = existing.iter().map(|(id, _)| id.as_str());
        let mut missing = Vec::new();
        for style in self.missing_from(ids) {
            let same_name = existing.iter().find(|(_, name)| {
                name.as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(style.name))
            });
            match same_name {
                Some((id, _)) => {
                    map.renamed.insert(style.id, id.clone());
                }
                None => missing.push(style),
            }
        }
        (map, missing)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_ids() {
        let catalog = StyleCatalog::standard();
        let ids: Vec<_> = catalog.ids().collect();
        for id in ["Normal", "Title", "Subtitle", "Heading1", "Heading2", "Heading3"] {
            assert!(ids.contains(&id), "missing {id}");
        }
        assert_eq!(catalog.get("Heading2").and_then(|s| s.outline_level), Some(1));
    }

    #[test]
    fn test_heading_style_caps_at_three() {
        assert_eq!(StyleCatalog::heading_style(1), "Heading1");
        assert_eq!(StyleCatalog::heading_style(3), "Heading3");
        assert_eq!(StyleCatalog::heading_style(9), "Heading3");
    }

    #[test]
    fn test_missing_from() {
        let catalog = StyleCatalog::standard();
        let missing: Vec<_> = catalog
            .missing_from(["Normal", "Heading1", "Heading2", "Title", "Subtitle"])
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(
            missing,
            vec!["Heading3", "ListParagraph", "Hyperlink", "TableGrid"]
        );
        assert!(catalog.missing_from(catalog.ids()).is_empty());
    }

    #[test]
    fn test_map_onto_localized_template() {
        let catalog = StyleCatalog::standard();
        let existing = vec![
            ("Normal".to_string(), Some("Normal".to_string())),
            ("Ttulo1".to_string(), Some("heading 1".to_string())),
            ("Ttulo".to_string(), Some("Title".to_string())),
            ("Custom".to_string(), None),
        ];
        let (map, missing) = catalog.map_onto(&existing);
        assert_eq!(map.resolve("Heading1"), "Ttulo1");
        assert_eq!(map.resolve("Title"), "Ttulo");
        assert_eq!(map.resolve("Heading2"), "Heading2");
        let missing: Vec<_> = missing.into_iter().map(|s| s.id).collect();
        assert!(missing.contains(&"Heading2"));
        assert!(!missing.contains(&"Heading1"));
        assert!(!missing.contains(&"Normal"));
        assert!(StyleMap::default().is_identity());
    }

    #[test]
    fn test_styles_part_is_well_formed() {
        let xml = StyleCatalog::standard().to_xml();
        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut styles = 0;
        loop {
            match reader.read_event().expect("styles part should parse") {
                quick_xml::events::Event::Start(e) if e.name().as_ref() == b"w:style" => {
                    styles += 1;
                }
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(styles, StyleCatalog::standard().styles().len());
        assert!(xml.contains(r#"<w:outlineLvl w:val="0"/>"#));
        assert!(xml.contains(r#"w:default="1" w:styleId="Normal""#));
    }
}

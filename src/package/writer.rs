//! Fresh package skeleton and ZIP serialization.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::parts::{
    CONTENT_TYPES_PART, CT_DOCUMENT_MAIN, CT_RELATIONSHIPS, CT_SETTINGS, CT_STYLES, CT_XML,
    ContentTypes, REL_OFFICE_DOCUMENT, REL_SETTINGS, REL_STYLES, ROOT_RELS_PART, Relationship,
    Relationships, rels_path_for,
};
use super::xml::{M_NS, R_NS, W_NS};
use super::{DEFAULT_MAIN_PART, Package, PackageOrigin};
use crate::error::{Error, Result};
use crate::style::StyleCatalog;
use crate::util::escape_xml;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A4 portrait with 3 cm side and 2.5 cm top/bottom margins.
const SECTION_PROPERTIES: &str = concat!(
    "<w:sectPr>",
    r#"<w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1417" w:right="1701" w:bottom="1417" w:left="1701" w:header="708" w:footer="708" w:gutter="0"/>"#,
    r#"<w:cols w:space="708"/>"#,
    "</w:sectPr>",
);

/// An empty main document part.
pub fn document_skeleton() -> String {
    format!(
        r#"{XML_DECLARATION}
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}" xmlns:m="{M_NS}"><w:body>{SECTION_PROPERTIES}</w:body></w:document>"#
    )
}

/// Minimal settings part.
pub fn settings_xml() -> String {
    format!(
        r#"{XML_DECLARATION}
<w:settings xmlns:w="{W_NS}"><w:defaultTabStop w:val="708"/><w:characterSpacingControl w:val="doNotCompress"/><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat></w:settings>"#
    )
}

/// `docProps/core.xml` with title, creator and W3CDTF timestamps.
pub fn core_properties_xml(title: &str, generated_at: DateTime<Utc>) -> String {
    let timestamp = generated_at.format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>memoria</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{ts}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{ts}</dcterms:modified>"#,
            "</cp:coreProperties>",
        ),
        decl = XML_DECLARATION,
        title = escape_xml(title),
        ts = timestamp,
    )
}

impl Package {
    /// A new package with an empty document, the given styles and default
    /// settings.
    pub fn fresh(styles: &StyleCatalog) -> Self {
        let mut content_types = ContentTypes::default();
        content_types.ensure_default("rels", CT_RELATIONSHIPS);
        content_types.ensure_default("xml", CT_XML);
        content_types.set_override(DEFAULT_MAIN_PART, CT_DOCUMENT_MAIN);
        content_types.set_override("word/styles.xml", CT_STYLES);
        content_types.set_override("word/settings.xml", CT_SETTINGS);

        let mut root_rels = Relationships::default();
        root_rels.add_internal(REL_OFFICE_DOCUMENT, DEFAULT_MAIN_PART);

        // Descriptive ids stay clear of the rIdN sequence used for links.
        let document_rels = Relationships {
            entries: vec![
                Relationship {
                    id: "rIdStyles".to_string(),
                    rel_type: REL_STYLES.to_string(),
                    target: "styles.xml".to_string(),
                    external: false,
                },
                Relationship {
                    id: "rIdSettings".to_string(),
                    rel_type: REL_SETTINGS.to_string(),
                    target: "settings.xml".to_string(),
                    external: false,
                },
            ],
        };

        Package {
            parts: vec![
                (DEFAULT_MAIN_PART.to_string(), document_skeleton().into_bytes()),
                ("word/styles.xml".to_string(), styles.to_xml().into_bytes()),
                ("word/settings.xml".to_string(), settings_xml().into_bytes()),
            ],
            content_types,
            root_rels,
            document_rels,
            main_part: DEFAULT_MAIN_PART.to_string(),
            origin: PackageOrigin::Fresh,
        }
    }

    /// Serialize the package as a ZIP container.
    ///
    /// Entries are written in a stable order (content types, package
    /// relationships, main part relationships, then parts as stored) with a
    /// fixed timestamp, so equal packages produce equal bytes. Level 0
    /// stores entries uncompressed.
    pub fn seal(&self, compression_level: i64) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = match compression_level {
            0 => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            level => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(level)),
        }
        .last_modified_time(zip::DateTime::default());

        let document_rels = rels_path_for(&self.main_part);
        let tables = [
            (CONTENT_TYPES_PART, self.content_types.to_xml()),
            (ROOT_RELS_PART, self.root_rels.to_xml()),
            (document_rels.as_str(), self.document_rels.to_xml()),
        ];
        for (name, xml) in &tables {
            zip.start_file(*name, options).map_err(serialization)?;
            zip.write_all(xml.as_bytes()).map_err(serialization)?;
        }
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)
                .map_err(serialization)?;
            zip.write_all(data).map_err(serialization)?;
        }

        let cursor = zip.finish().map_err(serialization)?;
        Ok(cursor.into_inner())
    }
}

fn serialization<E: std::fmt::Display>(e: E) -> Error {
    Error::Serialization(e.to_string())
}

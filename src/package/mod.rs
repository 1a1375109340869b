//! OOXML package assembly.
//!
//! A [`Package`] holds the parts of a WordprocessingML container in memory,
//! along with its content-type table and the two relationship tables the
//! exporter edits (package root and main document part). It starts either
//! from a fresh skeleton ([`Package::fresh`]) or from a Word template
//! ([`Package::from_template`]); both then go through the same steps:
//!
//! 1. [`Package::append_document`] writes the title page and body
//! 2. [`Package::force_field_update`] asks Word to refresh fields
//! 3. [`Package::seal`] produces the ZIP bytes

pub mod body;
pub mod omml;
pub mod parts;
mod template;
mod writer;
pub mod xml;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::model::DocumentModel;
use crate::style::ToXml;

pub use body::BodyWriter;
pub use parts::{ContentTypes, Relationship, Relationships};
pub use template::MAX_PART_SIZE;

use parts::{
    CT_CORE_PROPERTIES, CT_SETTINGS, CT_STYLES, REL_CORE_PROPERTIES, REL_HYPERLINK, REL_SETTINGS,
    REL_STYLES, resolve_target,
};
use xml::{M_NS, R_NS, W_NS, children, element_spans, ensure_namespaces, insert_child, root_span};

/// Main document part of packages we create.
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Settings children that must follow `w:updateFields` (CT_Settings order).
const AFTER_UPDATE_FIELDS: &[&str] = &[
    "hdrShapeDefaults",
    "footnotePr",
    "endnotePr",
    "compat",
    "docVars",
    "rsids",
    "mathPr",
    "attachedSchema",
    "themeFontLang",
    "clrSchemeMapping",
    "doNotIncludeSubdocsInStats",
    "doNotAutoCompressPictures",
    "forceUpgrade",
    "captions",
    "readModeInkLockDown",
    "smartTagType",
    "schemaLibrary",
    "shapeDefaults",
    "doNotEmbedSmartTags",
    "decimalSymbol",
    "listSeparator",
];

const UPDATE_FIELDS: &str = r#"<w:updateFields w:val="true"/>"#;

/// Where a package's parts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOrigin {
    Fresh,
    Template,
}

/// An in-memory WordprocessingML package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Every part except the content types and the two relationship tables,
    /// in the order they will be written.
    parts: Vec<(String, Vec<u8>)>,
    content_types: ContentTypes,
    root_rels: Relationships,
    document_rels: Relationships,
    main_part: String,
    origin: PackageOrigin,
}

impl Package {
    pub fn origin(&self) -> PackageOrigin {
        self.origin
    }

    /// Path of the main document part, e.g. `word/document.xml`.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn document_relationships(&self) -> &Relationships {
        &self.document_rels
    }

    /// Ids already used by the main part's relationships. Seed the
    /// hyperlink registry with these.
    pub fn relationship_ids(&self) -> impl Iterator<Item = &str> {
        self.document_rels.ids()
    }

    /// Part data; part names compare case-insensitively.
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        let path = path.trim_start_matches('/');
        self.parts
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(path))
            .map(|(_, data)| data.as_slice())
    }

    /// Replace a part's data, or add the part at the end.
    pub fn set_part(&mut self, path: &str, data: Vec<u8>) {
        let path = path.trim_start_matches('/');
        match self
            .parts
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(path))
        {
            Some(entry) => entry.1 = data,
            None => self.parts.push((path.to_string(), data)),
        }
    }

    /// A part decoded as UTF-8, without any byte order mark.
    pub fn part_text(&self, path: &str) -> Result<String> {
        let data = self
            .part(path)
            .ok_or_else(|| Error::InvalidTemplate(format!("missing part {path}")))?;
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        Ok(String::from_utf8(data.to_vec())?)
    }

    /// Path of the part the main document relates to with `rel_type`,
    /// creating the part and the relationship when they are missing.
    fn ensure_related_part<F>(
        &mut self,
        rel_type: &str,
        default_target: &str,
        content_type: &str,
        default_content: F,
    ) -> String
    where
        F: FnOnce() -> String,
    {
        let existing = self
            .document_rels
            .by_type(rel_type)
            .map(|rel| resolve_target(&self.main_part, &rel.target));
        let path = match existing {
            Some(path) => path,
            None => {
                let id = self.document_rels.add_internal(rel_type, default_target);
                info!("Added {default_target} relationship {id} to {}", self.main_part);
                resolve_target(&self.main_part, default_target)
            }
        };
        if self.part(&path).is_none() {
            info!("Created missing part {path}");
            self.set_part(&path, default_content().into_bytes());
            self.content_types.set_override(&path, content_type);
        }
        path
    }

    /// Append the title page, a page break and the body to the main part,
    /// and register everything the markup refers to: hyperlink
    /// relationships, styles and (fresh packages) document properties.
    ///
    /// Content goes before the body-level `w:sectPr`, so the page setup of a
    /// template is kept.
    pub fn append_document(&mut self, model: &DocumentModel) -> Result<()> {
        // Hyperlinks first: their ids were allocated around the ids present
        // now, and later additions pick ids around theirs.
        for link in model.hyperlinks.entries() {
            self.document_rels.add(Relationship {
                id: link.id.clone(),
                rel_type: REL_HYPERLINK.to_string(),
                target: link.target.clone(),
                external: true,
            })?;
        }

        let style_map = self.merge_styles(model)?;

        let main_part = self.main_part.clone();
        let mut document = self.part_text(&main_part)?;
        ensure_namespaces(&mut document, &[("w", W_NS), ("r", R_NS), ("m", M_NS)])?;
        let spans = element_spans(&document)?;
        let root = root_span(&spans)?;
        let body = children(&spans, root)
            .find(|s| s.local_name() == "body")
            .ok_or_else(|| Error::InvalidTemplate(format!("{main_part} has no body")))?;
        let section = children(&spans, body)
            .filter(|s| s.local_name() == "sectPr")
            .last()
            .map(|s| s.start);

        let markup = BodyWriter::new(&style_map).write_body(model);
        insert_child(&mut document, body, section, &markup);
        debug!(
            "Appended {} body blocks ({} bytes of markup) to {main_part}",
            model.body.len(),
            markup.len()
        );
        self.set_part(&main_part, document.into_bytes());

        if self.origin == PackageOrigin::Fresh {
            self.write_core_properties(model);
        }
        Ok(())
    }

    /// Make sure every catalog style resolves in the package's styles part,
    /// injecting the ones it lacks.
    fn merge_styles(&mut self, model: &DocumentModel) -> Result<crate::style::StyleMap> {
        let path = self.ensure_related_part(REL_STYLES, "styles.xml", CT_STYLES, || {
            model.styles.to_xml()
        });
        let mut styles = self.part_text(&path)?;
        let existing = xml::style_names(&styles)?;
        let (map, missing) = model.styles.map_onto(&existing);
        if !map.is_identity() {
            debug!("Reusing localized style ids in {path}: {map:?}");
        }
        if !missing.is_empty() {
            ensure_namespaces(&mut styles, &[("w", W_NS)])?;
            let definitions: String = missing.iter().map(|s| s.to_xml_string()).collect();
            let spans = element_spans(&styles)?;
            let root = root_span(&spans)?;
            insert_child(&mut styles, root, None, &definitions);
            info!(
                "Injected {} missing styles into {path}: {}",
                missing.len(),
                missing.iter().map(|s| s.id).collect::<Vec<_>>().join(", ")
            );
            self.set_part(&path, styles.into_bytes());
        }
        Ok(map)
    }

    fn write_core_properties(&mut self, model: &DocumentModel) {
        let xml = writer::core_properties_xml(&model.title, model.generated_at);
        self.set_part(CORE_PROPERTIES_PART, xml.into_bytes());
        self.content_types
            .set_override(CORE_PROPERTIES_PART, CT_CORE_PROPERTIES);
        if self.root_rels.by_type(REL_CORE_PROPERTIES).is_none() {
            self.root_rels
                .add_internal(REL_CORE_PROPERTIES, CORE_PROPERTIES_PART);
        }
    }

    /// Set `w:updateFields` in the settings part so Word recomputes fields
    /// (tables of contents, page references) when the document is opened.
    pub fn force_field_update(&mut self) -> Result<()> {
        let path =
            self.ensure_related_part(REL_SETTINGS, "settings.xml", CT_SETTINGS, writer::settings_xml);
        let mut settings = self.part_text(&path)?;
        ensure_namespaces(&mut settings, &[("w", W_NS)])?;
        let spans = element_spans(&settings)?;
        let root = root_span(&spans)?;

        if let Some(existing) = children(&spans, root).find(|s| s.local_name() == "updateFields") {
            settings.replace_range(existing.start..existing.end, UPDATE_FIELDS);
        } else {
            let before = children(&spans, root)
                .find(|s| AFTER_UPDATE_FIELDS.contains(&s.local_name()))
                .map(|s| s.start);
            insert_child(&mut settings, root, before, UPDATE_FIELDS);
        }
        debug!("Requested field update in {path}");
        self.set_part(&path, settings.into_bytes());
        Ok(())
    }
}

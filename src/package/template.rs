//! Opening Word templates as export targets.
//!
//! A template is accepted on structure alone: it must be a ZIP container
//! with a content-type table, and its main part must be either a document
//! or a (non macro-enabled) template. Anything else the exporter needs is
//! repaired in place and logged.

use std::io::{Cursor, Read};

use log::info;
use zip::ZipArchive;

use super::parts::{
    CONTENT_TYPES_PART, CT_DOCUMENT_MAIN, CT_MACRO_DOCUMENT, CT_MACRO_TEMPLATE, CT_RELATIONSHIPS,
    CT_TEMPLATE_MAIN, CT_XML, ContentTypes, REL_OFFICE_DOCUMENT, ROOT_RELS_PART, Relationships,
    rels_path_for, resolve_target,
};
use super::writer::document_skeleton;
use super::xml::{W_NS, children, element_spans, ensure_namespaces, insert_child, root_span};
use super::{DEFAULT_MAIN_PART, Package, PackageOrigin};
use crate::error::{Error, Result};

/// Largest uncompressed part accepted from a template.
pub const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

impl Package {
    /// Open template bytes (normally a `.dotx`) as an export target.
    pub fn from_template(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidTemplate("template is empty".into()));
        }
        let mut parts = read_parts(bytes)?;

        let content_types = take_part(&mut parts, CONTENT_TYPES_PART)
            .ok_or_else(|| Error::InvalidTemplate("missing [Content_Types].xml".into()))?;
        let mut content_types = ContentTypes::parse(&utf8(content_types)?)?;
        content_types.ensure_default("rels", CT_RELATIONSHIPS);
        content_types.ensure_default("xml", CT_XML);

        let mut root_rels = match take_part(&mut parts, ROOT_RELS_PART) {
            Some(data) => Relationships::parse(&utf8(data)?)?,
            None => {
                info!("Template has no package relationships; creating them");
                Relationships::default()
            }
        };

        let main_part = match root_rels.by_type(REL_OFFICE_DOCUMENT) {
            Some(rel) => resolve_target("", &rel.target),
            None => {
                root_rels.add_internal(REL_OFFICE_DOCUMENT, DEFAULT_MAIN_PART);
                info!("Template has no main document relationship; pointing it at {DEFAULT_MAIN_PART}");
                DEFAULT_MAIN_PART.to_string()
            }
        };

        match content_types.get(&main_part) {
            Some(CT_DOCUMENT_MAIN) => {}
            Some(CT_TEMPLATE_MAIN) => {
                content_types.set_override(&main_part, CT_DOCUMENT_MAIN);
                info!("Converted template main part {main_part} to a document");
            }
            Some(CT_MACRO_TEMPLATE | CT_MACRO_DOCUMENT) => {
                return Err(Error::InvalidTemplate(
                    "macro-enabled templates are not supported".into(),
                ));
            }
            None | Some(CT_XML) => {
                content_types.set_override(&main_part, CT_DOCUMENT_MAIN);
                info!("Registered {main_part} as the main document part");
            }
            Some(other) => {
                return Err(Error::InvalidTemplate(format!(
                    "main part {main_part} has content type {other}"
                )));
            }
        }

        let document_rels = match take_part(&mut parts, &rels_path_for(&main_part)) {
            Some(data) => Relationships::parse(&utf8(data)?)?,
            None => Relationships::default(),
        };

        let mut package = Package {
            parts,
            content_types,
            root_rels,
            document_rels,
            main_part,
            origin: PackageOrigin::Template,
        };
        package.repair_main_part()?;
        Ok(package)
    }

    /// Create the main part when it is absent, or give it a body when it has
    /// none.
    fn repair_main_part(&mut self) -> Result<()> {
        let main_part = self.main_part.clone();
        if self.part(&main_part).is_none() {
            info!("Template has no {main_part}; creating an empty document");
            self.set_part(&main_part, document_skeleton().into_bytes());
            return Ok(());
        }

        let mut document = self.part_text(&main_part)?;
        let spans = element_spans(&document)?;
        let root = root_span(&spans)?;
        if root.local_name() != "document" {
            return Err(Error::InvalidTemplate(format!(
                "{main_part} root is <{}>, not a document",
                root.name
            )));
        }
        if children(&spans, root).any(|s| s.local_name() == "body") {
            return Ok(());
        }

        ensure_namespaces(&mut document, &[("w", W_NS)])?;
        let spans = element_spans(&document)?;
        let root = root_span(&spans)?;
        insert_child(&mut document, root, None, "<w:body></w:body>");
        info!("Template {main_part} has no body; added an empty one");
        self.set_part(&main_part, document.into_bytes());
        Ok(())
    }
}

/// Every file entry of the archive, in archive order.
fn read_parts(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::InvalidTemplate(format!("not a ZIP package: {e}")))?;

    let mut parts = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().trim_start_matches('/').to_string();
        if file.size() > MAX_PART_SIZE {
            return Err(Error::InvalidTemplate(format!(
                "part {name} is larger than {MAX_PART_SIZE} bytes"
            )));
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        // The declared size is not trusted; cap what is actually inflated.
        file.take(MAX_PART_SIZE + 1).read_to_end(&mut data)?;
        if data.len() as u64 > MAX_PART_SIZE {
            return Err(Error::InvalidTemplate(format!(
                "part {name} is larger than {MAX_PART_SIZE} bytes"
            )));
        }
        parts.push((name, data));
    }
    Ok(parts)
}

/// Remove a part from the list, matching the name case-insensitively.
fn take_part(parts: &mut Vec<(String, Vec<u8>)>, path: &str) -> Option<Vec<u8>> {
    let index = parts
        .iter()
        .position(|(name, _)| name.eq_ignore_ascii_case(path))?;
    Some(parts.remove(index).1)
}

fn utf8(mut data: Vec<u8>) -> Result<String> {
    if data.starts_with(b"\xEF\xBB\xBF") {
        data.drain(..3);
    }
    Ok(String::from_utf8(data)?)
}

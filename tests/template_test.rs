//! Exports into Word templates, and the fallback when a template is unusable.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use memoria::{
    ContentNode, ContentTree, DocxExporter, Error, TemplateCache, TemplateKey, TemplateSource,
};

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
const DOCUMENT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

fn content_types(main: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="{main}"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/></Types>"#
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/></Relationships>"#;

fn document() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W}" xmlns:r="{R}"><w:body><w:p><w:r><w:t>Plantilla corporativa</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#
    )
}

/// Styles of a Spanish Word install: headings have translated ids.
fn styles() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Ttulo1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style></w:styles>"#
    )
}

fn settings() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="{W}"><w:zoom w:percent="100"/><w:defaultTabStop w:val="708"/><w:compat/></w:settings>"#
    )
}

fn dotx() -> Vec<u8> {
    let types = content_types(TEMPLATE_MAIN);
    let (document, styles, settings) = (document(), styles(), settings());
    zip_of(&[
        ("[Content_Types].xml", types.as_str()),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", styles.as_str()),
        ("word/settings.xml", settings.as_str()),
    ])
}

fn content() -> ContentTree {
    tree(vec![
        ContentNode::new("1", "Memoria")
            .with_content(r#"<p>Según el <a href="https://www.codigotecnico.org/">CTE</a>.</p>"#)
            .with_child(ContentNode::new("1.1", "Agentes").with_content("<p>Promotor.</p>")),
    ])
}

#[test]
fn test_template_is_converted_and_populated() {
    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &dotx())
        .unwrap();
    assert!(output.used_template);

    let parts = read_parts(&output.bytes);
    for (name, xml) in &parts {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            assert_well_formed(name, xml);
        }
    }

    let types = &parts["[Content_Types].xml"];
    assert!(types.contains(DOCUMENT_MAIN));
    assert!(!types.contains(TEMPLATE_MAIN));

    let document = &parts["word/document.xml"];
    let kept = document.find("Plantilla corporativa").unwrap();
    let title = document.find("Rehabilitación de edificio").unwrap();
    let section = document.find("<w:sectPr>").unwrap();
    assert!(kept < title && title < section);
    assert!(document.contains(r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#));
    // Headings use the template's own ids for the built-in styles.
    assert!(document.contains(r#"<w:pStyle w:val="Ttulo1"/>"#));
    assert!(!document.contains(r#"<w:pStyle w:val="Heading1"/>"#));
    assert!(document.contains(r#"<w:pStyle w:val="Heading2"/>"#));

    assert!(!parts.contains_key("docProps/core.xml"));
}

#[test]
fn test_hyperlink_ids_avoid_template_relationships() {
    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &dotx())
        .unwrap();
    let parts = read_parts(&output.bytes);
    let rels = &parts["word/_rels/document.xml.rels"];
    assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://www.codigotecnico.org/" TargetMode="External""#));
    assert!(parts["word/document.xml"].contains(r#"<w:hyperlink r:id="rId4""#));
}

#[test]
fn test_missing_styles_are_injected() {
    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &dotx())
        .unwrap();
    let styles = &read_parts(&output.bytes)["word/styles.xml"];
    for id in ["Title", "Subtitle", "Heading2", "Heading3", "ListParagraph", "Hyperlink", "TableGrid"] {
        assert_eq!(
            styles.matches(&format!(r#"w:styleId="{id}""#)).count(),
            1,
            "style {id}"
        );
    }
    assert_eq!(styles.matches(r#"w:styleId="Normal""#).count(), 1);
    assert!(!styles.contains(r#"w:styleId="Heading1""#));
}

#[test]
fn test_field_update_is_requested() {
    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &dotx())
        .unwrap();
    let settings = &read_parts(&output.bytes)["word/settings.xml"];
    let zoom = settings.find("<w:zoom").unwrap();
    let update = settings.find(r#"<w:updateFields w:val="true"/>"#).unwrap();
    let compat = settings.find("<w:compat/>").unwrap();
    assert!(zoom < update && update < compat);
}

#[test]
fn test_missing_settings_are_created() {
    let types = content_types(TEMPLATE_MAIN);
    let (document, styles) = (document(), styles());
    let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;
    let template = zip_of(&[
        ("[Content_Types].xml", types.as_str()),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", rels),
        ("word/styles.xml", styles.as_str()),
    ]);

    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &template)
        .unwrap();
    assert!(output.used_template);
    let parts = read_parts(&output.bytes);
    assert!(parts["word/settings.xml"].contains("<w:updateFields"));
    let rels = &parts["word/_rels/document.xml.rels"];
    assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink""#));
    assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml""#));
}

#[test]
fn test_template_without_main_part() {
    let types = content_types(TEMPLATE_MAIN);
    let template = zip_of(&[("[Content_Types].xml", types.as_str()), ("_rels/.rels", ROOT_RELS)]);
    let output = DocxExporter::new()
        .export_with_template(&content(), &title_page(), &template)
        .unwrap();
    assert!(output.used_template);
    let parts = read_parts(&output.bytes);
    assert!(parts["word/document.xml"].contains("Rehabilitación de edificio"));
    assert!(parts.contains_key("word/styles.xml"));
}

#[test]
fn test_unusable_templates_fall_back() {
    let fresh = DocxExporter::new().export(&content(), &title_page()).unwrap();

    let macro_enabled = {
        let types = content_types("application/vnd.ms-word.template.macroEnabledTemplate.main+xml");
        let document = document();
        zip_of(&[
            ("[Content_Types].xml", types.as_str()),
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", document.as_str()),
        ])
    };
    let truncated = {
        let mut bytes = dotx();
        bytes.truncate(bytes.len() / 2);
        bytes
    };

    for template in [b"".to_vec(), b"PK\x03\x04 garbage".to_vec(), macro_enabled, truncated] {
        let output = DocxExporter::new()
            .export_with_template(&content(), &title_page(), &template)
            .expect("fallback should succeed");
        assert!(!output.used_template);
        assert_eq!(output.bytes, fresh.bytes);
    }
}

struct FixtureSource {
    fetches: AtomicUsize,
}

impl TemplateSource for FixtureSource {
    fn fetch(&self, key: &TemplateKey) -> memoria::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match key.template_id.as_str() {
            "corporativa" => Ok(dotx()),
            other => Err(Error::InvalidTemplate(format!("no template {other}"))),
        }
    }
}

#[test]
fn test_cached_template_export() {
    let cache = TemplateCache::default();
    let source = FixtureSource {
        fetches: AtomicUsize::new(0),
    };
    let exporter = DocxExporter::new();
    let key = TemplateKey::new("memoria", "corporativa", 2);

    let first = exporter
        .export_with_cached_template(&content(), &title_page(), &cache, &source, &key)
        .unwrap();
    let second = exporter
        .export_with_cached_template(&content(), &title_page(), &cache, &source, &key)
        .unwrap();
    assert!(first.used_template && second.used_template);
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

    let missing = TemplateKey::new("memoria", "borrada", 1);
    let output = exporter
        .export_with_cached_template(&content(), &title_page(), &cache, &source, &missing)
        .unwrap();
    assert!(!output.used_template);
}

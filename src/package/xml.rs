//! Byte-offset editing of existing XML parts.
//!
//! Template parts are edited in place: we locate elements with quick-xml
//! and splice text at their offsets, leaving everything we do not touch
//! byte-for-byte as the template had it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const M_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

/// Location of one element in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
    /// Qualified name as written, e.g. `w:body`.
    pub name: String,
    /// Nesting depth; the root element is 0.
    pub depth: usize,
    /// Offset of the `<` of the start tag.
    pub start: usize,
    /// Offset just past the `>` of the start tag.
    pub start_tag_end: usize,
    /// Offset of the `<` of the end tag (equal to `end` for empty elements).
    pub end_tag_start: usize,
    /// Offset just past the element.
    pub end: usize,
    pub empty: bool,
}

impl ElementSpan {
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }
}

/// Extract local name from potentially namespaced XML name
pub fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Every element of the document, in start-tag order.
pub fn element_spans(xml: &str) -> Result<Vec<ElementSpan>> {
    let mut reader = Reader::from_str(xml);
    let mut spans: Vec<ElementSpan> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => {
                open.push(spans.len());
                spans.push(ElementSpan {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    depth: open.len() - 1,
                    start: before,
                    start_tag_end: after,
                    end_tag_start: after,
                    end: after,
                    empty: false,
                });
            }
            Event::Empty(e) => spans.push(ElementSpan {
                name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                depth: open.len(),
                start: before,
                start_tag_end: after,
                end_tag_start: after,
                end: after,
                empty: true,
            }),
            Event::End(_) => {
                if let Some(index) = open.pop() {
                    spans[index].end_tag_start = before;
                    spans[index].end = after;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !open.is_empty() {
        return Err(Error::InvalidTemplate("unclosed element in XML part".into()));
    }
    Ok(spans)
}

/// The root element's span.
pub fn root_span(spans: &[ElementSpan]) -> Result<&ElementSpan> {
    spans
        .iter()
        .find(|s| s.depth == 0)
        .ok_or_else(|| Error::InvalidTemplate("XML part has no root element".into()))
}

/// Direct children of `parent`.
pub fn children<'a>(
    spans: &'a [ElementSpan],
    parent: &'a ElementSpan,
) -> impl Iterator<Item = &'a ElementSpan> + 'a {
    spans.iter().filter(move |s| {
        s.depth == parent.depth + 1 && s.start >= parent.start_tag_end && s.end <= parent.end
    })
}

/// `xmlns:prefix` declarations on the root element.
pub fn root_namespaces(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let mut namespaces = Vec::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                        namespaces.push((
                            String::from_utf8(prefix.to_vec())?,
                            String::from_utf8(attr.value.to_vec())?,
                        ));
                    }
                }
                return Ok(namespaces);
            }
            Event::Eof => return Err(Error::InvalidTemplate("XML part has no root element".into())),
            _ => {}
        }
    }
}

/// Declare any of `required` that the root element lacks. Returns the
/// prefixes that were added. A prefix bound to a different URI is an error,
/// since our markup would then mean something else.
pub fn ensure_namespaces(xml: &mut String, required: &[(&str, &str)]) -> Result<Vec<String>> {
    let declared = root_namespaces(xml)?;
    let mut declarations = String::new();
    let mut added = Vec::new();
    for (prefix, uri) in required {
        match declared.iter().find(|(p, _)| p == prefix) {
            Some((_, existing)) if existing == uri => {}
            Some((_, existing)) => {
                return Err(Error::InvalidTemplate(format!(
                    "prefix {prefix} is bound to {existing}"
                )));
            }
            None => {
                declarations.push_str(&format!(r#" xmlns:{prefix}="{uri}""#));
                added.push(prefix.to_string());
            }
        }
    }
    if !declarations.is_empty() {
        let spans = element_spans(xml)?;
        let root = root_span(&spans)?;
        let close = if root.empty { 2 } else { 1 };
        let at = xml[..root.start_tag_end - close].trim_end().len();
        xml.insert_str(at, &declarations);
    }
    Ok(added)
}

/// Insert `content` into `element`, before offset `before` when given and
/// otherwise just ahead of the end tag. An empty element is expanded into a
/// start/end pair.
pub fn insert_child(xml: &mut String, element: &ElementSpan, before: Option<usize>, content: &str) {
    if element.empty {
        let open = xml[element.start..element.end - 2].trim_end().to_string();
        let expanded = format!("{open}>{content}</{}>", element.name);
        xml.replace_range(element.start..element.end, &expanded);
    } else {
        xml.insert_str(before.unwrap_or(element.end_tag_start), content);
    }
}

/// `(styleId, name)` of every style definition in a styles part.
pub fn style_names(xml: &str) -> Result<Vec<(String, Option<String>)>> {
    let mut reader = Reader::from_str(xml);
    let mut styles: Vec<(String, Option<String>)> = Vec::new();
    let mut in_style = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"style" => {
                styles.push((attribute(&e, b"styleId")?.unwrap_or_default(), None));
                in_style = true;
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"style" => {
                styles.push((attribute(&e, b"styleId")?.unwrap_or_default(), None));
            }
            Event::Empty(e) | Event::Start(e)
                if in_style && local_name(e.name().as_ref()) == b"name" =>
            {
                if let Some(last) = styles.last_mut()
                    && last.1.is_none()
                {
                    last.1 = attribute(&e, b"val")?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"style" => in_style = false,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(styles)
}

/// Raw value of an attribute, matched by local name.
pub fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if local_name(attr.key.as_ref()) == name {
            let raw = String::from_utf8(attr.value.to_vec())?;
            let value = quick_xml::escape::unescape(&raw)
                .map_err(|e| Error::InvalidTemplate(format!("bad attribute value: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hola</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906"/></w:sectPr></w:body></w:document>"#;

    #[test]
    fn test_spans() {
        let spans = element_spans(DOC).expect("should scan");
        let root = root_span(&spans).expect("root");
        assert_eq!(root.local_name(), "document");
        assert_eq!(root.prefix(), Some("w"));
        let body = children(&spans, root).next().expect("body");
        assert_eq!(body.name, "w:body");
        let kids: Vec<_> = children(&spans, body).map(|s| s.local_name()).collect();
        assert_eq!(kids, vec!["p", "sectPr"]);
        let sect = children(&spans, body).nth(1).expect("sectPr");
        assert!(DOC[sect.start..].starts_with("<w:sectPr>"));
        assert_eq!(&DOC[body.end_tag_start..body.end], "</w:body>");
        let pg = spans.iter().find(|s| s.local_name() == "pgSz").expect("pgSz");
        assert!(pg.empty);
        assert_eq!(&DOC[pg.start..pg.end], r#"<w:pgSz w:w="11906"/>"#);
    }

    #[test]
    fn test_ensure_namespaces() {
        let mut doc = DOC.to_string();
        let added = ensure_namespaces(&mut doc, &[("w", W_NS), ("r", R_NS), ("m", M_NS)])
            .expect("should add");
        assert_eq!(added, vec!["r", "m"]);
        let namespaces = root_namespaces(&doc).expect("should parse");
        assert_eq!(namespaces.len(), 3);
        assert!(doc.contains(&format!(r#"xmlns:m="{M_NS}">"#)));
        assert!(ensure_namespaces(&mut doc, &[("m", M_NS)]).expect("idempotent").is_empty());
    }

    #[test]
    fn test_conflicting_prefix() {
        let mut doc = r#"<w:document xmlns:w="urn:other"/>"#.to_string();
        assert!(ensure_namespaces(&mut doc, &[("w", W_NS)]).is_err());
    }

    #[test]
    fn test_empty_root_gets_namespaces() {
        let mut doc = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" />"#.to_string();
        ensure_namespaces(&mut doc, &[("m", M_NS)]).expect("should add");
        assert!(doc.ends_with(&format!(r#"xmlns:m="{M_NS}" />"#)));
        assert_eq!(root_namespaces(&doc).expect("parse").len(), 2);
    }

    #[test]
    fn test_insert_child() {
        let mut doc = DOC.to_string();
        let spans = element_spans(&doc).expect("scan");
        let body = spans.iter().find(|s| s.local_name() == "body").expect("body");
        let sect = spans.iter().find(|s| s.local_name() == "sectPr").expect("sectPr");
        insert_child(&mut doc, body, Some(sect.start), "<w:p/>");
        assert!(doc.contains("</w:p><w:p/><w:sectPr>"));

        let mut empty = "<w:body />".to_string();
        let spans = element_spans(&empty).expect("scan");
        insert_child(&mut empty, &spans[0], None, "<w:p/>");
        assert_eq!(empty, "<w:body><w:p/></w:body>");
    }

    #[test]
    fn test_style_names() {
        let xml = r#"<w:styles xmlns:w="urn:w"><w:style w:type="paragraph" w:styleId="Ttulo1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style><w:style w:styleId="Empty"/><w:style w:styleId="NoName"><w:rPr/></w:style></w:styles>"#;
        let styles = style_names(xml).expect("should parse");
        assert_eq!(
            styles,
            vec![
                ("Ttulo1".to_string(), Some("heading 1".to_string())),
                ("Empty".to_string(), None),
                ("NoName".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(element_spans("<a><b></a>").is_err());
        assert!(element_spans("<a><b>").is_err());
    }
}

//! Small text helpers shared by the renderer and the package writer.

/// Longest file stem produced by [`sanitize_file_name`], in characters.
pub const MAX_FILE_STEM: usize = 100;

/// Stem used when a title sanitizes to nothing.
const FALLBACK_STEM: &str = "documento";

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Collapse every whitespace run to a single space.
///
/// Leading and trailing whitespace survive as one space each, so adjacent
/// inline fragments keep their word boundaries.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Derive a `.docx` file name from a project title.
///
/// Characters that are invalid on common filesystems become `_`, runs of
/// separators collapse, and the stem is cut to [`MAX_FILE_STEM`] characters.
///
/// ```
/// use memoria::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Reforma: C/ Mayor 3"), "Reforma_ C_ Mayor 3.docx");
/// assert_eq!(sanitize_file_name("  ???  "), "documento.docx");
/// ```
pub fn sanitize_file_name(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if is_invalid_file_char(c) { '_' } else { c };
        let c = if c.is_whitespace() { ' ' } else { c };
        if (c == '_' || c == ' ') && stem.ends_with(c) {
            continue;
        }
        stem.push(c);
    }

    let trimmed = trim_stem(&stem);
    let truncated: String = trimmed.chars().take(MAX_FILE_STEM).collect();
    let stem = trim_stem(&truncated);
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{stem}.docx")
}

fn is_invalid_file_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

fn trim_stem(stem: &str) -> &str {
    stem.trim_matches(|c: char| c == '_' || c == '.' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  uno\n\t dos  "), " uno dos ");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }

    #[test]
    fn test_sanitize_replaces_and_collapses() {
        assert_eq!(
            sanitize_file_name("Memoria <<final>>  v2"),
            "Memoria _final_ v2.docx"
        );
        assert_eq!(sanitize_file_name("a//b\\\\c"), "a_b_c.docx");
        assert_eq!(sanitize_file_name("..oculto.."), "oculto.docx");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(250);
        let name = sanitize_file_name(&long);
        assert_eq!(name.len(), MAX_FILE_STEM + ".docx".len());
    }

    #[test]
    fn test_sanitize_empty_title() {
        assert_eq!(sanitize_file_name(""), "documento.docx");
        assert_eq!(sanitize_file_name("***"), "documento.docx");
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_are_safe(title in ".{0,300}") {
            let name = sanitize_file_name(&title);
            let stem = name.strip_suffix(".docx").expect("always has the extension");
            prop_assert!(!stem.is_empty());
            prop_assert!(stem.chars().count() <= MAX_FILE_STEM);
            prop_assert!(!stem.chars().any(is_invalid_file_char));
            prop_assert!(!stem.contains("__"));
            prop_assert!(!stem.contains("  "));
        }
    }
}

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use std::borrow::Cow;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

const XML_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

/// Escape XML special characters.
///
/// Used both for text spliced into `<w:t>` content and for attribute values
/// of generated markup.
///
/// # Examples
///
/// ```
/// use docxtpl::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hi\"</tag>"), "&lt;tag&gt;&quot;hi&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &XML_ENTITIES)
}

/// Escape XML special characters, borrowing when nothing needs escaping.
///
/// Most substituted values are plain words, so the scan for the three
/// common specials runs first and the automaton only when it hits.
#[inline]
pub fn escape_xml_cow(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let needs = memchr::memchr3(b'&', b'<', b'>', bytes).is_some()
        || memchr::memchr2(b'"', b'\'', bytes).is_some();
    if needs {
        Cow::Owned(escape_xml(s))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_entities() {
        assert_eq!(escape_xml(r#"<a & "b" 'c'>"#), "&lt;a &amp; &quot;b&quot; &apos;c&apos;&gt;");
    }

    #[test]
    fn test_cow_borrows_plain_text() {
        assert!(matches!(escape_xml_cow("Amy"), Cow::Borrowed("Amy")));
        assert_eq!(escape_xml_cow("R&D"), "R&amp;D");
    }
}

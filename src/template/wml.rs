//! Byte-level lookups over WordprocessingML part text.
//!
//! The engine treats part XML as text, so these helpers only need to tell
//! element names apart (`<w:t>` versus `<w:tbl>`, `<w:tc>`, `<w:tab/>`).

use memchr::memmem;
use std::ops::Range;

const TEXT_OPEN: &[u8] = b"<w:t";
const TEXT_CLOSE: &[u8] = b"</w:t>";
const ROW_NAME: &[u8] = b"w:tr";

/// Whether the element name ending at `at` is complete: followed by `>`,
/// `/` or whitespace.
#[inline]
fn name_ends_at(bytes: &[u8], at: usize) -> bool {
    matches!(bytes.get(at), Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n'))
}

/// A `<w:t>` element with content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    /// Range of the opening tag, `<w:t ...>`
    pub open: Range<usize>,
    /// Range of the character content
    pub content: Range<usize>,
}

impl TextElement {
    /// Whether the opening tag already declares `xml:space`.
    pub fn has_space_attr(&self, xml: &str) -> bool {
        memmem::find(&xml.as_bytes()[self.open.clone()], b"xml:space").is_some()
    }
}

/// All non-empty-tag `<w:t>` elements in document order.
///
/// Self-closing `<w:t/>` elements carry no text and are skipped. Scanning
/// stops at an opening tag without a matching close.
pub fn text_elements(xml: &str) -> Vec<TextElement> {
    let bytes = xml.as_bytes();
    let mut elements = Vec::new();
    let mut pos = 0;

    while let Some(offset) = memmem::find(&bytes[pos..], TEXT_OPEN) {
        let start = pos + offset;
        let name_end = start + TEXT_OPEN.len();
        if !name_ends_at(bytes, name_end) {
            pos = name_end;
            continue;
        }
        let Some(gt) = memchr::memchr(b'>', &bytes[name_end..]).map(|i| name_end + i) else {
            break;
        };
        if bytes[gt - 1] == b'/' {
            pos = gt + 1;
            continue;
        }
        let content_start = gt + 1;
        let Some(close) = memmem::find(&bytes[content_start..], TEXT_CLOSE) else {
            break;
        };
        let content_end = content_start + close;
        elements.push(TextElement {
            open: start..content_start,
            content: content_start..content_end,
        });
        pos = content_end + TEXT_CLOSE.len();
    }

    elements
}

/// A row tag found by its `w:tr` name.
enum RowTag {
    /// Start of `<w:tr ...>`
    Open(usize),
    /// End (exclusive) of `</w:tr>`
    Close(usize),
}

/// Classify the `w:tr` name at `at`. Lookalikes such as `<w:trPr>` and
/// self-closing rows give `None`.
fn row_tag_at(bytes: &[u8], at: usize) -> Option<RowTag> {
    if !name_ends_at(bytes, at + ROW_NAME.len()) {
        return None;
    }
    let gt = at + memchr::memchr(b'>', &bytes[at..])?;
    match (at.checked_sub(2).map(|i| bytes[i]), at.checked_sub(1).map(|i| bytes[i])) {
        (Some(b'<'), Some(b'/')) => Some(RowTag::Close(gt + 1)),
        (_, Some(b'<')) if bytes[gt - 1] != b'/' => Some(RowTag::Open(at - 1)),
        _ => None,
    }
}

/// Start of the `<w:tr>` enclosing `pos`. Rows closed before `pos`, such as
/// those of a table nested earlier in the same cell, are skipped.
pub fn row_start_before(xml: &str, pos: usize) -> Option<usize> {
    let bytes = xml.as_bytes();
    let mut depth = 0usize;
    for at in memmem::rfind_iter(&bytes[..pos], ROW_NAME) {
        match row_tag_at(bytes, at) {
            Some(RowTag::Close(_)) => depth += 1,
            Some(RowTag::Open(start)) if depth == 0 => return Some(start),
            Some(RowTag::Open(_)) => depth -= 1,
            None => {},
        }
    }
    None
}

/// End (exclusive) of the `</w:tr>` closing the row that encloses `pos`.
pub fn row_end_after(xml: &str, pos: usize) -> Option<usize> {
    let bytes = xml.as_bytes();
    let mut depth = 0usize;
    for at in memmem::find_iter(&bytes[pos..], ROW_NAME).map(|i| pos + i) {
        match row_tag_at(bytes, at) {
            Some(RowTag::Open(_)) => depth += 1,
            Some(RowTag::Close(end)) if depth == 0 => return Some(end),
            Some(RowTag::Close(_)) => depth -= 1,
            None => {},
        }
    }
    None
}

/// Whether `pos` falls inside the content of a `<w:t>` element.
pub fn inside_text_element(xml: &str, pos: usize) -> bool {
    let bytes = &xml.as_bytes()[..pos];
    let last_open = memmem::rfind_iter(bytes, TEXT_OPEN)
        .find(|&start| name_ends_at(xml.as_bytes(), start + TEXT_OPEN.len()));
    let Some(open) = last_open else {
        return false;
    };
    // A self-closing `<w:t/>` holds no content
    let Some(gt) = memchr::memchr(b'>', &bytes[open..]).map(|i| open + i) else {
        return false;
    };
    if bytes[gt - 1] == b'/' {
        return false;
    }
    match memmem::rfind(bytes, TEXT_CLOSE) {
        Some(close) => close < open,
        None => true,
    }
}

/// Largest numeric `id` among `<wp:docPr>` elements, or 0.
pub fn max_doc_pr_id(xml: &str) -> u32 {
    let bytes = xml.as_bytes();
    let mut max = 0;
    for start in memmem::find_iter(bytes, b"<wp:docPr") {
        let Some(end) = memchr::memchr(b'>', &bytes[start..]).map(|i| start + i) else {
            break;
        };
        let tag = &bytes[start..end];
        let Some(attr) = memmem::find(tag, b" id=\"") else {
            continue;
        };
        let value = &tag[attr + 5..];
        let len = value.iter().take_while(|b| b.is_ascii_digit()).count();
        if let Ok(id) = atoi_simd::parse::<u32, false, false>(&value[..len]) {
            max = max.max(id);
        }
    }
    max
}

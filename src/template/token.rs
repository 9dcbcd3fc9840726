//! Placeholder scanning.
//!
//! A brace span is `{`, then 1 to `max_len` characters that are neither `{`
//! nor `}`, then `}`. Spans never overlap and are found left to right. The
//! normalizer works on raw spans; the expansion passes classify them into
//! [`TagKind`]s and treat anything unclassified as literal text.

use memchr::{memchr, memchr2};
use std::ops::Range;

/// A classified placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind<'a> {
    /// `{name}`
    Simple(&'a str),
    /// `{#name}`
    LoopOpen(&'a str),
    /// `{?name}`
    CondOpen(&'a str),
    /// `{/name}`, closes either a loop or a conditional
    Close(&'a str),
    /// `{:else}`
    Else,
    /// `{table:name}`
    Table(&'a str),
}

/// A classified placeholder and its byte range, braces included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub kind: TagKind<'a>,
    pub start: usize,
    pub end: usize,
}

/// Identifier: one or more ASCII letters, digits or underscores.
#[inline]
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[inline]
fn ident(s: &str) -> Option<&str> {
    is_identifier(s).then_some(s)
}

/// Classify the text between the braces.
pub fn classify(inner: &str) -> Option<TagKind<'_>> {
    match inner.as_bytes().first()? {
        b'#' => ident(&inner[1..]).map(TagKind::LoopOpen),
        b'?' => ident(&inner[1..]).map(TagKind::CondOpen),
        b'/' => ident(&inner[1..]).map(TagKind::Close),
        b':' => (inner == ":else").then_some(TagKind::Else),
        _ => {
            if let Some(name) = inner.strip_prefix("table:") {
                ident(name).map(TagKind::Table)
            } else {
                ident(inner).map(TagKind::Simple)
            }
        },
    }
}

/// Iterator over raw brace spans.
#[derive(Debug, Clone)]
pub struct BraceSpans<'a> {
    bytes: &'a [u8],
    pos: usize,
    max_len: usize,
}

impl<'a> BraceSpans<'a> {
    pub fn new(text: &'a str, max_len: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            max_len: max_len.max(1),
        }
    }

    /// Continue scanning from `pos`.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }
}

impl Iterator for BraceSpans<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        loop {
            let rest = self.bytes.get(self.pos..)?;
            let open = self.pos + memchr(b'{', rest)?;
            let body_start = open + 1;
            // One extra byte so a closing brace right at the bound is still seen
            let limit = (body_start + self.max_len + 1).min(self.bytes.len());

            match memchr2(b'{', b'}', &self.bytes[body_start..limit]) {
                Some(offset) => {
                    let at = body_start + offset;
                    if self.bytes[at] == b'{' {
                        self.pos = at;
                    } else if at == body_start {
                        // `{}`
                        self.pos = at + 1;
                    } else {
                        self.pos = at + 1;
                        return Some(open..at + 1);
                    }
                },
                None if limit == self.bytes.len() => {
                    self.pos = self.bytes.len();
                    return None;
                },
                None => self.pos = body_start,
            }
        }
    }
}

/// Iterator over classified placeholders; unrecognized spans are skipped.
#[derive(Debug, Clone)]
pub struct TagScanner<'a> {
    text: &'a str,
    spans: BraceSpans<'a>,
}

impl<'a> TagScanner<'a> {
    pub fn new(text: &'a str, max_len: usize) -> Self {
        Self {
            text,
            spans: BraceSpans::new(text, max_len),
        }
    }

    /// Start scanning at `pos`.
    pub fn starting_at(text: &'a str, pos: usize, max_len: usize) -> Self {
        let mut scanner = Self::new(text, max_len);
        scanner.seek(pos);
        scanner
    }

    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.spans.seek(pos);
    }
}

impl<'a> Iterator for TagScanner<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Tag<'a>> {
        for span in self.spans.by_ref() {
            // Braces are ASCII, so both ends are char boundaries
            let inner = &self.text[span.start + 1..span.end - 1];
            if let Some(kind) = classify(inner) {
                return Some(Tag {
                    kind,
                    start: span.start,
                    end: span.end,
                });
            }
        }
        None
    }
}

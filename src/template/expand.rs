//! Placeholder resolution.
//!
//! Expansion runs four passes over the part text, each on the output of the
//! previous one: loops, conditionals, table rows, then simple placeholders.
//! Substituted values are never scanned again, so data containing braces is
//! emitted as-is.

use super::options::TemplateOptions;
use super::token::{Tag, TagKind, TagScanner};
use super::value::{DataTree, ImageDescriptor, Value};
use super::wml;
use crate::common::xml::escape_xml_cow;
use serde::Serialize;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::ops::AddAssign;

/// Private-use delimiters around image markers.
const MARKER_OPEN: char = '\u{E000}';
const MARKER_CLOSE: char = '\u{E001}';

/// Category of a non-fatal expansion problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Data was missing or had the wrong shape
    DataMismatch,
    /// Template markup could not be interpreted as intended
    LayoutAmbiguity,
}

/// A non-fatal problem met during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    fn data(message: String) -> Self {
        Self {
            kind: WarningKind::DataMismatch,
            message,
        }
    }

    fn layout(message: String) -> Self {
        Self {
            kind: WarningKind::LayoutAmbiguity,
            message,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Counts of constructs that produced output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    pub placeholders: usize,
    pub loops: usize,
    pub conditionals: usize,
    pub tables: usize,
    pub images: usize,
}

impl AddAssign for ExpansionStats {
    fn add_assign(&mut self, other: Self) {
        self.placeholders += other.placeholders;
        self.loops += other.loops;
        self.conditionals += other.conditionals;
        self.tables += other.tables;
        self.images += other.images;
    }
}

/// An image value waiting to be embedded at `marker`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement<'d> {
    pub marker: String,
    pub key: &'d str,
    pub image: &'d ImageDescriptor,
}

/// Result of expanding one part.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion<'d> {
    pub text: String,
    pub warnings: Vec<Warning>,
    pub stats: ExpansionStats,
    pub images: Vec<ImagePlacement<'d>>,
}

pub(crate) struct Expander<'d, 'o> {
    data: &'d DataTree,
    options: &'o TemplateOptions,
    max_len: usize,
    warnings: Vec<Warning>,
    stats: ExpansionStats,
    images: Vec<ImagePlacement<'d>>,
}

impl<'d, 'o> Expander<'d, 'o> {
    pub(crate) fn new(data: &'d DataTree, options: &'o TemplateOptions) -> Self {
        Self {
            data,
            options,
            max_len: options.effective_token_len(),
            warnings: Vec::new(),
            stats: ExpansionStats::default(),
            images: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, text: &str) -> Expansion<'d> {
        let text = self.expand_loops(text);
        log::debug!("loop pass: {} loop(s) expanded", self.stats.loops);
        let text = self.expand_conditionals(&text);
        log::debug!("conditional pass: {} conditional(s) resolved", self.stats.conditionals);
        let text = self.expand_tables(text);
        log::debug!("table pass: {} table(s) expanded", self.stats.tables);
        let text = self.expand_placeholders(&text);
        log::debug!(
            "placeholder pass: {} placeholder(s), {} image(s)",
            self.stats.placeholders,
            self.stats.images
        );

        for warning in &self.warnings {
            log::warn!("{}", warning);
        }

        Expansion {
            text,
            warnings: self.warnings,
            stats: self.stats,
            images: self.images,
        }
    }

    fn scan<'t>(&self, text: &'t str, from: usize) -> TagScanner<'t> {
        TagScanner::starting_at(text, from, self.max_len)
    }

    /// Nearest `{/name}` at or after `from`.
    fn find_close<'t>(&self, text: &'t str, from: usize, name: &str) -> Option<Tag<'t>> {
        self.scan(text, from)
            .find(|tag| tag.kind == TagKind::Close(name))
    }

    fn render_scalar<'v>(&self, value: &'v Value) -> Option<Cow<'v, str>> {
        let text = value.to_text()?;
        if !self.options.escape_values {
            return Some(text);
        }
        Some(match text {
            Cow::Borrowed(s) => escape_xml_cow(s),
            Cow::Owned(s) => Cow::Owned(escape_xml_cow(&s).into_owned()),
        })
    }

    /// Substitute item fields into a loop body or row.
    ///
    /// Only simple placeholders are fields. Table markers are dropped from
    /// rows; every other tag stays as literal text.
    fn substitute_fields(&mut self, template: &str, item: &Value, owner: &str, row: bool) -> String {
        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;
        for tag in self.scan(template, 0) {
            let replacement = match tag.kind {
                TagKind::Simple(field) => match item.field(field) {
                    Some(value) => match self.render_scalar(value) {
                        Some(text) => text,
                        None => {
                            self.warnings.push(Warning::data(format!(
                                "`{}`: field `{}` is a {}, not text",
                                owner,
                                field,
                                value.type_name()
                            )));
                            Cow::Borrowed("")
                        },
                    },
                    None => Cow::Borrowed(""),
                },
                TagKind::Table(_) if row => Cow::Borrowed(""),
                _ => continue,
            };
            out.push_str(&template[cursor..tag.start]);
            out.push_str(&replacement);
            cursor = tag.end;
        }
        out.push_str(&template[cursor..]);
        out
    }

    /// The list bound to `name`, with a warning when it is missing, empty or
    /// not a list.
    fn list_for(&mut self, name: &str, construct: &str) -> Option<&'d [Value]> {
        match self.data.get(name) {
            None | Some(Value::Null) => {
                self.warnings.push(Warning::data(format!(
                    "{} `{}`: no data, block removed",
                    construct, name
                )));
                None
            },
            Some(Value::List(items)) if items.is_empty() => {
                self.warnings.push(Warning::data(format!(
                    "{} `{}`: empty list, block removed",
                    construct, name
                )));
                None
            },
            Some(Value::List(items)) => Some(items),
            Some(other) => {
                self.warnings.push(Warning::data(format!(
                    "{} `{}`: expected a list, found a {}",
                    construct,
                    name,
                    other.type_name()
                )));
                None
            },
        }
    }

    fn expand_loops(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut tags = self.scan(text, 0);

        while let Some(open) = tags.next() {
            let TagKind::LoopOpen(name) = open.kind else {
                continue;
            };
            let Some(close) = self.find_close(text, open.end, name) else {
                self.warnings.push(Warning::layout(format!(
                    "loop `{}` has no closing tag, left as text",
                    name
                )));
                continue;
            };

            out.push_str(&text[cursor..open.start]);
            let body = &text[open.end..close.start];
            if let Some(items) = self.list_for(name, "loop") {
                self.stats.loops += 1;
                for item in items.iter().filter(|item| !item.is_null()) {
                    let rendered = self.substitute_fields(body, item, name, false);
                    out.push_str(&rendered);
                }
            }
            cursor = close.end;
            tags.seek(close.end);
        }

        out.push_str(&text[cursor..]);
        out
    }

    fn expand_conditionals(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut tags = self.scan(text, 0);

        while let Some(open) = tags.next() {
            let TagKind::CondOpen(name) = open.kind else {
                continue;
            };
            let Some((else_tag, close)) = self.find_branches(text, open.end, name) else {
                self.warnings.push(Warning::layout(format!(
                    "conditional `{}` has no closing tag, left as text",
                    name
                )));
                continue;
            };

            let truthy = self.data.get(name).is_some_and(Value::is_truthy);
            self.stats.conditionals += 1;
            let branch = match (truthy, else_tag) {
                (true, Some(else_tag)) => &text[open.end..else_tag.start],
                (true, None) => &text[open.end..close.start],
                (false, Some(else_tag)) => &text[else_tag.end..close.start],
                (false, None) => "",
            };

            out.push_str(&text[cursor..open.start]);
            let rendered = self.expand_conditionals(branch);
            out.push_str(&rendered);
            cursor = close.end;
            tags.seek(close.end);
        }

        out.push_str(&text[cursor..]);
        out
    }

    /// Locate the `{:else}` and `{/name}` of a conditional opened before
    /// `from`. An `{:else}` inside a nested conditional belongs to that one.
    fn find_branches<'t>(
        &self,
        text: &'t str,
        from: usize,
        name: &str,
    ) -> Option<(Option<Tag<'t>>, Tag<'t>)> {
        let mut nested: SmallVec<[&str; 4]> = SmallVec::new();
        let mut else_tag = None;
        for tag in self.scan(text, from) {
            match tag.kind {
                TagKind::Close(n) if n == name => return Some((else_tag, tag)),
                TagKind::Close(n) if nested.last() == Some(&n) => {
                    nested.pop();
                },
                TagKind::CondOpen(n) => nested.push(n),
                TagKind::Else if nested.is_empty() && else_tag.is_none() => else_tag = Some(tag),
                _ => {},
            }
        }
        None
    }

    fn expand_tables(&mut self, mut text: String) -> String {
        let mut pos = 0;
        loop {
            let Some((name, marker_start, marker_end)) = self
                .scan(&text, pos)
                .find_map(|tag| match tag.kind {
                    TagKind::Table(name) => Some((name.to_string(), tag.start, tag.end)),
                    _ => None,
                })
            else {
                break;
            };

            let bounds = wml::row_start_before(&text, marker_start)
                .zip(wml::row_end_after(&text, marker_end));
            let Some((row_start, row_end)) = bounds else {
                self.warnings.push(Warning::layout(format!(
                    "table marker `{}` is not inside a table row, removed",
                    name
                )));
                text.replace_range(marker_start..marker_end, "");
                pos = marker_start;
                continue;
            };

            let row = text[row_start..row_end].to_string();
            let mut rendered = String::new();
            if let Some(items) = self.list_for(&name, "table") {
                self.stats.tables += 1;
                for item in items.iter().filter(|item| !item.is_null()) {
                    rendered.push_str(&self.substitute_fields(&row, item, &name, true));
                }
            }
            text.replace_range(row_start..row_end, &rendered);
            pos = row_start + rendered.len();
        }
        text
    }

    fn expand_placeholders(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for tag in self.scan(text, 0) {
            let TagKind::Simple(name) = tag.kind else {
                continue;
            };
            out.push_str(&text[cursor..tag.start]);
            cursor = tag.end;

            let Some((key, value)) = self.data.get_key_value(name) else {
                log::debug!("placeholder `{}` has no data", name);
                continue;
            };
            match value {
                Value::Image(image) => {
                    if let Some(rejected) = image.rejected_extension() {
                        self.warnings.push(Warning::data(format!(
                            "image `{}`: extension `{}` is not usable, `{}` used instead",
                            name,
                            rejected,
                            image.extension()
                        )));
                    }
                    let marker = format!("{}IMG{}{}", MARKER_OPEN, self.images.len(), MARKER_CLOSE);
                    out.push_str(&marker);
                    self.images.push(ImagePlacement { marker, key, image });
                    self.stats.images += 1;
                },
                other => match self.render_scalar(other) {
                    Some(rendered) => {
                        out.push_str(&rendered);
                        self.stats.placeholders += 1;
                    },
                    None if other.is_null() => {},
                    None => self.warnings.push(Warning::data(format!(
                        "placeholder `{}` is a {}, not text",
                        name,
                        other.type_name()
                    ))),
                },
            }
        }

        out.push_str(&text[cursor..]);
        out
    }
}

//! The data tree a template is expanded against.
//!
//! A [`DataTree`] maps keys to [`Value`]s. Lookups are exact and
//! case-sensitive; an unknown key is simply absent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::collections::HashMap;

/// A raster image to embed in place of a placeholder.
///
/// The extension names the media part and its content type; the image size is
/// always read from the bytes themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    buffer: Vec<u8>,
    extension: String,
    rejected_extension: Option<String>,
    width_inches: Option<f64>,
    height_inches: Option<f64>,
}

impl ImageDescriptor {
    /// Create a descriptor. Returns `None` for an empty buffer.
    ///
    /// The extension is stored lowercase without a leading dot. It must be
    /// ASCII alphanumeric; an empty or unusable extension is replaced by the
    /// sniffed format's, or `png`.
    pub fn new(buffer: Vec<u8>, extension: &str) -> Option<Self> {
        if buffer.is_empty() {
            return None;
        }
        let requested = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        let usable = !requested.is_empty() && requested.bytes().all(|b| b.is_ascii_alphanumeric());
        let fallback = || {
            crate::images::sniff_format(&buffer)
                .map_or("png", |format| format.extension())
                .to_string()
        };
        let (extension, rejected_extension) = match (usable, requested.is_empty()) {
            (true, _) => (requested, None),
            (false, true) => (fallback(), None),
            (false, false) => (fallback(), Some(requested)),
        };
        Some(Self {
            buffer,
            extension,
            rejected_extension,
            width_inches: None,
            height_inches: None,
        })
    }

    /// Request an explicit width in inches.
    pub fn with_width_inches(mut self, inches: f64) -> Self {
        self.width_inches = Some(inches);
        self
    }

    /// Request an explicit height in inches.
    pub fn with_height_inches(mut self, inches: f64) -> Self {
        self.height_inches = Some(inches);
        self
    }

    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The caller's extension when it was unusable and got replaced.
    #[inline]
    pub fn rejected_extension(&self) -> Option<&str> {
        self.rejected_extension.as_deref()
    }

    #[inline]
    pub fn width_inches(&self) -> Option<f64> {
        self.width_inches
    }

    #[inline]
    pub fn height_inches(&self) -> Option<f64> {
        self.height_inches
    }

    /// Decode the JSON shape `{ "buffer": "<base64>", "extension": "png", "widthInches"?: n, "heightInches"?: n }`.
    fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let buffer = object.get("buffer")?.as_str()?;
        let extension = object.get("extension")?.as_str()?;
        let bytes = BASE64.decode(buffer.trim()).ok()?;

        let mut image = Self::new(bytes, extension)?;
        image.width_inches = object.get("widthInches").and_then(serde_json::Value::as_f64);
        image.height_inches = object.get("heightInches").and_then(serde_json::Value::as_f64);
        Some(image)
    }
}

/// A value in the data tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Ordered items; `Map` items provide fields, `Null` items are skipped.
    List(Vec<Value>),
    Map(DataTree),
    Image(ImageDescriptor),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Conditional truthiness.
    ///
    /// Falsy: `null`, `false`, `0`, `NaN`, `""`, `"false"`, `"0"`, `[]`.
    /// Everything else is truthy, including maps and images.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !matches!(s.as_str(), "" | "false" | "0"),
            Value::List(items) => !items.is_empty(),
            Value::Map(_) | Value::Image(_) => true,
        }
    }

    /// Text rendering of a scalar: strings verbatim, numbers and booleans in
    /// canonical form. `None` for everything else.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Bool(false) => Some(Cow::Borrowed("false")),
            _ => None,
        }
    }

    /// Field of a list item. Only `Map` items have fields.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(name),
            _ => None,
        }
    }

    /// Short type label used in warnings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Image(_) => "image",
        }
    }
}

/// Canonical number text: integral values without a fraction, others in
/// shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        // -0.0 prints as 0
        return buf.format(n as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format_finite(n).to_string()
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            },
            serde_json::Value::Object(object) => match ImageDescriptor::from_json_object(&object) {
                Some(image) => Value::Image(image),
                None => Value::Map(DataTree::from_json_object(object)),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DataTree> for Value {
    fn from(map: DataTree) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<DataTree>> for Value {
    fn from(items: Vec<DataTree>) -> Self {
        Value::List(items.into_iter().map(Value::Map).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ImageDescriptor> for Value {
    fn from(image: ImageDescriptor) -> Self {
        Value::Image(image)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Key/value data a template is expanded against.
///
/// # Examples
///
/// ```
/// use docxtpl::template::{DataTree, Value};
///
/// let data = DataTree::new()
///     .with("name", "Amy")
///     .with("tasks", vec![DataTree::new().with("title", "A")]);
/// assert_eq!(data.get("name"), Some(&Value::from("Amy")));
/// assert!(data.get("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTree {
    entries: HashMap<String, Value>,
}

impl DataTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Like [`get`](Self::get), also returning the stored key.
    #[inline]
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &Value)> {
        self.entries.get_key_value(key).map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a tree from JSON. Anything but a JSON object gives an empty tree.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(object) => Self::from_json_object(object),
            _ => Self::new(),
        }
    }

    /// Parse a JSON document into a tree.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            entries: object.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for DataTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

//! The `[Content_Types].xml` part.
//!
//! Maps parts to content types through `Default` (by extension) and
//! `Override` (by partname) entries. Parsing and serialization both keep the
//! original entry order.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Content type map for looking up content types by part name or extension.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeMap {
    /// (extension, content type), extensions stored lowercase
    defaults: Vec<(String, String)>,

    /// (partname, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypeMap {
    /// Create a new empty content type map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse content types from [Content_Types].xml.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::new();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let kind = match e.local_name().as_ref() {
                        b"Default" => Some((&b"Extension"[..], true)),
                        b"Override" => Some((&b"PartName"[..], false)),
                        _ => None,
                    };

                    if let Some((key_attr, is_default)) = kind {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == key_attr {
                                key = Some(attr.unescape_value()?.to_string());
                            } else if attr.key.as_ref() == b"ContentType" {
                                content_type = Some(attr.unescape_value()?.to_string());
                            }
                        }

                        if let (Some(key), Some(ct)) = (key, content_type) {
                            if is_default {
                                map.add_default(&key, &ct);
                            } else {
                                map.add_override(&key, &ct);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Whether a `Default` entry exists for `ext` (case-insensitive).
    pub fn has_default(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.defaults.iter().any(|(e, _)| *e == ext)
    }

    /// Add a default content type for an extension, replacing an existing one.
    pub fn add_default(&mut self, ext: &str, content_type: &str) {
        let ext = ext.to_ascii_lowercase();
        match self.defaults.iter_mut().find(|(e, _)| *e == ext) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.defaults.push((ext, content_type.to_string())),
        }
    }

    /// Add an override for a specific partname, replacing an existing one.
    pub fn add_override(&mut self, partname: &str, content_type: &str) {
        match self.overrides.iter_mut().find(|(p, _)| p == partname) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((partname.to_string(), content_type.to_string())),
        }
    }

    /// Content type declared for exactly this partname, ignoring defaults.
    pub fn override_for(&self, pack_uri: &PackURI) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(p, _)| p == pack_uri.as_str())
            .map(|(_, ct)| ct.as_str())
    }

    /// Content type for a partname: override first, then extension default.
    pub fn get(&self, pack_uri: &PackURI) -> Option<&str> {
        if let Some(ct) = self.override_for(pack_uri) {
            return Some(ct);
        }
        let ext = pack_uri.ext().to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Generate the XML for [Content_Types].xml.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + (self.defaults.len() + self.overrides.len()) * 128);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");

        xml
    }
}

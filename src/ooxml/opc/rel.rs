use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
/// Relationship-related objects for OPC packages.
///
/// A `.rels` part lists the relationships from one source (a part, or the
/// package itself) to its targets. The template engine reads them to find the
/// main document and its headers/footers, and appends to them when it embeds
/// images.
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::RelationshipNotFound(format!(
                "{} is external, it has no target part",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source.
///
/// Keeps document order so that a part rewritten without new relationships
/// serializes the way it was read.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: Vec::new(),
        }
    }

    /// Parse a `.rels` part.
    ///
    /// `base_uri` is the directory of the source part, used to resolve targets.
    pub fn from_xml(rels_xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut rels = Self::new(base_uri.to_string());
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut r_id = None;
                        let mut reltype = None;
                        let mut target_ref = None;
                        let mut is_external = false;

                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                                b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                                b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                                b"TargetMode" => {
                                    is_external =
                                        attr.unescape_value()?.as_ref() == target_mode::EXTERNAL
                                },
                                _ => {},
                            }
                        }

                        if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                            rels.add_relationship(rt, tr, id, is_external);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Add a relationship to the collection.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(r_id, reltype, target_ref, self.base_uri.clone(), is_external);
        self.rels.push(rel);
        &self.rels[self.rels.len() - 1]
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id() == r_id)
    }

    /// Get the single relationship of a specific type.
    ///
    /// Returns an error if none exists or several do.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype() == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::RelationshipNotFound(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    /// All relationships of a type, in document order.
    pub fn with_reltype<'a>(&'a self, reltype: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.rels.iter().filter(move |rel| rel.reltype() == reltype)
    }

    /// Highest numeric suffix among "rIdN" identifiers, 0 if there are none.
    ///
    /// Identifiers that do not follow the "rIdN" convention are ignored; they
    /// cannot collide with generated ones.
    pub fn max_r_id_number(&self) -> u32 {
        self.rels
            .iter()
            .filter_map(|rel| rel.r_id().strip_prefix("rId"))
            .filter_map(|digits| atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok())
            .max()
            .unwrap_or(0)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize relationships to `.rels` XML, in collection order.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);

        for rel in &self.rels {
            let target_mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");

        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

/// Hands out fresh relationship IDs for one source part.
///
/// Seeded above every "rIdN" already present, and strictly increasing from
/// there. Owned by a single render call and threaded through the embedding
/// pass; there is no shared counter.
#[derive(Debug, Clone)]
pub struct RelIdAllocator {
    next: u64,
}

impl RelIdAllocator {
    /// Start above the highest identifier in `rels`.
    pub fn seeded_above(rels: &Relationships) -> Self {
        Self {
            next: u64::from(rels.max_r_id_number()) + 1,
        }
    }

    /// Allocate the next identifier.
    pub fn next_id(&mut self) -> String {
        let mut buf = itoa::Buffer::new();
        let id = format!("rId{}", buf.format(self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;

    const DOC_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
    <Relationship Id="custom" Type="urn:x" Target="x.xml"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        assert_eq!(rels.len(), 4);

        let header = rels.part_with_reltype(rt::HEADER).unwrap();
        assert_eq!(header.target_partname().unwrap().as_str(), "/word/header1.xml");

        let link = rels.get("rId9").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_allocator_seeded_above_existing() {
        let rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        assert_eq!(rels.max_r_id_number(), 9);

        let mut alloc = RelIdAllocator::seeded_above(&rels);
        assert_eq!(alloc.next_id(), "rId10");
        assert_eq!(alloc.next_id(), "rId11");

        let mut fresh = RelIdAllocator::seeded_above(&Relationships::new("/word".to_string()));
        assert_eq!(fresh.next_id(), "rId1");
    }

    #[test]
    fn test_allocator_past_largest_u32_id() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4294967295" Type="urn:x" Target="x.xml"/></Relationships>"#;
        let rels = Relationships::from_xml(xml, "/word").unwrap();
        let mut alloc = RelIdAllocator::seeded_above(&rels);
        assert_eq!(alloc.next_id(), "rId4294967296");
        assert_eq!(alloc.next_id(), "rId4294967297");
    }

    #[test]
    fn test_to_xml_keeps_order_and_escapes() {
        let mut rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        rels.add_relationship(
            rt::IMAGE.to_string(),
            "media/logo.png".to_string(),
            "rId10".to_string(),
            false,
        );

        let xml = rels.to_xml();
        let header_at = xml.find(r#"Id="rId3""#).unwrap();
        let styles_at = xml.find(r#"Id="rId1""#).unwrap();
        assert!(header_at < styles_at);
        assert!(xml.contains("a=1&amp;b=2"));
        assert!(xml.contains(r#"TargetMode="External""#));
        assert!(xml.ends_with(
            r#"<Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/logo.png"/></Relationships>"#
        ));

        let reparsed = Relationships::from_xml(xml.as_bytes(), "/word").unwrap();
        assert_eq!(reparsed.len(), 5);
    }

    #[test]
    fn test_multiple_of_type_is_error() {
        let mut rels = Relationships::new("/word".to_string());
        rels.add_relationship(rt::HEADER.into(), "header1.xml".into(), "rId1".into(), false);
        rels.add_relationship(rt::HEADER.into(), "header2.xml".into(), "rId2".into(), false);
        assert!(rels.part_with_reltype(rt::HEADER).is_err());
        assert_eq!(rels.with_reltype(rt::HEADER).count(), 2);
    }
}

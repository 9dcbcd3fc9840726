/// The in-memory OPC package.
///
/// OpcPackage holds every member of the archive as raw bytes, in archive
/// order, and offers the typed views the template engine needs: content
/// types, per-part relationships and main-document discovery. Parts the engine
/// never touches are written back byte for byte.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, DEFAULT_DOCUMENT_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{PhysPkgReader, PhysPkgWriter};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

/// Main API type for working with OPC packages.
#[derive(Debug, Clone, Default)]
pub struct OpcPackage {
    /// Members in archive order
    parts: Vec<(PackURI, Vec<u8>)>,

    /// Partname -> index into `parts`
    index: HashMap<PackURI, usize>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use docxtpl::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("template.docx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Load an OPC package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut phys = PhysPkgReader::from_bytes(data)?;
        Self::from_members(phys.read_all()?)
    }

    /// Load an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut phys = PhysPkgReader::new(reader)?;
        Self::from_members(phys.read_all()?)
    }

    fn from_members(members: Vec<(PackURI, Vec<u8>)>) -> Result<Self> {
        let mut package = Self::new();
        for (uri, blob) in members {
            package.set_blob(uri, blob);
        }

        if !package.contains_part(&content_types_uri()?) {
            return Err(OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()));
        }

        Ok(package)
    }

    /// Get the raw bytes of a part.
    pub fn blob(&self, partname: &PackURI) -> Option<&[u8]> {
        self.index
            .get(partname)
            .map(|&i| self.parts[i].1.as_slice())
    }

    /// Get the raw bytes of a part, failing if it is absent.
    pub fn require_blob(&self, partname: &PackURI) -> Result<&[u8]> {
        self.blob(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace a part's bytes, or append a new part at the end.
    pub fn set_blob(&mut self, partname: PackURI, blob: Vec<u8>) {
        match self.index.get(&partname) {
            Some(&i) => self.parts[i].1 = blob,
            None => {
                self.index.insert(partname.clone(), self.parts.len());
                self.parts.push((partname, blob));
            },
        }
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.index.contains_key(partname)
    }

    /// Get the number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Iterate partnames in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.parts.iter().map(|(uri, _)| uri)
    }

    /// Parse `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypeMap> {
        ContentTypeMap::from_xml(self.require_blob(&content_types_uri()?)?)
    }

    /// Store a rewritten `[Content_Types].xml`.
    pub fn set_content_types(&mut self, map: &ContentTypeMap) -> Result<()> {
        self.set_blob(content_types_uri()?, map.to_xml().into_bytes());
        Ok(())
    }

    /// Relationships whose source is `source`.
    ///
    /// A missing `.rels` part is an empty collection, not an error.
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        match self.blob(&rels_uri) {
            Some(xml) => Relationships::from_xml(xml, source.base_uri()),
            None => Ok(Relationships::new(source.base_uri().to_string())),
        }
    }

    /// Store the relationships of `source`.
    pub fn set_rels_for(&mut self, source: &PackURI, rels: &Relationships) -> Result<()> {
        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        self.set_blob(rels_uri, rels.to_xml().into_bytes());
        Ok(())
    }

    /// Partname of the main document part.
    ///
    /// Follows the package-level `officeDocument` relationship; packages that
    /// lack it fall back to `/word/document.xml` when that part exists.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = self.rels_for(&package_uri)?;

        if let Ok(rel) = rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT) {
            let partname = rel.target_partname()?;
            if self.contains_part(&partname) {
                return Ok(partname);
            }
            return Err(OpcError::PartNotFound(partname.to_string()));
        }

        let fallback = PackURI::new(DEFAULT_DOCUMENT_URI).map_err(OpcError::InvalidPackUri)?;
        if self.contains_part(&fallback) {
            Ok(fallback)
        } else {
            Err(OpcError::PartNotFound(format!(
                "main document part ({})",
                DEFAULT_DOCUMENT_URI
            )))
        }
    }

    /// Find the first free partname produced by `template`, where `%d` is
    /// replaced with 1, 2, ...
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        let mut buf = itoa::Buffer::new();
        for n in 1u32..=10_000 {
            let candidate = PackURI::new(template.replace("%d", buf.format(n)))
                .map_err(OpcError::InvalidPackUri)?;
            if !self.contains_part(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OpcError::InvalidPackUri(format!(
            "Too many parts, cannot find next partname for '{}'",
            template
        )))
    }

    /// Serialize the package to ZIP bytes.
    ///
    /// `[Content_Types].xml` is always written first, the rest in archive order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let content_types = content_types_uri()?;
        let mut writer = PhysPkgWriter::new();

        writer.write(&content_types, self.require_blob(&content_types)?)?;
        for (uri, blob) in &self.parts {
            if *uri != content_types {
                writer.write(uri, blob)?;
            }
        }

        writer.finish()
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn content_types_uri() -> Result<PackURI> {
    PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)
}

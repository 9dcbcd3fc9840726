/// Open Packaging Conventions (OPC) implementation.
///
/// The subset of OPC the template engine relies on:
///
/// - Pack URIs and zip member names
/// - Relationship parts (`.rels`) with a collision-free rId allocator
/// - `[Content_Types].xml` defaults and overrides
/// - ZIP-based physical packaging that preserves member order

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypeMap;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{RelIdAllocator, Relationship, Relationships};

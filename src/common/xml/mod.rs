//! XML text helpers shared by the engine and the package layer.

mod escape;

pub use escape::{escape_xml, escape_xml_cow};

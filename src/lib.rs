//! docxtpl - Template expansion for Word (.docx) documents
//!
//! A `.docx` file is used as a template: its text carries placeholders that
//! are expanded against a [`DataTree`], producing a new `.docx`.
//!
//! # Features
//!
//! - **Placeholders**: `{name}` replaced with escaped scalar text
//! - **Loops**: `{#items}…{/items}` repeated per list item
//! - **Conditionals**: `{?flag}…{:else}…{/flag}` by truthiness
//! - **Table rows**: `{table:rows}` duplicates the enclosing table row
//! - **Images**: image values embedded as inline pictures, sized from the
//!   image header
//! - **Run normalization**: placeholders split across runs by Word are
//!   reassembled before expansion
//! - **Headers and footers** are rendered like the main document
//!
//! Data problems never fail a render; they are reported as warnings.
//!
//! # Example
//!
//! ```no_run
//! use docxtpl::{DataTree, DocxTemplate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = DataTree::from_json_str(r#"{
//!     "customer": "Ann",
//!     "paid": false,
//!     "lines": [{"item": "Tea", "price": 3.5}, {"item": "Cake", "price": 4}]
//! }"#)?;
//!
//! let mut template = DocxTemplate::open("invoice.docx")?;
//! let report = template.render(&data)?;
//! template.save("invoice-out.docx")?;
//!
//! println!("{} placeholders, {} warnings", report.stats.placeholders, report.warnings.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Expanding text directly
//!
//! ```
//! use docxtpl::template::{DataTree, expand};
//!
//! let data = DataTree::new().with("paid", true);
//! assert_eq!(expand("{?paid}PAID{:else}DUE{/paid}", &data).text, "PAID");
//! ```

/// Shared infrastructure: errors, units, XML escaping
pub mod common;

/// Raster image header inspection
pub mod images;

/// OOXML packages: OPC container and Word template rendering
pub mod ooxml;

/// The template engine over part text
pub mod template;

pub use common::{Error, Result};
pub use ooxml::docx::{DocxTemplate, RenderReport, render_bytes, render_file};
pub use template::{
    DataTree, ExpansionStats, ImageDescriptor, TemplateOptions, Value, Warning, WarningKind,
    expand, expand_with,
};

//! Office Open XML (OOXML) package handling for Word templates.
//!
//! 1. **OPC Layer** (`opc`): the ZIP package, its parts, relationships and
//!    content types
//! 2. **WordprocessingML** (`docx`): locating template parts, rendering them
//!    and embedding images
//!
//! # Example
//!
//! ```rust,no_run
//! use docxtpl::ooxml::docx::DocxTemplate;
//! use docxtpl::template::DataTree;
//!
//! let mut template = DocxTemplate::open("invoice.docx")?;
//! let report = template.render(&DataTree::new().with("customer", "Ann"))?;
//! template.save("invoice-out.docx")?;
//! println!("{} warnings", report.warnings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;

pub use error::{OoxmlError, Result};

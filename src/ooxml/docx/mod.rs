/// Word (.docx) template rendering.
///
/// `DocxTemplate` finds the parts that carry template text (the main
/// document, its headers and footers), expands each one and embeds image
/// values as inline pictures. Everything else in the package is preserved.
///
/// # Example
///
/// ```rust,no_run
/// use docxtpl::ooxml::docx::render_bytes;
/// use docxtpl::template::{DataTree, TemplateOptions};
///
/// let template = std::fs::read("letter.docx")?;
/// let data = DataTree::new().with("name", "Amy");
/// let (docx, report) = render_bytes(template, &data, TemplateOptions::default())?;
/// std::fs::write("letter-out.docx", docx)?;
/// assert_eq!(report.parts[0], "/word/document.xml");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
mod media;
pub mod template;

pub use template::{DocxTemplate, RenderReport, render_bytes, render_file};

//! Rendering a Word template package.

use super::media::MediaStore;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type};
use crate::ooxml::opc::{ContentTypeMap, OpcPackage, PackURI};
use crate::template::{
    DataTree, Expansion, ExpansionStats, TemplateOptions, Warning, expand_with, normalize_part,
};
use serde::Serialize;
use std::io::{Read, Seek};
use std::path::Path;

/// Main-document content types a template may carry.
const MAIN_CONTENT_TYPES: [&str; 4] = [
    ct::WML_DOCUMENT_MAIN,
    ct::WML_TEMPLATE_MAIN,
    ct::WML_DOCUMENT_MACRO,
    ct::WML_TEMPLATE_MACRO,
];

/// Outcome of a render: which parts were expanded and what was noticed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderReport {
    /// Rendered partnames, main document first
    pub parts: Vec<String>,
    pub warnings: Vec<Warning>,
    pub stats: ExpansionStats,
}

impl RenderReport {
    fn absorb(&mut self, partname: &PackURI, warnings: Vec<Warning>, stats: ExpansionStats) {
        self.parts.push(partname.to_string());
        self.warnings.extend(warnings);
        self.stats += stats;
    }
}

/// A Word (.docx) template.
///
/// Rendering rewrites the main document part and, unless disabled, its
/// header and footer parts. Every other part is written back unchanged.
///
/// # Examples
///
/// ```rust,no_run
/// use docxtpl::ooxml::docx::DocxTemplate;
/// use docxtpl::template::{DataTree, TemplateOptions};
///
/// let data = DataTree::from_json_str(r#"{"customer": "Ann", "paid": true}"#)?;
/// let mut template = DocxTemplate::open("invoice.docx")?
///     .with_options(TemplateOptions::new().with_max_image_inches(4.0));
/// let report = template.render(&data)?;
/// for warning in &report.warnings {
///     eprintln!("{}", warning);
/// }
/// template.save("out.docx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    package: OpcPackage,
    options: TemplateOptions,
}

impl DocxTemplate {
    /// Open a template from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_package(OpcPackage::open(path)?))
    }

    /// Load a template from its ZIP bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::from_package(OpcPackage::from_bytes(data)?))
    }

    /// Load a template from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Ok(Self::from_package(OpcPackage::from_reader(reader)?))
    }

    pub fn from_package(package: OpcPackage) -> Self {
        Self {
            package,
            options: TemplateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    #[inline]
    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    pub fn into_package(self) -> OpcPackage {
        self.package
    }

    /// Parts that will be rendered: the main document, then its headers and
    /// footers in relationship order.
    pub fn template_parts(&self) -> Result<Vec<PackURI>> {
        let content_types = self.package.content_types()?;
        self.collect_parts(&content_types)
    }

    fn collect_parts(&self, content_types: &ContentTypeMap) -> Result<Vec<PackURI>> {
        let main = self
            .package
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main document part: {}", e)))?;

        if let Some(got) = content_types.override_for(&main)
            && !MAIN_CONTENT_TYPES.contains(&got)
        {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: got.to_string(),
            });
        }

        let mut parts = vec![main];
        if !self.options.include_headers_footers {
            return Ok(parts);
        }

        let rels = self.package.rels_for(&parts[0])?;
        let linked = rels
            .with_reltype(relationship_type::HEADER)
            .chain(rels.with_reltype(relationship_type::FOOTER));
        for rel in linked {
            if rel.is_external() {
                continue;
            }
            let partname = rel.target_partname()?;
            if !self.package.contains_part(&partname) {
                log::warn!("{} points at missing part {}", rel.r_id(), partname);
                continue;
            }
            if !parts.contains(&partname) {
                parts.push(partname);
            }
        }
        Ok(parts)
    }

    /// Expand every template part against `data`.
    ///
    /// Data problems never fail a render; they are collected in the report.
    /// Errors mean the package itself is unusable, and leave the template
    /// untouched: parts are rendered into a staged copy that replaces the
    /// package only once every part has succeeded.
    pub fn render(&mut self, data: &DataTree) -> Result<RenderReport> {
        let mut staged = self.package.clone();
        let mut content_types = staged.content_types()?;
        let parts = self.collect_parts(&content_types)?;

        let mut media = MediaStore::default();
        let mut report = RenderReport::default();
        for partname in &parts {
            self.render_part(&mut staged, partname, data, &mut content_types, &mut media, &mut report)?;
        }

        if media.content_types_changed() {
            staged.set_content_types(&content_types)?;
        }
        self.package = staged;

        log::info!(
            "rendered {} part(s): {} placeholder(s), {} loop(s), {} conditional(s), {} table(s), {} image(s), {} warning(s)",
            report.parts.len(),
            report.stats.placeholders,
            report.stats.loops,
            report.stats.conditionals,
            report.stats.tables,
            report.stats.images,
            report.warnings.len()
        );
        Ok(report)
    }

    fn render_part(
        &self,
        package: &mut OpcPackage,
        partname: &PackURI,
        data: &DataTree,
        content_types: &mut ContentTypeMap,
        media: &mut MediaStore,
        report: &mut RenderReport,
    ) -> Result<()> {
        let blob = package.require_blob(partname)?;
        let xml = std::str::from_utf8(blob).map_err(|e| OoxmlError::InvalidPart {
            part: partname.to_string(),
            reason: format!("not valid UTF-8: {}", e),
        })?;

        let normalized = normalize_part(xml, self.options.effective_token_len());
        let Expansion {
            text,
            warnings,
            stats,
            images,
        } = expand_with(&normalized, data, &self.options);

        let text = if images.is_empty() {
            text
        } else {
            media.embed(package, content_types, partname, text, &images, &self.options)?
        };

        log::debug!("{}: {} warning(s)", partname, warnings.len());
        package.set_blob(partname.clone(), text.into_bytes());
        report.absorb(partname, warnings, stats);
        Ok(())
    }

    /// Serialize the (rendered) package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.package.to_bytes()?)
    }

    /// Write the (rendered) package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.package.save(path)?)
    }
}

/// Render template bytes in one step.
pub fn render_bytes(
    template: Vec<u8>,
    data: &DataTree,
    options: TemplateOptions,
) -> crate::Result<(Vec<u8>, RenderReport)> {
    let mut template = DocxTemplate::from_bytes(template)?.with_options(options);
    let report = template.render(data)?;
    Ok((template.to_bytes()?, report))
}

/// Render a template file into `output` using async file I/O.
pub async fn render_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    data: &DataTree,
    options: TemplateOptions,
) -> crate::Result<RenderReport> {
    let bytes = tokio::fs::read(input).await?;
    let (rendered, report) = render_bytes(bytes, data, options)?;
    tokio::fs::write(output, rendered).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::dimensions::tests::png_header;
    use crate::ooxml::opc::package::tests::{PACKAGE_RELS, zip_of};
    use crate::template::{ImageDescriptor, Value, WarningKind};

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#;

    const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:styleId="Normal">{not touched}</w:style></w:styles>"#;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn paragraph(runs: &[&str]) -> String {
        let runs: String = runs.iter().map(|t| format!("<w:r><w:t>{}</w:t></w:r>", t)).collect();
        format!("<w:p>{}</w:p>", runs)
    }

    fn docx(body: &str) -> Vec<u8> {
        let document = document(body);
        let header = format!("<w:hdr>{}</w:hdr>", paragraph(&["Header {ti", "tle}"]));
        let footer = format!("<w:ftr>{}</w:ftr>", paragraph(&["Page for {customer}"]));
        zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
            ("word/styles.xml", STYLES.as_bytes()),
            ("word/header1.xml", header.as_bytes()),
            ("word/footer1.xml", footer.as_bytes()),
        ])
    }

    fn part_text(template: &DocxTemplate, partname: &str) -> String {
        let uri = PackURI::new(partname).unwrap();
        String::from_utf8(template.package().blob(&uri).unwrap().to_vec()).unwrap()
    }

    fn logo() -> ImageDescriptor {
        ImageDescriptor::new(png_header(192, 96), "png").unwrap()
    }

    #[test]
    fn test_template_parts_order() {
        let template = DocxTemplate::from_bytes(docx("")).unwrap();
        let parts: Vec<String> = template
            .template_parts()
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(parts, vec!["/word/document.xml", "/word/header1.xml", "/word/footer1.xml"]);

        let template = template.with_options(TemplateOptions::new().with_headers_footers(false));
        assert_eq!(template.template_parts().unwrap().len(), 1);
    }

    #[test]
    fn test_render_split_placeholders_in_all_parts() {
        let body = paragraph(&["Dear {cus", "tomer},"]);
        let mut template = DocxTemplate::from_bytes(docx(&body)).unwrap();
        let data = DataTree::new().with("customer", "Ann & Bo").with("title", "Invoice");

        let report = template.render(&data).unwrap();

        let document = part_text(&template, "/word/document.xml");
        assert!(document.contains(r#"<w:t xml:space="preserve">Dear Ann &amp; Bo</w:t>"#));
        assert!(document.contains(r#"<w:t xml:space="preserve">,</w:t>"#));
        assert!(part_text(&template, "/word/header1.xml").contains("Header Invoice"));
        assert!(part_text(&template, "/word/footer1.xml").contains("Page for Ann &amp; Bo"));
        assert_eq!(part_text(&template, "/word/styles.xml"), STYLES);

        assert_eq!(report.parts.len(), 3);
        assert_eq!(report.stats.placeholders, 3);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_headers_footers_can_be_skipped() {
        let mut template = DocxTemplate::from_bytes(docx(""))
            .unwrap()
            .with_options(TemplateOptions::new().with_headers_footers(false));
        template.render(&DataTree::new().with("title", "X")).unwrap();
        assert!(part_text(&template, "/word/header1.xml").contains("Header {ti"));
    }

    #[test]
    fn test_render_loop_and_table() {
        let body = format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph(&["{#items}"]),
            paragraph(&["- {name}{/items}"]),
            paragraph(&["{table:rows}{cell}"]),
        );
        let data = DataTree::from_json_str(
            r#"{"items": [{"name": "a"}, {"name": "b"}], "rows": [{"cell": "1"}, {"cell": "2"}, {"cell": "3"}]}"#,
        )
        .unwrap();
        let mut template = DocxTemplate::from_bytes(docx(&body)).unwrap();
        let report = template.render(&data).unwrap();

        let document = part_text(&template, "/word/document.xml");
        assert_eq!(document.matches("<w:tr>").count(), 3);
        assert!(document.contains("- a"));
        assert!(document.contains("- b"));
        assert_eq!(report.stats.loops, 1);
        assert_eq!(report.stats.tables, 1);
    }

    #[test]
    fn test_render_collects_warnings() {
        let body = paragraph(&["{#missing}x{/missing}{?open}"]);
        let mut template = DocxTemplate::from_bytes(docx(&body)).unwrap();
        let report = template.render(&DataTree::new()).unwrap();
        let kinds: Vec<WarningKind> = report.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::DataMismatch, WarningKind::LayoutAmbiguity]);
    }

    #[test]
    fn test_embed_image() {
        let body = paragraph(&["Logo: {logo} and again {logo}"]);
        let mut template = DocxTemplate::from_bytes(docx(&body)).unwrap();
        let data = DataTree::new().with("logo", logo());

        let report = template.render(&data).unwrap();
        assert_eq!(report.stats.images, 2);

        let media = PackURI::new("/word/media/logo.png").unwrap();
        assert_eq!(template.package().blob(&media), Some(png_header(192, 96).as_slice()));

        let rels = template.package().rels_for(&PackURI::new("/word/document.xml").unwrap()).unwrap();
        let images: Vec<_> = rels.with_reltype(relationship_type::IMAGE).collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].r_id(), "rId9");
        assert_eq!(images[0].target_ref(), "media/logo.png");
        assert_eq!(rels.len(), 4);

        let document = part_text(&template, "/word/document.xml");
        assert_eq!(document.matches(r#"r:embed="rId9""#).count(), 2);
        assert!(document.contains(r#"<wp:docPr id="1" name="logo.png"/>"#));
        assert!(document.contains(r#"<wp:docPr id="2" name="logo.png"/>"#));
        assert!(document.contains(r#"<wp:extent cx="1828800" cy="914400"/>"#));
        assert!(document.contains(r#"<w:t>Logo: </w:t><w:drawing>"#));
        assert!(!document.contains('\u{E000}'));

        let content_types = template.package().content_types().unwrap();
        assert_eq!(content_types.get(&media), Some("image/png"));
    }

    #[test]
    fn test_image_in_header_shares_media_part() {
        let header_rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;
        let document = document(&paragraph(&["{logo}"]));
        let header = format!("<w:hdr>{}</w:hdr>", paragraph(&["{logo}"]));
        let bytes = zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
            ("word/header1.xml", header.as_bytes()),
            ("word/_rels/header1.xml.rels", header_rels.as_bytes()),
            ("word/footer1.xml", b"<w:ftr/>"),
        ]);

        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        template.render(&DataTree::new().with("logo", logo())).unwrap();

        let media_parts = template
            .package()
            .partnames()
            .filter(|p| p.as_str().starts_with("/word/media/"))
            .count();
        assert_eq!(media_parts, 1);

        let rels = template.package().rels_for(&PackURI::new("/word/header1.xml").unwrap()).unwrap();
        assert_eq!(rels.get("rId1").map(|r| r.target_ref()), Some("media/logo.png"));
        assert!(part_text(&template, "/word/header1.xml").contains(r#"r:embed="rId1""#));
    }

    #[test]
    fn test_existing_media_name_gets_suffix() {
        let document = document(&paragraph(&["{logo}"]));
        let bytes = zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/media/logo.png", b"old"),
        ]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        template.render(&DataTree::new().with("logo", logo())).unwrap();

        let old = PackURI::new("/word/media/logo.png").unwrap();
        let new = PackURI::new("/word/media/logo_1.png").unwrap();
        assert_eq!(template.package().blob(&old), Some(&b"old"[..]));
        assert!(template.package().contains_part(&new));
    }

    #[test]
    fn test_image_value_in_loop_is_not_text() {
        let body = paragraph(&["{#items}{pic}{/items}"]);
        let mut template = DocxTemplate::from_bytes(docx(&body)).unwrap();
        let data = DataTree::new().with(
            "items",
            Value::List(vec![DataTree::new().with("pic", logo()).into()]),
        );
        let report = template.render(&data).unwrap();
        assert_eq!(report.stats.images, 0);
        assert_eq!(report.warnings[0].kind, WarningKind::DataMismatch);
    }

    #[test]
    fn test_missing_main_document() {
        let bytes = zip_of(&[("[Content_Types].xml", CONTENT_TYPES.as_bytes())]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        let err = template.render(&DataTree::new()).unwrap_err();
        assert!(matches!(err, OoxmlError::PartNotFound(_)));
    }

    #[test]
    fn test_missing_content_types() {
        let bytes = zip_of(&[("word/document.xml", b"<w:document/>")]);
        assert!(DocxTemplate::from_bytes(bytes).is_err());
    }

    #[test]
    fn test_invalid_utf8_part() {
        let bytes = zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", &[0x3C, 0xFF, 0xFE, 0x3E]),
        ]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        let err = template.render(&DataTree::new()).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidPart { ref part, .. } if part == "/word/document.xml"));
    }

    #[test]
    fn test_wrong_main_content_type() {
        let content_types = CONTENT_TYPES.replace(
            "wordprocessingml.document.main+xml",
            "spreadsheetml.sheet.main+xml",
        );
        let bytes = zip_of(&[
            ("[Content_Types].xml", content_types.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", b"<w:document/>"),
        ]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        let err = template.render(&DataTree::new()).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidContentType { .. }));
    }

    #[test]
    fn test_failed_render_leaves_package_untouched() {
        let document = document(&paragraph(&["{name}{logo}"]));
        let bytes = zip_of(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
            ("word/header1.xml", &[0x3C, 0xFF, 0xFE, 0x3E]),
            ("word/footer1.xml", b"<w:ftr/>"),
        ]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        let data = DataTree::new().with("name", "Amy").with("logo", logo());

        let err = template.render(&data).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidPart { ref part, .. } if part == "/word/header1.xml"));

        assert_eq!(part_text(&template, "/word/document.xml"), document);
        let media = PackURI::new("/word/media/logo.png").unwrap();
        assert!(!template.package().contains_part(&media));
        let rels = template.package().rels_for(&PackURI::new("/word/document.xml").unwrap()).unwrap();
        assert_eq!(rels.len(), 3);
        assert!(!template.package().content_types().unwrap().has_default("png"));
    }

    #[test]
    fn test_unusable_image_extension_replaced() {
        let image = ImageDescriptor::new(png_header(192, 96), "png/../../../evil").unwrap();
        let mut template = DocxTemplate::from_bytes(docx(&paragraph(&["{logo}"]))).unwrap();
        let report = template.render(&DataTree::new().with("logo", image)).unwrap();

        let media: Vec<String> = template
            .package()
            .partnames()
            .filter(|p| p.as_str().starts_with("/word/media/"))
            .map(|p| p.to_string())
            .collect();
        assert_eq!(media, vec!["/word/media/logo.png"]);
        assert!(template.package().partnames().all(|p| !p.as_str().contains("..")));

        let content_types = template.package().content_types().unwrap();
        assert!(content_types.has_default("png"));
        assert!(!content_types.to_xml().contains("evil"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::DataMismatch);
    }

    #[test]
    fn test_undeclared_main_content_type_tolerated() {
        let content_types = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#;
        let document = document(&paragraph(&["{customer}"]));
        let bytes = zip_of(&[
            ("[Content_Types].xml", content_types.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
        ]);
        let mut template = DocxTemplate::from_bytes(bytes).unwrap();
        let report = template.render(&DataTree::new().with("customer", "Lee")).unwrap();
        assert_eq!(report.stats.placeholders, 1);
        assert!(part_text(&template, "/word/document.xml").contains("<w:t>Lee</w:t>"));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");

        let mut template = DocxTemplate::from_bytes(docx(&paragraph(&["{customer}"]))).unwrap();
        template.render(&DataTree::new().with("customer", "Zoe")).unwrap();
        template.save(&path).unwrap();

        let reopened = DocxTemplate::open(&path).unwrap();
        assert!(part_text(&reopened, "/word/document.xml").contains("<w:t>Zoe</w:t>"));
        assert_eq!(reopened.package().part_count(), template.package().part_count());
    }

    #[test]
    fn test_values_with_braces_survive_render() {
        let (once, _) = render_bytes(
            docx(&paragraph(&["{a", "}"])),
            &DataTree::new().with("a", "{b}").with("b", "no"),
            TemplateOptions::default(),
        )
        .unwrap();
        let template = DocxTemplate::from_bytes(once).unwrap();
        assert!(part_text(&template, "/word/document.xml").contains("{b}"));
    }

    #[tokio::test]
    async fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        tokio::fs::write(&input, docx(&paragraph(&["{customer}"]))).await.unwrap();

        let data = DataTree::new().with("customer", "Kim");
        let report = render_file(&input, &output, &data, TemplateOptions::default())
            .await
            .unwrap();
        assert_eq!(report.stats.placeholders, 2);

        let rendered = DocxTemplate::open(&output).unwrap();
        assert!(part_text(&rendered, "/word/document.xml").contains("Kim"));
    }
}

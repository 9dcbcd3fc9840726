//! Image layout: display size and inline drawing markup.

use super::options::TemplateOptions;
use super::value::ImageDescriptor;
use crate::common::unit::{EMUS_PER_INCH, inches_to_emu_f64, px_to_emu_f64, round_emu};
use crate::common::xml::escape_xml;
use crate::images;
use crate::ooxml::opc::constants::namespace;
use std::fmt::{self, Write};

/// Display size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExtent {
    pub cx: i64,
    pub cy: i64,
}

/// Usable explicit size: finite and positive.
#[inline]
fn usable(inches: Option<f64>) -> Option<f64> {
    inches.filter(|v| v.is_finite() && *v > 0.0)
}

/// Compute the display size of an image.
///
/// Explicit sizes win; a single explicit side keeps the aspect ratio of
/// `pixels`. Without either, the pixel size is converted at the configured
/// DPI and scaled down so neither side exceeds the configured maximum.
pub fn compute_extent(
    pixels: (u32, u32),
    width_inches: Option<f64>,
    height_inches: Option<f64>,
    options: &TemplateOptions,
) -> ImageExtent {
    let px_w = f64::from(pixels.0.max(1));
    let px_h = f64::from(pixels.1.max(1));

    let (cx, cy) = match (usable(width_inches), usable(height_inches)) {
        (Some(w), Some(h)) => (inches_to_emu_f64(w), inches_to_emu_f64(h)),
        (Some(w), None) => {
            let cx = inches_to_emu_f64(w);
            (cx, cx * px_h / px_w)
        },
        (None, Some(h)) => {
            let cy = inches_to_emu_f64(h);
            (cy * px_w / px_h, cy)
        },
        (None, None) => {
            let dpi = options.effective_dpi();
            let (mut cx, mut cy) = (
                px_to_emu_f64(pixels.0.max(1), dpi),
                px_to_emu_f64(pixels.1.max(1), dpi),
            );
            let max = options.max_image_inches * EMUS_PER_INCH as f64;
            if max.is_finite() && max > 0.0 {
                if cx > max {
                    cy *= max / cx;
                    cx = max;
                }
                if cy > max {
                    cx *= max / cy;
                    cy = max;
                }
            }
            (cx, cy)
        },
    };

    ImageExtent {
        cx: round_emu(cx),
        cy: round_emu(cy),
    }
}

/// Display size of an image descriptor, reading pixel dimensions from its
/// bytes.
pub fn image_extent(image: &ImageDescriptor, options: &TemplateOptions) -> ImageExtent {
    compute_extent(
        images::sniff(image.buffer()),
        image.width_inches(),
        image.height_inches(),
        options,
    )
}

/// Allocates `wp:docPr` ids, which must be unique within a part.
#[derive(Debug, Clone)]
pub struct DocPrIds {
    next: u32,
}

impl DocPrIds {
    /// Start above the largest id already used in `xml`.
    pub fn seeded_above(xml: &str) -> Self {
        Self {
            next: super::wml::max_doc_pr_id(xml).saturating_add(1),
        }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

/// An inline picture anchored to a relationship.
#[derive(Debug, Clone)]
pub struct InlineImage<'a> {
    pub r_id: &'a str,
    pub doc_pr_id: u32,
    pub name: &'a str,
    pub extent: ImageExtent,
}

impl InlineImage<'_> {
    /// Write a `<w:drawing>` element.
    ///
    /// Namespace prefixes are declared on the elements themselves so the
    /// markup stays valid wherever it is spliced.
    pub fn write_xml(&self, xml: &mut String) -> fmt::Result {
        let ImageExtent { cx, cy } = self.extent;
        let name = escape_xml(self.name);
        write!(
            xml,
            r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0" xmlns:wp="{wp}"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="{name}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{a}" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="{a}"><a:graphicData uri="{pic}"><pic:pic xmlns:pic="{pic}"><pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{r_id}" xmlns:r="{r}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#,
            wp = namespace::DML_WORDPROCESSING_DRAWING,
            a = namespace::DML_MAIN,
            pic = namespace::DML_PICTURE,
            r = namespace::OFC_RELATIONSHIPS,
            id = self.doc_pr_id,
            r_id = self.r_id,
        )
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1400);
        // Writing into a String cannot fail
        let _ = self.write_xml(&mut xml);
        xml
    }
}

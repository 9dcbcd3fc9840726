//! Embedding image values into rendered parts.
//!
//! Each distinct image key becomes one media part, shared by every part that
//! shows it. Each showing part gets its own image relationship, added once
//! per key, and every occurrence gets its own drawing.

use crate::images;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type, relationship_type};
use crate::ooxml::opc::{ContentTypeMap, OpcPackage, PackURI, RelIdAllocator};
use crate::template::layout::DocPrIds;
use crate::template::wml::inside_text_element;
use crate::template::{ImageDescriptor, ImagePlacement, InlineImage, TemplateOptions, image_extent};
use std::collections::HashMap;

/// Media parts written during one render, by image key.
#[derive(Debug, Default)]
pub(crate) struct MediaStore {
    parts: HashMap<String, PackURI>,
    content_types_changed: bool,
}

impl MediaStore {
    /// Whether a new extension default was declared.
    pub(crate) fn content_types_changed(&self) -> bool {
        self.content_types_changed
    }

    /// The media part for `key`, writing it on first use.
    fn media_part(
        &mut self,
        package: &mut OpcPackage,
        content_types: &mut ContentTypeMap,
        source: &PackURI,
        key: &str,
        image: &ImageDescriptor,
    ) -> Result<PackURI> {
        if let Some(partname) = self.parts.get(key) {
            return Ok(partname.clone());
        }

        let ext = image.extension();
        let dir = source.base_uri().trim_end_matches('/');
        let preferred = PackURI::new(format!("{}/media/{}.{}", dir, key, ext))
            .map_err(|e| OoxmlError::InvalidPart { part: source.to_string(), reason: e })?;
        let partname = if package.contains_part(&preferred) {
            package.next_partname(&format!("{}/media/{}_%d.{}", dir, key, ext))?
        } else {
            preferred
        };

        let declared = content_type::for_image_extension(ext);
        if let Some(format) = images::sniff_format(image.buffer())
            && format.mime_type() != declared
        {
            log::debug!(
                "image `{}` is {} but was given extension `{}`",
                key,
                format.mime_type(),
                ext
            );
        }
        if !content_types.has_default(ext) {
            content_types.add_default(ext, &declared);
            self.content_types_changed = true;
        }

        log::debug!("writing media part {} ({} bytes)", partname, image.buffer().len());
        package.set_blob(partname.clone(), image.buffer().to_vec());
        self.parts.insert(key.to_string(), partname.clone());
        Ok(partname)
    }

    /// Replace the image markers in `text`, a rendered `source` part, with
    /// inline drawings.
    pub(crate) fn embed(
        &mut self,
        package: &mut OpcPackage,
        content_types: &mut ContentTypeMap,
        source: &PackURI,
        mut text: String,
        placements: &[ImagePlacement<'_>],
        options: &TemplateOptions,
    ) -> Result<String> {
        let mut rels = package.rels_for(source)?;
        let mut rel_ids = RelIdAllocator::seeded_above(&rels);
        let mut doc_pr_ids = DocPrIds::seeded_above(&text);
        let mut r_ids: HashMap<&str, String> = HashMap::new();

        for placement in placements {
            let partname = self.media_part(package, content_types, source, placement.key, placement.image)?;
            let r_id = match r_ids.get(placement.key) {
                Some(r_id) => r_id.clone(),
                None => {
                    let r_id = rel_ids.next_id();
                    rels.add_relationship(
                        relationship_type::IMAGE.to_string(),
                        partname.relative_ref(source.base_uri()),
                        r_id.clone(),
                        false,
                    );
                    r_ids.insert(placement.key, r_id.clone());
                    r_id
                },
            };

            let drawing = InlineImage {
                r_id: &r_id,
                doc_pr_id: doc_pr_ids.next_id(),
                name: partname.filename(),
                extent: image_extent(placement.image, options),
            }
            .to_xml();

            let Some(at) = text.find(&placement.marker) else {
                log::debug!("image marker for `{}` not found in {}", placement.key, source);
                continue;
            };
            let end = at + placement.marker.len();
            // A drawing is a sibling of <w:t> inside the run
            if inside_text_element(&text, at) {
                let spliced = format!(r#"</w:t>{}<w:t xml:space="preserve">"#, drawing);
                text.replace_range(at..end, &spliced);
            } else {
                text.replace_range(at..end, &drawing);
            }
        }

        package.set_rels_for(source, &rels)?;
        Ok(text)
    }
}

//! Pixel dimension sniffing for PNG, JPEG and GIF.
//!
//! Never fails: unknown, truncated or malformed input yields
//! [`FALLBACK_DIMENSIONS`]. Detection is by magic bytes only; the caller's
//! file extension plays no part.

/// Size reported for anything that cannot be read.
pub const FALLBACK_DIMENSIONS: (u32, u32) = (100, 100);

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8];
const GIF_SIGNATURE: &[u8] = b"GIF8";

/// Raster formats the sniffer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Gif,
}

impl RasterFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }
}

/// Detect the raster format from the leading bytes.
pub fn sniff_format(data: &[u8]) -> Option<RasterFormat> {
    if data.starts_with(PNG_SIGNATURE) {
        Some(RasterFormat::Png)
    } else if data.starts_with(JPEG_SIGNATURE) {
        Some(RasterFormat::Jpeg)
    } else if data.starts_with(GIF_SIGNATURE) {
        Some(RasterFormat::Gif)
    } else {
        None
    }
}

/// Return `(width, height)` in pixels.
///
/// # Examples
///
/// ```
/// use docxtpl::images::{sniff, FALLBACK_DIMENSIONS};
///
/// let mut gif = b"GIF89a".to_vec();
/// gif.extend_from_slice(&[0x40, 0x01, 0xF0, 0x00]);
/// assert_eq!(sniff(&gif), (320, 240));
/// assert_eq!(sniff(b"not an image"), FALLBACK_DIMENSIONS);
/// ```
pub fn sniff(data: &[u8]) -> (u32, u32) {
    let dims = match sniff_format(data) {
        Some(RasterFormat::Png) => png_dimensions(data),
        Some(RasterFormat::Jpeg) => jpeg_dimensions(data),
        Some(RasterFormat::Gif) => gif_dimensions(data),
        None => None,
    };

    // A zero extent is as unusable as no extent at all
    match dims {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => FALLBACK_DIMENSIONS,
    }
}

#[inline]
fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[inline]
fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// IHDR width and height sit at fixed offsets 16 and 20.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((be_u32(data, 16)?, be_u32(data, 20)?))
}

/// Logical screen width and height sit at offsets 6 and 8.
fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((le_u16(data, 6)? as u32, le_u16(data, 8)? as u32))
}

/// Walk marker segments until the first baseline/progressive SOF (C0..=C3).
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2usize;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            },
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD9 => {
                pos += 2;
                continue;
            },
            0xC0..=0xC3 => {
                // FF Cx | length(2) | precision(1) | height(2) | width(2)
                let height = be_u16(data, pos + 5)?;
                let width = be_u16(data, pos + 7)?;
                return Some((width as u32, height as u32));
            },
            _ => {
                let len = be_u16(data, pos + 2)? as usize;
                if len < 2 {
                    return None;
                }
                pos += 2 + len;
            },
        }
    }

    None
}

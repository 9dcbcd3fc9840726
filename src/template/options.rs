/// Configuration options for template expansion.
///
/// # Examples
///
/// ```rust
/// use docxtpl::template::TemplateOptions;
///
/// let options = TemplateOptions::new()
///     .with_escape_values(true)
///     .with_max_image_inches(4.0);
/// assert_eq!(options.pixel_dpi, 96);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// XML-escape substituted scalar text
    pub escape_values: bool,
    /// Render header and footer parts in addition to the main document
    pub include_headers_footers: bool,
    /// Resolution used to convert pixel sizes to EMUs
    pub pixel_dpi: u32,
    /// Largest automatic image width or height, in inches
    pub max_image_inches: f64,
    /// Longest placeholder the scanner recognizes, braces excluded
    pub max_token_len: usize,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            escape_values: true,
            include_headers_footers: true,
            pixel_dpi: crate::common::unit::DEFAULT_DPI,
            max_image_inches: 6.0,
            max_token_len: 256,
        }
    }
}

impl TemplateOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether substituted values are XML-escaped.
    ///
    /// Disabling this lets values carry raw WordprocessingML, which can break
    /// the document if the markup is not well formed.
    #[inline]
    pub fn with_escape_values(mut self, escape: bool) -> Self {
        self.escape_values = escape;
        self
    }

    #[inline]
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Set the pixel resolution. Zero falls back to 96.
    #[inline]
    pub fn with_pixel_dpi(mut self, dpi: u32) -> Self {
        self.pixel_dpi = dpi;
        self
    }

    #[inline]
    pub fn with_max_image_inches(mut self, inches: f64) -> Self {
        self.max_image_inches = inches;
        self
    }

    /// Set the placeholder length bound. Values below 1 are raised to 1.
    #[inline]
    pub fn with_max_token_len(mut self, len: usize) -> Self {
        self.max_token_len = len;
        self
    }

    #[inline]
    pub(crate) fn effective_dpi(&self) -> u32 {
        if self.pixel_dpi == 0 { crate::common::unit::DEFAULT_DPI } else { self.pixel_dpi }
    }

    #[inline]
    pub(crate) fn effective_token_len(&self) -> usize {
        self.max_token_len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TemplateOptions::default();
        assert!(options.escape_values);
        assert!(options.include_headers_footers);
        assert_eq!(options.pixel_dpi, 96);
        assert_eq!(options.max_image_inches, 6.0);
        assert_eq!(options.max_token_len, 256);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: TemplateOptions =
            serde_json::from_str(r#"{"escape_values": false, "pixel_dpi": 72}"#).unwrap();
        assert!(!options.escape_values);
        assert_eq!(options.pixel_dpi, 72);
        assert_eq!(options.max_token_len, 256);
    }

    #[test]
    fn test_degenerate_values_clamped() {
        let options = TemplateOptions::new().with_pixel_dpi(0).with_max_token_len(0);
        assert_eq!(options.effective_dpi(), 96);
        assert_eq!(options.effective_token_len(), 1);
    }
}

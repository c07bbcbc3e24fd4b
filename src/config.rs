//! Decoder configuration.

/// Options controlling how tolerant the decoder is.
///
/// # Examples
///
/// ```rust
/// use psdkit::ParseOptions;
///
/// // Defaults
/// let options = ParseOptions::default();
/// assert!(!options.strict);
///
/// // Or customize
/// let options = ParseOptions::new()
///     .with_strict(true)
///     .with_max_input_len(Some(64 << 20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep a recognized layer info record as raw bytes when its decoder
    /// fails, instead of failing the whole document
    pub lenient_layer_info: bool,
    /// Treat vector mask payloads that do not hold a whole number of path
    /// records as errors, and fail the decode on a damaged layer comps
    /// resource instead of leaving the comps empty
    pub strict: bool,
    /// Decode layer comps from the image resources
    pub build_layer_comps: bool,
    /// Reject inputs longer than this many bytes
    pub max_input_len: Option<u64>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            lenient_layer_info: false,
            strict: false,
            build_layer_comps: true,
            max_input_len: None,
        }
    }
}

impl ParseOptions {
    /// Create a new `ParseOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether failing layer info decoders fall back to raw bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use psdkit::ParseOptions;
    ///
    /// let options = ParseOptions::new().with_lenient_layer_info(true);
    /// assert!(options.lenient_layer_info);
    /// ```
    #[inline]
    pub fn with_lenient_layer_info(mut self, lenient: bool) -> Self {
        self.lenient_layer_info = lenient;
        self
    }

    /// Set strict vector mask and layer comps validation.
    #[inline]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set whether layer comps are decoded.
    ///
    #[inline]
    pub fn with_layer_comps(mut self, build: bool) -> Self {
        self.build_layer_comps = build;
        self
    }

    #[inline]
    pub fn with_max_input_len(mut self, limit: Option<u64>) -> Self {
        self.max_input_len = limit;
        self
    }
}

//! Output formats for rendered diagrams.

/// Output format for rendered diagram artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Lossless raster output (default).
    #[default]
    Png,
    /// Lossy raster output, smaller for screenshot-heavy diagrams.
    Jpeg,
    /// Vector output, only available from the screenshot service backend.
    Svg,
}

impl ImageFormat {
    /// Parse a format from a configuration value.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Canonical name, also used as the artifact file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
        }
    }
}

//! Rendering backend abstraction.
//!
//! A [`RenderBackend`] turns a rendering page (HTML embedding the diagram
//! source) into raw image bytes. Backends are swappable behind the trait:
//! the rest of the pipeline never knows whether a screenshot service or a
//! local browser produced the image.

use crate::format::ImageFormat;

/// Options passed to a backend for a single render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Requested output format.
    pub format: ImageFormat,
    /// Suppress background fill where the backend supports it.
    pub transparent: bool,
    /// Viewport width in pixels, when the block specifies one.
    pub width: Option<u32>,
    /// Viewport height in pixels, when the block specifies one.
    pub height: Option<u32>,
}

/// Backend failure for a single render.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("{backend} backend does not support {format} output")]
    UnsupportedFormat {
        backend: &'static str,
        format: &'static str,
    },
    #[error("browser failed: {0}")]
    Browser(String),
}

/// A rendering backend: HTML in, image bytes out.
///
/// Implementations must acquire and release any underlying resource
/// (HTTP connection, browser process, temp files) within a single
/// `render` call, on both success and error paths.
pub trait RenderBackend: Send + Sync {
    /// Render the given HTML page to image bytes.
    fn render(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, BackendError>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

//! Rendering gateway.
//!
//! The gateway owns a [`RenderBackend`] and turns resolved diagram source
//! into an artifact file at a deterministic path:
//! `<output_dir>/diagram-<file_stem>.<format>`.

use std::path::{Path, PathBuf};

use crate::backend::{BackendError, RenderBackend, RenderOptions};
use crate::consts::ARTIFACT_PREFIX;
use crate::format::ImageFormat;
use crate::page::build_page;

/// Per-block rendering parameters taken from the block's attributes.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Viewport width in pixels.
    pub width: Option<u32>,
    /// Viewport height in pixels.
    pub height: Option<u32>,
    /// Suppress background fill.
    pub transparent: bool,
}

/// Rendering failure for a single block.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend returned invalid PNG data")]
    InvalidPng,
}

/// Drives a rendering backend and writes artifacts.
pub struct RenderGateway {
    backend: Box<dyn RenderBackend>,
    format: ImageFormat,
}

impl RenderGateway {
    /// Create a gateway producing artifacts in the given format.
    #[must_use]
    pub fn new(backend: Box<dyn RenderBackend>, format: ImageFormat) -> Self {
        Self { backend, format }
    }

    /// Configured output format.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Name of the underlying backend, for diagnostics.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Render diagram source to an artifact file.
    ///
    /// Creates `output_dir` if missing (idempotent), builds the rendering
    /// page, invokes the backend, sanity-checks PNG output, and writes
    /// `diagram-<file_stem>.<format>`. Returns the artifact path.
    ///
    /// A failure here affects only the current block; the caller decides
    /// whether to continue with siblings.
    pub fn render(
        &self,
        output_dir: &Path,
        source: &str,
        file_stem: &str,
        request: &RenderRequest,
    ) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(output_dir)?;

        let html = build_page(source, request.width, request.height);
        let options = RenderOptions {
            format: self.format,
            transparent: request.transparent,
            width: request.width,
            height: request.height,
        };
        let bytes = self.backend.render(&html, &options)?;

        if self.format == ImageFormat::Png && png_dimensions(&bytes).is_none() {
            return Err(RenderError::InvalidPng);
        }

        let filename = format!("{ARTIFACT_PREFIX}{file_stem}.{}", self.format.as_str());
        let path = output_dir.join(filename);
        std::fs::write(&path, &bytes)?;
        tracing::debug!(path = %path.display(), "wrote diagram artifact");

        Ok(path)
    }
}

/// Extract width and height from PNG image data.
///
/// PNG format: 8-byte signature, then IHDR chunk with width/height at
/// bytes 16-24 (big-endian).
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }
    if &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

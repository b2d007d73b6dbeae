//! Diagram rendering for mdsync.
//!
//! This crate turns mermaid diagram source into image artifacts via a
//! browser-based rendering backend:
//! - [`build_page`] wraps diagram source in a minimal HTML document the
//!   backend can render
//! - [`RenderBackend`] is the swappable backend seam, with two
//!   implementations: [`ScreenshotBackend`] (HTTP screenshot service) and
//!   [`ChromiumBackend`] (headless browser on this machine)
//! - [`RenderGateway`] drives a backend and writes the resulting artifact
//!   to a deterministic path
//!
//! # Example
//!
//! ```ignore
//! use mdsync_render::{ImageFormat, RenderGateway, RenderRequest, ScreenshotBackend};
//!
//! let backend = Box::new(ScreenshotBackend::new("http://localhost:3000"));
//! let gateway = RenderGateway::new(backend, ImageFormat::Png);
//! let path = gateway.render(
//!     "docs".as_ref(),
//!     "graph TD; A-->B;",
//!     "1700000000000",
//!     &RenderRequest::default(),
//! )?;
//! ```

mod backend;
mod chromium;
mod consts;
mod format;
mod gateway;
mod page;
mod screenshot;

pub use backend::{BackendError, RenderBackend, RenderOptions};
pub use chromium::ChromiumBackend;
pub use consts::{ARTIFACT_PREFIX, DEFAULT_TIMEOUT};
pub use format::ImageFormat;
pub use gateway::{RenderError, RenderGateway, RenderRequest};
pub use page::build_page;
pub use screenshot::ScreenshotBackend;

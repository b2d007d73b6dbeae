//! Diagram-to-image synchronization engine for markdown trees.
//!
//! mdsync scans markdown documents for diagram containers
//! (`<div data-mermaid …>`), renders each block's mermaid source to an
//! image through a browser-based backend, and rewrites the document to
//! reference the generated artifact. Diagram sources are preserved in
//! sidecar files so a document can omit inline source on later runs.
//!
//! # Pipeline
//!
//! For each discovered document, the [`Syncer`] drives:
//! 1. [`scan`]: parse the text into a [`Document`] tree, locating blocks
//! 2. [`resolve`]: assign/recover the block identifier and diagram source
//! 3. [`RenderGateway`](mdsync_render::RenderGateway): produce the artifact
//! 4. [`rewrite`]: swap the block's artifact marker for the new one
//! 5. write-back, only when the serialized text actually changed
//!
//! Everything outside recognized diagram blocks round-trips byte-for-byte.
//! Per-block and per-document failures are reported through the injected
//! [`Reporter`] and never abort the run.

mod document;
mod report;
mod resolve;
mod rewrite;
mod scanner;
mod sidecar;
mod sync;
mod walker;

pub use document::{BlockAttrs, DiagramBlock, Document, InnerNode, Node};
pub use report::{Reporter, TracingReporter};
pub use resolve::{IdGenerator, Resolution, ResolveError, normalize_identifier, resolve, slugify};
pub use rewrite::{relative_dir, rewrite};
pub use scanner::{MARKER_ATTR, scan};
pub use sidecar::{SIDECAR_PREFIX, SidecarCache};
pub use sync::{SyncError, SyncReport, SyncSettings, Syncer};

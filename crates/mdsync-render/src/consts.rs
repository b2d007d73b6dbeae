//! Shared constants for diagram rendering.

use std::time::Duration;

/// Mermaid distribution loaded into every rendering page.
pub(crate) const MERMAID_CDN: &str =
    "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

/// Default timeout for screenshot service requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Filename prefix for rendered artifacts.
pub const ARTIFACT_PREFIX: &str = "diagram-";

/// Viewport used when a block specifies no dimensions.
pub(crate) const DEFAULT_VIEWPORT: (u32, u32) = (800, 600);

//! Headless Chromium backend.
//!
//! Writes the rendering page into a temporary directory, runs a headless
//! browser with `--screenshot`, and reads the captured image back. The
//! temporary directory is removed when it goes out of scope, so the page
//! and screenshot files are cleaned up on success and error paths alike.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::backend::{BackendError, RenderBackend, RenderOptions};
use crate::consts::DEFAULT_VIEWPORT;
use crate::format::ImageFormat;

/// Browser binary names probed on `PATH`, in preference order.
const BINARY_NAMES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Virtual time granted to the page so the mermaid script finishes
/// laying out before the screenshot is taken (milliseconds).
const VIRTUAL_TIME_BUDGET_MS: u32 = 10_000;

/// Backend that renders with a local headless Chromium.
///
/// Only PNG output is supported; Chromium's `--screenshot` cannot produce
/// other formats.
pub struct ChromiumBackend {
    binary: PathBuf,
}

impl ChromiumBackend {
    /// Create a backend using an explicit browser binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Find a Chromium-compatible binary on `PATH`.
    ///
    /// Returns `None` when no known browser binary is installed.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let path_var = std::env::var_os("PATH")?;
        for dir in std::env::split_paths(&path_var) {
            for name in BINARY_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Some(Self::new(candidate));
                }
            }
        }
        None
    }

    /// The browser binary this backend runs.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl RenderBackend for ChromiumBackend {
    fn render(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, BackendError> {
        if options.format != ImageFormat::Png {
            return Err(BackendError::UnsupportedFormat {
                backend: "chromium",
                format: options.format.as_str(),
            });
        }

        let workdir = tempfile::tempdir().map_err(|e| BackendError::Io(e.to_string()))?;
        let page = workdir.path().join("page.html");
        let shot = workdir.path().join("shot.png");
        std::fs::write(&page, html).map_err(|e| BackendError::Io(e.to_string()))?;

        let width = options.width.unwrap_or(DEFAULT_VIEWPORT.0);
        let height = options.height.unwrap_or(DEFAULT_VIEWPORT.1);

        let mut command = Command::new(&self.binary);
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg(format!("--window-size={width},{height}"))
            .arg(format!("--virtual-time-budget={VIRTUAL_TIME_BUDGET_MS}"))
            .arg(format!("--screenshot={}", shot.display()));
        if options.transparent {
            command.arg("--default-background-color=00000000");
        }
        command.arg(format!("file://{}", page.display()));

        tracing::debug!(binary = %self.binary.display(), "launching headless browser");
        let output = command
            .output()
            .map_err(|e| BackendError::Io(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Browser(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        std::fs::read(&shot).map_err(|e| BackendError::Io(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_png_formats() {
        let backend = ChromiumBackend::new("/usr/bin/chromium");
        for format in [ImageFormat::Jpeg, ImageFormat::Svg] {
            let options = RenderOptions {
                format,
                ..RenderOptions::default()
            };
            let result = backend.render("<html></html>", &options);
            assert!(matches!(
                result,
                Err(BackendError::UnsupportedFormat {
                    backend: "chromium",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_missing_binary_is_io_error() {
        let backend = ChromiumBackend::new("/nonexistent/browser-binary");
        let result = backend.render("<html></html>", &RenderOptions::default());
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn test_explicit_binary_kept() {
        let backend = ChromiumBackend::new("/opt/chromium/chrome");
        assert_eq!(backend.binary(), Path::new("/opt/chromium/chrome"));
    }

    #[test]
    fn test_name() {
        assert_eq!(ChromiumBackend::new("chromium").name(), "chromium");
    }
}

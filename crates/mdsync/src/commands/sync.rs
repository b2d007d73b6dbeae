//! `mdsync sync` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use mdsync_config::{CliSettings, Config};
use mdsync_core::{Reporter, SyncSettings, Syncer};
use mdsync_render::{
    ChromiumBackend, ImageFormat, RenderBackend, RenderGateway, ScreenshotBackend,
};
use regex::Regex;

use crate::error::CliError;
use crate::output::{ConsoleReporter, Output};

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Print progress details.
    #[arg(short, long)]
    pub(crate) debug: bool,

    /// Directory name for generated images and code files (default: docs).
    #[arg(short = 'o', long)]
    images_output: Option<String>,

    /// Put all images in one directory at the search root.
    #[arg(short = 'c', long)]
    common_image_output: bool,

    /// Root directory to search for markdown files (default: current directory).
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Regex matched against root-relative file paths (default: README.md).
    #[arg(short, long)]
    markdown_file: Option<String>,

    /// Directory names to skip while searching.
    #[arg(short, long, num_args = 1..)]
    exclude: Vec<String>,

    /// Image format: png, jpeg or svg (default: png).
    #[arg(short, long)]
    format: Option<String>,

    /// Screenshot service URL; renders over HTTP instead of a local browser.
    #[arg(long)]
    screenshot_url: Option<String>,

    /// Browser binary to render with (default: auto-detect on PATH).
    #[arg(long)]
    chromium: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdsync.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, no rendering backend
    /// is available, or the search root cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.path,
            pattern: self.markdown_file,
            exclude: (!self.exclude.is_empty()).then_some(self.exclude),
            output_dir: self.images_output,
            common_output: self.common_image_output.then_some(true),
            format: self.format,
            screenshot_url: self.screenshot_url,
            chromium: self.chromium,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let format = ImageFormat::parse(&config.render.format).ok_or_else(|| {
            CliError::Validation(format!("unsupported image format '{}'", config.render.format))
        })?;
        let backend = select_backend(&config, format)?;
        let gateway = RenderGateway::new(backend, format);

        let settings = SyncSettings {
            root: config.search.root.clone(),
            file_pattern: Regex::new(&config.search.pattern)?,
            excluded_dirs: config.search.exclude.clone(),
            output_dir: config.output.dir.clone(),
            common_output: config.output.common,
        };

        if self.debug {
            output.info(&format!("Searching in {}", settings.root.display()));
            output.info(&format!("Pattern: {}", settings.file_pattern));
            output.info(&format!("Backend: {}", gateway.backend_name()));
        }

        let reporter: Box<dyn Reporter> = Box::new(ConsoleReporter::new(self.debug));
        let report = Syncer::new(settings, gateway, reporter).run()?;

        if report.documents == 0 {
            output.info("No documents with diagrams found.");
        } else {
            output.success(&format!(
                "Rendered {} diagram(s) in {} document(s).",
                report.rendered, report.documents
            ));
        }
        if report.skipped_blocks > 0 {
            output.warning(&format!("Skipped {} block(s).", report.skipped_blocks));
        }

        Ok(())
    }
}

/// Pick the rendering backend from configuration.
///
/// An explicit screenshot service wins; otherwise a local browser is
/// used, which limits output to PNG.
fn select_backend(config: &Config, format: ImageFormat) -> Result<Box<dyn RenderBackend>, CliError> {
    if let Some(url) = &config.render.screenshot_url {
        let timeout = Duration::from_secs(config.render.timeout_secs);
        return Ok(Box::new(ScreenshotBackend::with_timeout(
            url.clone(),
            timeout,
        )));
    }

    if format != ImageFormat::Png {
        return Err(CliError::Validation(format!(
            "a local browser only produces png; pass --screenshot-url for {}",
            format.as_str()
        )));
    }

    let backend = match &config.render.chromium {
        Some(binary) => ChromiumBackend::new(binary.clone()),
        None => ChromiumBackend::detect().ok_or_else(|| {
            CliError::Validation(
                "no browser binary found on PATH; install chromium, pass --chromium, \
                 or use --screenshot-url"
                    .to_owned(),
            )
        })?,
    };
    Ok(Box::new(backend))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_screenshot_url_selects_service_backend() {
        let mut config = Config::default();
        config.render.screenshot_url = Some("http://localhost:3000".to_owned());

        let backend = select_backend(&config, ImageFormat::Svg).unwrap();
        assert_eq!(backend.name(), "screenshot-service");
    }

    #[test]
    fn test_explicit_chromium_binary_used() {
        let mut config = Config::default();
        config.render.chromium = Some(PathBuf::from("/opt/chromium/chrome"));

        let backend = select_backend(&config, ImageFormat::Png).unwrap();
        assert_eq!(backend.name(), "chromium");
    }

    #[test]
    fn test_local_browser_rejects_non_png() {
        let mut config = Config::default();
        config.render.chromium = Some(PathBuf::from("/opt/chromium/chrome"));

        let result = select_backend(&config, ImageFormat::Svg);
        assert!(matches!(result, Err(CliError::Validation(_))));
    }
}

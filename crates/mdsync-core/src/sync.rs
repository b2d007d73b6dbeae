//! Sync orchestration.
//!
//! [`Syncer`] walks the search root, parses each matching document,
//! resolves and renders every diagram block, and writes documents back
//! when their serialized text changed. Per-block and per-document
//! failures go to the [`Reporter`]; only an unreadable search root
//! aborts the run.

use std::io;
use std::path::{Path, PathBuf};

use mdsync_render::{RenderGateway, RenderRequest};
use regex::Regex;

use crate::report::Reporter;
use crate::resolve::{IdGenerator, ResolveError, resolve};
use crate::rewrite::{relative_dir, rewrite};
use crate::scanner::scan;
use crate::sidecar::SidecarCache;
use crate::walker::find_documents;

/// Where and what to sync.
#[derive(Debug)]
pub struct SyncSettings {
    /// Directory tree to search.
    pub root: PathBuf,
    /// Matched against each file's root-relative path.
    pub file_pattern: Regex,
    /// Directory names pruned during the walk.
    pub excluded_dirs: Vec<String>,
    /// Artifact directory name, relative to each document (or to the
    /// root when `common_output` is set).
    pub output_dir: String,
    /// Share one artifact directory at the search root.
    pub common_output: bool,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents containing at least one diagram block.
    pub documents: usize,
    /// Blocks rendered and rewritten.
    pub rendered: usize,
    /// Blocks skipped after a resolution or rendering failure.
    pub skipped_blocks: usize,
}

/// Fatal sync failure.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("cannot read search root {}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Drives a full sync run over a document tree.
pub struct Syncer {
    settings: SyncSettings,
    gateway: RenderGateway,
    reporter: Box<dyn Reporter>,
    ids: IdGenerator,
}

impl Syncer {
    #[must_use]
    pub fn new(settings: SyncSettings, gateway: RenderGateway, reporter: Box<dyn Reporter>) -> Self {
        Self {
            settings,
            gateway,
            reporter,
            ids: IdGenerator::new(),
        }
    }

    /// Replace the identifier generator. Used by tests for determinism.
    #[must_use]
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Run the sync and return the counters.
    pub fn run(&mut self) -> Result<SyncReport, SyncError> {
        std::fs::read_dir(&self.settings.root).map_err(|source| SyncError::Root {
            path: self.settings.root.clone(),
            source,
        })?;

        let documents = find_documents(
            &self.settings.root,
            &self.settings.file_pattern,
            &self.settings.excluded_dirs,
            self.reporter.as_ref(),
        );
        self.reporter
            .debug(&format!("found {} matching file(s)", documents.len()));

        let mut report = SyncReport::default();
        for path in documents {
            self.sync_document(&path, &mut report);
        }
        Ok(report)
    }

    fn sync_document(&mut self, path: &Path, report: &mut SyncReport) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                self.reporter.error(path, &format!("cannot read file: {err}"));
                return;
            }
        };

        let mut doc = scan(path, &text);
        if doc.diagram_count() == 0 {
            return;
        }
        report.documents += 1;
        self.reporter.debug(&format!(
            "{}: {} diagram block(s)",
            doc.path().display(),
            doc.diagram_count()
        ));

        let doc_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let (artifact_dir, src_prefix) = if self.settings.common_output {
            let shared = self.settings.root.join(&self.settings.output_dir);
            let prefix = relative_dir(doc_dir, &shared);
            (shared, prefix)
        } else {
            (
                doc_dir.join(&self.settings.output_dir),
                self.settings.output_dir.clone(),
            )
        };
        let cache = SidecarCache::new(&artifact_dir);

        for block in doc.blocks_mut() {
            let resolution = match resolve(block, &mut self.ids, &cache) {
                Ok(resolution) => resolution,
                Err(err @ ResolveError::MissingSource { .. }) => {
                    self.reporter.warning(path, &err.to_string());
                    report.skipped_blocks += 1;
                    continue;
                }
                Err(err) => {
                    self.reporter.error(path, &err.to_string());
                    report.skipped_blocks += 1;
                    continue;
                }
            };

            let request = RenderRequest {
                width: block.attrs.width(),
                height: block.attrs.height(),
                transparent: block.attrs.transparent(),
            };
            let artifact = match self.gateway.render(
                &artifact_dir,
                &resolution.source,
                &resolution.file_stem,
                &request,
            ) {
                Ok(artifact) => artifact,
                Err(err) => {
                    self.reporter.error(
                        path,
                        &format!("render failed for block {}: {err}", resolution.identifier),
                    );
                    report.skipped_blocks += 1;
                    continue;
                }
            };

            let filename = artifact
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            rewrite(block, &format!("{src_prefix}/{filename}"), &src_prefix);
            report.rendered += 1;
        }

        let updated = doc.to_text();
        if updated != text {
            if let Err(err) = std::fs::write(path, &updated) {
                self.reporter
                    .error(path, &format!("cannot write file: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mdsync_render::{BackendError, ImageFormat, RenderBackend, RenderOptions};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Minimal PNG header with 100x50 dimensions.
    fn tiny_png() -> Vec<u8> {
        let mut data = vec![
            0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
            0x00, 0x00, 0x00, 0x0D, // IHDR length
            b'I', b'H', b'D', b'R', // IHDR type
            0x00, 0x00, 0x00, 0x64, // width = 100
            0x00, 0x00, 0x00, 0x32, // height = 50
        ];
        data.extend_from_slice(&[0; 5]);
        data
    }

    struct StubBackend;

    impl RenderBackend for StubBackend {
        fn render(&self, _html: &str, _options: &RenderOptions) -> Result<Vec<u8>, BackendError> {
            Ok(tiny_png())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct FailingBackend;

    impl RenderBackend for FailingBackend {
        fn render(&self, _html: &str, _options: &RenderOptions) -> Result<Vec<u8>, BackendError> {
            Err(BackendError::Browser("crashed".to_owned()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[derive(Default)]
    struct CollectingReporter {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Reporter for CollectingReporter {
        fn warning(&self, path: &Path, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("warning {}: {message}", path.display()));
        }

        fn error(&self, path: &Path, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {}: {message}", path.display()));
        }

        fn debug(&self, _message: &str) {}
    }

    fn syncer(root: &Path, common_output: bool, backend: Box<dyn RenderBackend>) -> Syncer {
        syncer_with_events(root, common_output, backend).0
    }

    fn syncer_with_events(
        root: &Path,
        common_output: bool,
        backend: Box<dyn RenderBackend>,
    ) -> (Syncer, Arc<Mutex<Vec<String>>>) {
        let reporter = CollectingReporter::default();
        let events = Arc::clone(&reporter.events);
        let settings = SyncSettings {
            root: root.to_path_buf(),
            file_pattern: Regex::new("README.md").unwrap(),
            excluded_dirs: vec![],
            output_dir: "docs".to_owned(),
            common_output,
        };
        let syncer = Syncer::new(
            settings,
            RenderGateway::new(backend, ImageFormat::Png),
            Box::new(reporter),
        )
        .with_id_generator(IdGenerator::with_seed(1000));
        (syncer, events)
    }

    #[test]
    fn test_first_run_assigns_id_renders_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(
            &readme,
            "# Project\n\n<div data-mermaid>\n<code>graph TD; A-->B;</code>\n</div>\n",
        )
        .unwrap();

        let report = syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();

        assert_eq!(
            report,
            SyncReport {
                documents: 1,
                rendered: 1,
                skipped_blocks: 0
            }
        );

        let text = std::fs::read_to_string(&readme).unwrap();
        assert!(text.starts_with("# Project\n\n"));
        assert!(text.contains("<div data-mermaid=\"1000\">"));
        assert!(text.contains("<!-- Code file located in docs -->"));
        assert!(text.contains("<img src=\"docs/diagram-1000.png\" title=\"\" alt=\"\"/>"));
        assert!(!text.contains("<code>"));

        let docs = dir.path().join("docs");
        assert_eq!(
            std::fs::read_to_string(docs.join("code-1000.txt")).unwrap(),
            "graph TD; A-->B;"
        );
        assert_eq!(std::fs::read(docs.join("diagram-1000.png")).unwrap(), tiny_png());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(
            &readme,
            "<div data-mermaid>\n<code>graph TD</code>\n</div>\n",
        )
        .unwrap();

        syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();
        let after_first = std::fs::read_to_string(&readme).unwrap();

        // Second run recovers the source from the sidecar.
        let report = syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();

        assert_eq!(report.rendered, 1);
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), after_first);
    }

    #[test]
    fn test_custom_image_name_slugged_into_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(
            &readme,
            "<div data-mermaid data-image=\"My Custom Name\">\n<code>graph TD</code>\n</div>\n",
        )
        .unwrap();

        syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();

        let text = std::fs::read_to_string(&readme).unwrap();
        assert!(text.contains("src=\"docs/diagram-my-custom-name.png\""));
        assert!(dir.path().join("docs/diagram-my-custom-name.png").exists());
        // Sidecar stays keyed by identifier, not by image name.
        assert!(dir.path().join("docs/code-1000.txt").exists());
    }

    #[test]
    fn test_block_without_source_warned_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        let original = "<div data-mermaid=\"77\">\n</div>\n";
        std::fs::write(&readme, original).unwrap();

        let mut syncer = syncer(dir.path(), false, Box::new(StubBackend));
        let report = syncer.run().unwrap();

        assert_eq!(
            report,
            SyncReport {
                documents: 1,
                rendered: 0,
                skipped_blocks: 1
            }
        );
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), original);
    }

    #[test]
    fn test_render_failure_leaves_document_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        let original = "<div data-mermaid=\"5\">\n<code>graph TD</code>\n</div>\n";
        std::fs::write(&readme, original).unwrap();

        let report = syncer(dir.path(), false, Box::new(FailingBackend))
            .run()
            .unwrap();

        assert_eq!(report.rendered, 0);
        assert_eq!(report.skipped_blocks, 1);
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), original);
    }

    #[test]
    fn test_common_output_shares_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub/inner/README.md");
        std::fs::create_dir_all(nested.parent().unwrap()).unwrap();
        std::fs::write(
            &nested,
            "<div data-mermaid>\n<code>graph TD</code>\n</div>\n",
        )
        .unwrap();

        syncer(dir.path(), true, Box::new(StubBackend))
            .run()
            .unwrap();

        let text = std::fs::read_to_string(&nested).unwrap();
        assert!(text.contains("src=\"../../docs/diagram-1000.png\""));
        assert!(text.contains("<!-- Code file located in ../../docs -->"));
        assert!(dir.path().join("docs/diagram-1000.png").exists());
        assert!(dir.path().join("docs/code-1000.txt").exists());
        assert!(!dir.path().join("sub/inner/docs").exists());
    }

    #[test]
    fn test_multiple_blocks_get_distinct_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(
            &readme,
            concat!(
                "<div data-mermaid>\n<code>one</code>\n</div>\n",
                "<div data-mermaid>\n<code>two</code>\n</div>\n",
            ),
        )
        .unwrap();

        let report = syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();

        assert_eq!(report.rendered, 2);
        let text = std::fs::read_to_string(&readme).unwrap();
        assert!(text.contains("data-mermaid=\"1000\""));
        assert!(text.contains("data-mermaid=\"1001\""));
        assert!(dir.path().join("docs/code-1000.txt").exists());
        assert!(dir.path().join("docs/code-1001.txt").exists());
    }

    #[test]
    fn test_document_without_blocks_not_counted_or_touched() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(&readme, "# Nothing here\n").unwrap();
        let before = std::fs::metadata(&readme).unwrap().modified().unwrap();

        let report = syncer(dir.path(), false, Box::new(StubBackend))
            .run()
            .unwrap();

        assert_eq!(report, SyncReport::default());
        assert_eq!(
            std::fs::metadata(&readme).unwrap().modified().unwrap(),
            before
        );
    }

    #[test]
    fn test_unreadable_document_reported_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("a/README.md");
        std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
        // Not valid UTF-8, so the read fails.
        std::fs::write(&bad, [0xFF, 0xFE, 0xFD]).unwrap();
        let good = dir.path().join("b/README.md");
        std::fs::create_dir_all(good.parent().unwrap()).unwrap();
        std::fs::write(&good, "<div data-mermaid>\n<code>graph TD</code>\n</div>\n").unwrap();

        let (mut syncer, events) = syncer_with_events(dir.path(), false, Box::new(StubBackend));
        let report = syncer.run().unwrap();

        assert_eq!(
            report,
            SyncReport {
                documents: 1,
                rendered: 1,
                skipped_blocks: 0
            }
        );
        assert!(good.parent().unwrap().join("docs/diagram-1000.png").exists());
        let events = events.lock().unwrap();
        assert!(
            events
                .iter()
                .any(|e| e.starts_with("error") && e.contains("cannot read file")),
            "events: {events:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_document_reported_after_render() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(
            &readme,
            "<div data-mermaid>\n<code>graph TD</code>\n</div>\n",
        )
        .unwrap();
        std::fs::set_permissions(&readme, std::fs::Permissions::from_mode(0o444)).unwrap();
        if std::fs::OpenOptions::new().write(true).open(&readme).is_ok() {
            // Permissions are not enforced for this user (root); nothing to test.
            return;
        }

        let (mut syncer, events) = syncer_with_events(dir.path(), false, Box::new(StubBackend));
        let report = syncer.run().unwrap();

        // The render itself succeeded; only the write-back failed.
        assert_eq!(report.rendered, 1);
        assert!(dir.path().join("docs/diagram-1000.png").exists());
        let events = events.lock().unwrap();
        assert!(
            events
                .iter()
                .any(|e| e.starts_with("error") && e.contains("cannot write file")),
            "events: {events:?}"
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = syncer(&missing, false, Box::new(StubBackend)).run();
        assert!(matches!(result, Err(SyncError::Root { .. })));
    }
}

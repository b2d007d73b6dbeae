//! Identifier and source resolution for diagram blocks.
//!
//! Every block needs a stable identifier and a diagram source before it
//! can be rendered. Identifiers come from the block itself or from a
//! monotonic generator; source comes from the inline `<code>` child
//! (stored to the sidecar cache on first sight) or from a previously
//! stored sidecar.

use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::document::DiagramBlock;
use crate::sidecar::SidecarCache;

/// Monotonic identifier source for blocks without one.
///
/// Seeded from the epoch millisecond clock so identifiers from separate
/// runs rarely collide, then strictly incrementing so identifiers within
/// a run never do.
#[derive(Debug)]
pub struct IdGenerator {
    next_id: u64,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::with_seed(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Start from a fixed value. Used by tests for determinism.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { next_id: seed }
    }

    pub fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase a name into a filename-safe slug.
///
/// ASCII alphanumerics survive (lowercased), every other run collapses
/// to a single `-`, with no leading or trailing separator.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Normalize a block identifier for use in filenames.
///
/// Purely numeric identifiers pass through verbatim; anything else is
/// slugified.
#[must_use]
pub fn normalize_identifier(id: &str) -> String {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        id.to_owned()
    } else {
        slugify(id)
    }
}

/// Outcome of resolving a block: what to render and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Normalized identifier, also the sidecar key.
    pub identifier: String,
    /// Artifact filename stem (custom image name wins over the id).
    pub file_stem: String,
    /// Diagram source to render.
    pub source: String,
}

/// Why a block could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No inline source and no sidecar for the identifier.
    #[error("no diagram source: block {identifier} has no <code> child and no stored sidecar")]
    MissingSource { identifier: String },
    /// Sidecar store or load failed.
    #[error("sidecar cache failure for block {identifier}")]
    Cache {
        identifier: String,
        #[source]
        source: io::Error,
    },
}

/// Resolve a block's identifier and source.
///
/// Assigns a fresh identifier to blocks without one (mutating the block
/// so the assignment is written back). Inline source is stored to the
/// sidecar cache when no sidecar exists yet; blocks without inline
/// source fall back to the stored sidecar.
pub fn resolve(
    block: &mut DiagramBlock,
    ids: &mut IdGenerator,
    cache: &SidecarCache,
) -> Result<Resolution, ResolveError> {
    let raw_id = match block.attrs.identifier() {
        Some(id) => id.to_owned(),
        None => {
            let id = ids.next().to_string();
            block.set_identifier(&id);
            id
        }
    };
    let identifier = normalize_identifier(&raw_id);
    // An image name that slugifies to nothing cannot name a file.
    let file_stem = block
        .attrs
        .image()
        .map(slugify)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| identifier.clone());

    let source = match block.inline_source() {
        Some(inline) => {
            let inline = inline.to_owned();
            cache
                .store_if_absent(&identifier, &inline)
                .map_err(|source| ResolveError::Cache {
                    identifier: identifier.clone(),
                    source,
                })?;
            inline
        }
        None => cache
            .load(&identifier)
            .map_err(|source| ResolveError::Cache {
                identifier: identifier.clone(),
                source,
            })?
            .filter(|stored| !stored.is_empty())
            .ok_or_else(|| ResolveError::MissingSource {
                identifier: identifier.clone(),
            })?,
    };

    Ok(Resolution {
        identifier,
        file_stem,
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::Node;
    use crate::scanner::scan;

    fn block_from(text: &str) -> DiagramBlock {
        let doc = scan(Path::new("README.md"), text);
        match doc.nodes.into_iter().find_map(|n| match n {
            Node::Diagram(b) => Some(b),
            Node::Text(_) => None,
        }) {
            Some(b) => b,
            None => panic!("no diagram block in fixture"),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Custom Name"), "my-custom-name");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
        assert_eq!(slugify("v2.1/flow(final)"), "v2-1-flow-final");
        assert_eq!(slugify("already-clean"), "already-clean");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("1700000000000"), "1700000000000");
        assert_eq!(normalize_identifier("My Flow"), "my-flow");
        assert_eq!(normalize_identifier("12a"), "12a");
    }

    #[test]
    fn test_id_generator_monotonic() {
        let mut ids = IdGenerator::with_seed(100);
        assert_eq!(ids.next(), 100);
        assert_eq!(ids.next(), 101);
        assert_eq!(ids.next(), 102);
    }

    #[test]
    fn test_assigns_identifier_and_stores_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        let mut ids = IdGenerator::with_seed(500);
        let mut block = block_from("<div data-mermaid>\n<code>graph TD</code>\n</div>");

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();

        assert_eq!(resolution.identifier, "500");
        assert_eq!(resolution.file_stem, "500");
        assert_eq!(resolution.source, "graph TD");
        assert_eq!(block.attrs.identifier(), Some("500"));
        assert_eq!(cache.load("500").unwrap().as_deref(), Some("graph TD"));
    }

    #[test]
    fn test_existing_identifier_kept() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        let mut ids = IdGenerator::with_seed(500);
        let mut block = block_from("<div data-mermaid=\"42\">\n<code>graph LR</code>\n</div>");

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();

        assert_eq!(resolution.identifier, "42");
        assert_eq!(ids.next(), 500, "generator untouched");
    }

    #[test]
    fn test_custom_image_name_becomes_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        let mut ids = IdGenerator::with_seed(1);
        let mut block = block_from(
            "<div data-mermaid=\"9\" data-image=\"My Custom Name\">\n<code>graph</code>\n</div>",
        );

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();

        assert_eq!(resolution.identifier, "9");
        assert_eq!(resolution.file_stem, "my-custom-name");
    }

    #[test]
    fn test_unusable_image_name_falls_back_to_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        let mut ids = IdGenerator::with_seed(1);
        let mut block =
            block_from("<div data-mermaid=\"9\" data-image=\"***\">\n<code>graph</code>\n</div>");

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();
        assert_eq!(resolution.file_stem, "9");
    }

    #[test]
    fn test_source_recovered_from_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        cache.store_if_absent("7", "stored source").unwrap();
        let mut ids = IdGenerator::with_seed(1);
        let mut block = block_from("<div data-mermaid=\"7\">\n</div>");

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();
        assert_eq!(resolution.source, "stored source");
    }

    #[test]
    fn test_inline_source_does_not_clobber_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        cache.store_if_absent("7", "first version").unwrap();
        let mut ids = IdGenerator::with_seed(1);
        let mut block = block_from("<div data-mermaid=\"7\">\n<code>second version</code>\n</div>");

        let resolution = resolve(&mut block, &mut ids, &cache).unwrap();

        // Inline source renders, the stored sidecar stays untouched.
        assert_eq!(resolution.source, "second version");
        assert_eq!(cache.load("7").unwrap().as_deref(), Some("first version"));
    }

    #[test]
    fn test_missing_source_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SidecarCache::new(dir.path());
        let mut ids = IdGenerator::with_seed(1);
        let mut block = block_from("<div data-mermaid=\"ghost\">\n</div>");

        let err = resolve(&mut block, &mut ids, &cache).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingSource { identifier } if identifier == "ghost"
        ));
    }
}

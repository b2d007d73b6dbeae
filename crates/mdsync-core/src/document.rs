//! Mutable parse tree for documents containing diagram blocks.
//!
//! A [`Document`] is an ordered sequence of nodes: raw text slices and
//! diagram blocks. Blocks keep the original bytes of their open/close tags
//! and inner children, so an untouched block serializes back to exactly
//! the text it was scanned from. Mutation happens through narrow methods
//! ([`DiagramBlock::set_identifier`], [`DiagramBlock::replace_marker`],
//! [`DiagramBlock::replace_code_with_note`]) that the resolver and
//! rewriter use; everything else is preserved.

use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Attribute list parsed from a diagram container's open tag.
///
/// An order-preserving open mapping. Bare attributes (`data-mermaid` with
/// no value) carry `None`; `get` reports them as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAttrs {
    entries: Vec<(String, Option<String>)>,
}

impl BlockAttrs {
    pub(crate) fn from_entries(entries: Vec<(String, Option<String>)>) -> Self {
        Self { entries }
    }

    /// Look up an attribute by full name. Bare attributes yield `""`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Look up a `data-*` attribute by its key (without the prefix).
    fn data(&self, key: &str) -> Option<&str> {
        let name = format!("data-{key}");
        self.get(&name)
    }

    /// The block identifier, when one has been assigned.
    ///
    /// A bare or empty `data-mermaid` marks the block but carries no
    /// identifier yet.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.data("mermaid").filter(|v| !v.is_empty())
    }

    /// Title used for the artifact's `title`/`alt` text.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.data("title").filter(|v| !v.is_empty())
    }

    /// Custom artifact base name.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.data("image").filter(|v| !v.is_empty())
    }

    /// Requested viewport width in pixels. Non-numeric values are ignored.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.data("width").and_then(|v| v.parse().ok())
    }

    /// Requested viewport height in pixels. Non-numeric values are ignored.
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.data("height").and_then(|v| v.parse().ok())
    }

    /// Whether the artifact background should be transparent.
    ///
    /// Only the explicit value `"true"` enables it; a bare attribute does
    /// not.
    #[must_use]
    pub fn transparent(&self) -> bool {
        self.data("transparent") == Some("true")
    }

    /// Set an attribute, replacing an existing entry (bare or valued) or
    /// appending a new one.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = Some(value.to_owned());
        } else {
            self.entries.push((name.to_owned(), Some(value.to_owned())));
        }
    }

    /// Rebuild the container's open tag from the attribute list.
    ///
    /// Only used when the identifier was newly assigned; otherwise the
    /// original tag text is emitted verbatim.
    pub(crate) fn to_open_tag(&self) -> String {
        let mut tag = String::from("<div");
        for (name, value) in &self.entries {
            match value {
                Some(v) => {
                    let _ = write!(tag, " {name}=\"{v}\"");
                }
                None => {
                    let _ = write!(tag, " {name}");
                }
            }
        }
        tag.push('>');
        tag
    }
}

/// A child of a diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerNode {
    /// Untouched content, emitted verbatim.
    Raw(String),
    /// Inline diagram source: the full `<code>…</code>` span plus the
    /// extracted literal source text.
    Code { raw: String, source: String },
    /// A previously inserted artifact container
    /// (`<div class="data-diagram">…</div>`).
    Marker { raw: String },
}

/// A recognized diagram container within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Attributes parsed from the open tag.
    pub attrs: BlockAttrs,
    open_raw: String,
    close_raw: String,
    inner: Vec<InnerNode>,
    id_assigned: bool,
}

impl DiagramBlock {
    pub(crate) fn new(
        open_raw: String,
        attrs: BlockAttrs,
        inner: Vec<InnerNode>,
        close_raw: String,
    ) -> Self {
        Self {
            attrs,
            open_raw,
            close_raw,
            inner,
            id_assigned: false,
        }
    }

    /// Inline diagram source from the block's `<code>` child, if any.
    ///
    /// An empty code element counts as absent, matching the sidecar
    /// fallback behavior.
    #[must_use]
    pub fn inline_source(&self) -> Option<&str> {
        self.inner.iter().find_map(|node| match node {
            InnerNode::Code { source, .. } if !source.is_empty() => Some(source.as_str()),
            _ => None,
        })
    }

    /// Whether the block already carries a rendered-artifact marker.
    #[must_use]
    pub fn has_marker(&self) -> bool {
        self.inner
            .iter()
            .any(|node| matches!(node, InnerNode::Marker { .. }))
    }

    /// Assign the block identifier, persisting it into the open tag on
    /// serialization.
    pub fn set_identifier(&mut self, id: &str) {
        self.attrs.set("data-mermaid", id);
        self.id_assigned = true;
    }

    /// Replace the inline `<code>` child with a note pointing at the
    /// sidecar location. No-op when the block has no code child.
    pub fn replace_code_with_note(&mut self, note: &str) {
        for node in &mut self.inner {
            if matches!(node, InnerNode::Code { .. }) {
                *node = InnerNode::Raw(note.to_owned());
                return;
            }
        }
    }

    /// Remove every existing artifact marker and append exactly one new
    /// one, so duplicate artifacts never accumulate.
    pub fn replace_marker(&mut self, markup: &str) {
        self.inner
            .retain(|node| !matches!(node, InnerNode::Marker { .. }));
        self.inner.push(InnerNode::Marker {
            raw: markup.to_owned(),
        });
    }

    /// Serialize the block back to text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.id_assigned {
            out.push_str(&self.attrs.to_open_tag());
        } else {
            out.push_str(&self.open_raw);
        }
        for node in &self.inner {
            match node {
                InnerNode::Raw(raw)
                | InnerNode::Code { raw, .. }
                | InnerNode::Marker { raw } => out.push_str(raw),
            }
        }
        out.push_str(&self.close_raw);
        out
    }
}

/// A structural node in a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Content outside recognized diagram blocks, preserved exactly.
    Text(String),
    /// A recognized diagram block.
    Diagram(DiagramBlock),
}

/// A parsed document: ordered nodes plus the source path.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    /// Ordered structural nodes.
    pub nodes: Vec<Node>,
}

impl Document {
    pub(crate) fn new(path: &Path, nodes: Vec<Node>) -> Self {
        Self {
            path: path.to_path_buf(),
            nodes,
        }
    }

    /// Path the document was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of diagram blocks in the document.
    #[must_use]
    pub fn diagram_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Diagram(_)))
            .count()
    }

    /// Iterate diagram blocks mutably, in document order.
    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut DiagramBlock> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Diagram(block) => Some(block),
            Node::Text(_) => None,
        })
    }

    /// Serialize the document back to text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Diagram(block) => out.push_str(&block.to_text()),
            }
        }
        out
    }
}

//! Locates diagram blocks inside raw document text.
//!
//! A single hand-rolled pass over the bytes: `<div>` containers carrying
//! the marker attribute become [`DiagramBlock`]s, everything else is kept
//! as raw text slices. Closing tags are matched with nesting-depth
//! tracking, attribute values are parsed quote-aware, and unterminated or
//! self-closing containers fall back to plain text rather than erroring.
//!
//! The pass is read-only; identifier assignment happens during
//! resolution, which writes back into the returned tree.

use std::path::Path;

use crate::document::{BlockAttrs, DiagramBlock, Document, InnerNode, Node};

/// Attribute that marks a container as a diagram block.
pub const MARKER_ATTR: &str = "data-mermaid";

/// Class of the container holding a previously rendered artifact.
pub(crate) const RENDERED_CLASS: &str = "data-diagram";

const CLOSE_TAG: &str = "</div>";

/// Parse document text into a [`Document`], locating diagram blocks.
#[must_use]
pub fn scan(path: &Path, text: &str) -> Document {
    let mut nodes = Vec::new();
    let mut raw_start = 0usize;
    let mut i = 0usize;

    while i < text.len() {
        let Some(offset) = text[i..].find('<') else {
            break;
        };
        let pos = i + offset;

        if !tag_starts_at(text, pos, "div") {
            i = pos + 1;
            continue;
        }
        let Some((entries, open_end, self_closing)) = parse_open_tag(text, pos, "div") else {
            i = pos + 1;
            continue;
        };
        let attrs = BlockAttrs::from_entries(entries);
        if self_closing || attrs.get(MARKER_ATTR).is_none() {
            i = open_end;
            continue;
        }
        let Some((close_start, close_end)) = find_nested_close(text, open_end) else {
            // Unterminated block: leave it as plain text.
            i = open_end;
            continue;
        };

        if pos > raw_start {
            nodes.push(Node::Text(text[raw_start..pos].to_owned()));
        }
        let inner = parse_inner(&text[open_end..close_start]);
        nodes.push(Node::Diagram(DiagramBlock::new(
            text[pos..open_end].to_owned(),
            attrs,
            inner,
            text[close_start..close_end].to_owned(),
        )));
        raw_start = close_end;
        i = close_end;
    }

    if raw_start < text.len() {
        nodes.push(Node::Text(text[raw_start..].to_owned()));
    }
    Document::new(path, nodes)
}

/// Parse a block's inner content into children: the first `<code>` child
/// becomes the inline source, `data-diagram` containers become markers,
/// everything else stays raw.
fn parse_inner(inner: &str) -> Vec<InnerNode> {
    let mut nodes = Vec::new();
    let mut raw_start = 0usize;
    let mut i = 0usize;
    let mut code_taken = false;

    while i < inner.len() {
        let Some(offset) = inner[i..].find('<') else {
            break;
        };
        let pos = i + offset;

        if !code_taken && tag_starts_at(inner, pos, "code") {
            if let Some((_, open_end, false)) = parse_open_tag(inner, pos, "code") {
                if let Some(rel) = inner[open_end..].find("</code>") {
                    let close_start = open_end + rel;
                    let end = close_start + "</code>".len();
                    if pos > raw_start {
                        nodes.push(InnerNode::Raw(inner[raw_start..pos].to_owned()));
                    }
                    nodes.push(InnerNode::Code {
                        raw: inner[pos..end].to_owned(),
                        source: inner[open_end..close_start].to_owned(),
                    });
                    code_taken = true;
                    raw_start = end;
                    i = end;
                    continue;
                }
            }
            i = pos + 1;
            continue;
        }

        if tag_starts_at(inner, pos, "div") {
            if let Some((entries, open_end, self_closing)) = parse_open_tag(inner, pos, "div") {
                let attrs = BlockAttrs::from_entries(entries);
                let is_marker = attrs
                    .get("class")
                    .is_some_and(|c| c.split_whitespace().any(|t| t == RENDERED_CLASS));
                if is_marker && !self_closing {
                    if let Some((_, close_end)) = find_nested_close(inner, open_end) {
                        if pos > raw_start {
                            nodes.push(InnerNode::Raw(inner[raw_start..pos].to_owned()));
                        }
                        nodes.push(InnerNode::Marker {
                            raw: inner[pos..close_end].to_owned(),
                        });
                        raw_start = close_end;
                        i = close_end;
                        continue;
                    }
                }
                i = open_end;
                continue;
            }
        }

        i = pos + 1;
    }

    if raw_start < inner.len() {
        nodes.push(InnerNode::Raw(inner[raw_start..].to_owned()));
    }
    nodes
}

/// Whether an open tag of the given element starts at `pos`.
///
/// Requires a boundary after the name so `<divider>` never matches `div`.
fn tag_starts_at(text: &str, pos: usize, name: &str) -> bool {
    let rest = &text[pos..];
    if !rest.starts_with('<') {
        return false;
    }
    let after = &rest[1..];
    if !after.starts_with(name) {
        return false;
    }
    matches!(
        after.as_bytes().get(name.len()),
        Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
    )
}

/// Parse an open tag starting at `pos` (pointing at `<`).
///
/// Returns the attribute entries, the index just past `>`, and whether
/// the tag was self-closing. `None` when the tag never terminates.
fn parse_open_tag(
    text: &str,
    pos: usize,
    name: &str,
) -> Option<(Vec<(String, Option<String>)>, usize, bool)> {
    let bytes = text.as_bytes();
    let mut i = pos + 1 + name.len();
    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => return Some((attrs, i + 1, false)),
            Some(b'/') if bytes.get(i + 1) == Some(&b'>') => return Some((attrs, i + 2, true)),
            Some(b'/' | b'=') => i += 1,
            Some(_) => {
                let name_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                let attr_name = text[name_start..i].to_owned();

                let mut j = i;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if bytes.get(j) == Some(&b'=') {
                    j += 1;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    let value = match bytes.get(j) {
                        Some(&quote @ (b'"' | b'\'')) => {
                            let start = j + 1;
                            let end = start + text[start..].find(char::from(quote))?;
                            i = end + 1;
                            text[start..end].to_owned()
                        }
                        _ => {
                            let start = j;
                            while j < bytes.len()
                                && !bytes[j].is_ascii_whitespace()
                                && bytes[j] != b'>'
                            {
                                j += 1;
                            }
                            i = j;
                            text[start..j].to_owned()
                        }
                    };
                    attrs.push((attr_name, Some(value)));
                } else {
                    attrs.push((attr_name, None));
                }
            }
        }
    }
}

/// Find the matching `</div>` for a container whose open tag ends at
/// `from`, tracking nested `<div>` depth.
///
/// Returns the close tag's start and end indices.
fn find_nested_close(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = from;

    while i < text.len() {
        let offset = text[i..].find('<')?;
        let pos = i + offset;
        if text[pos..].starts_with(CLOSE_TAG) {
            depth -= 1;
            if depth == 0 {
                return Some((pos, pos + CLOSE_TAG.len()));
            }
            i = pos + CLOSE_TAG.len();
        } else if tag_starts_at(text, pos, "div") {
            // A self-closing div never produces a matching close tag.
            match parse_open_tag(text, pos, "div") {
                Some((_, open_end, self_closing)) => {
                    if !self_closing {
                        depth += 1;
                    }
                    i = open_end;
                }
                None => i = pos + 4,
            }
        } else {
            i = pos + 1;
        }
    }
    None
}

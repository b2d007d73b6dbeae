//! Block rewriting after a successful render.
//!
//! Replaces the inline `<code>` child with a pointer comment and swaps
//! the artifact marker for one referencing the freshly rendered image.
//! Running the same rewrite twice produces identical text.

use std::path::{Component, Path};

use crate::document::DiagramBlock;
use crate::scanner::RENDERED_CLASS;

/// Rewrite a rendered block in place.
///
/// `image_src` is the path to embed in the `<img>` tag, `sidecar_dir`
/// the directory named in the pointer comment left where the inline
/// source used to be.
pub fn rewrite(block: &mut DiagramBlock, image_src: &str, sidecar_dir: &str) {
    let title = block.attrs.title().unwrap_or_default().to_owned();
    let note = format!("<!-- Code file located in {sidecar_dir} -->");
    let marker = format!(
        "<div class=\"{RENDERED_CLASS}\">\n<img src=\"{image_src}\" title=\"{title}\" alt=\"{title}\"/>\n</div>"
    );
    block.replace_code_with_note(&note);
    block.replace_marker(&marker);
}

/// Relative path from one directory to another, `/`-separated.
///
/// Strips the common prefix component-wise and climbs with `..` for
/// what remains of `from`. Returns `.` when the directories coincide.
#[must_use]
pub fn relative_dir(from: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_owned(); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

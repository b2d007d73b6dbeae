//! Rendering page construction.
//!
//! The backend renders a minimal HTML document: the mermaid distribution,
//! an initializer, and a `.mermaid` container holding the diagram source.
//! Width/height attributes become a body style so the viewport matches the
//! requested dimensions.

use std::fmt::Write;

use crate::consts::MERMAID_CDN;

/// Build the rendering page for a diagram source.
///
/// The source is embedded literally; no entity encoding is applied, so
/// mermaid arrow syntax (`-->`) survives untouched.
#[must_use]
pub fn build_page(source: &str, width: Option<u32>, height: Option<u32>) -> String {
    let mut head = format!(
        "<script src=\"{MERMAID_CDN}\"></script>\n\
         <script>mermaid.initialize({{startOnLoad:true}});</script>"
    );

    if width.is_some() || height.is_some() {
        let mut body = String::from("body {");
        if let Some(w) = width {
            let _ = write!(body, " width: {w}px;");
        }
        if let Some(h) = height {
            let _ = write!(body, " height: {h}px;");
        }
        body.push_str(" }");
        let _ = write!(head, "\n<style>{body}</style>");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n{head}\n</head>\n<body>\n\
         <div class=\"mermaid\">{source}</div>\n</body>\n</html>\n"
    )
}

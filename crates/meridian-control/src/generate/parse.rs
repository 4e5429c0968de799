//! Extraction of site files from raw backend output.
//!
//! Backends are asked for a fenced ```html block and a fenced ```markdown
//! README, but answers drift; extraction is lenient and an empty result is
//! a valid outcome (the publisher substitutes defaults), never an error.

use crate::types::SiteArtifact;

const DOCTYPE: &str = "<!DOCTYPE html>";
const HTML_CLOSE: &str = "</html>";

/// Parse a backend response into a [`SiteArtifact`].
#[must_use]
pub fn parse_response(text: &str) -> SiteArtifact {
    SiteArtifact {
        index_html: extract_html(text).unwrap_or_default(),
        readme: extract_fenced(text, &["```markdown", "```md"]).unwrap_or_default(),
    }
}

/// The HTML file: first a fenced ```html block, then a bare document span.
fn extract_html(text: &str) -> Option<String> {
    extract_fenced(text, &["```html"]).or_else(|| extract_document_span(text))
}

/// Extract the first properly terminated fenced block for any of `markers`,
/// tried in order. An unterminated fence is treated as not found.
fn extract_fenced(text: &str, markers: &[&str]) -> Option<String> {
    for marker in markers {
        let Some(start) = text.find(marker) else {
            continue;
        };
        let body = &text[start + marker.len()..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim().to_owned());
        }
    }
    None
}

/// Extract a `<!DOCTYPE html>` ... `</html>` span, inclusive.
fn extract_document_span(text: &str) -> Option<String> {
    let start = text.find(DOCTYPE)?;
    let rest = &text[start..];
    let end = rest.find(HTML_CLOSE)?;
    Some(rest[..end + HTML_CLOSE.len()].trim().to_owned())
}

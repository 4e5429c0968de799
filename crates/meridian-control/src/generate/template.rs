//! Deterministic site rendering.
//!
//! The last resort of the backend chain, and the source of the default
//! content the publisher substitutes when a generated file is empty. Never
//! fails.

use crate::types::SiteArtifact;

/// Requirements section line used when no checks were supplied.
const NO_CHECKS_PLACEHOLDER: &str = "No specific checks provided.";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Application</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body {
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }
        .container {
            background: white;
            border-radius: 10px;
            padding: 30px;
            box-shadow: 0 10px 40px rgba(0,0,0,0.2);
            margin-top: 50px;
        }
        .app-title {
            color: #667eea;
            margin-bottom: 30px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1 class="app-title">Generated Application</h1>
        <div class="alert alert-info">
            <h5>Brief:</h5>
            <p>"#;

const PAGE_TAIL: &str = r#"</p>
        </div>

        <div id="app-content">
            <p class="text-muted">Application implementation goes here.</p>
        </div>
    </div>

    <script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>
    <script>
        console.log('Application initialized');
    </script>
</body>
</html>"#;

/// Render the full fallback artifact for a brief.
#[must_use]
pub fn render(brief: &str, checks: &[String]) -> SiteArtifact {
    SiteArtifact {
        index_html: render_page(brief),
        readme: render_readme("Generated Application", brief, checks),
    }
}

/// Render the fallback page with the brief embedded.
#[must_use]
pub fn render_page(brief: &str) -> String {
    let brief = escape_html(brief);
    format!("{PAGE_HEAD}{brief}{PAGE_TAIL}")
}

/// Render the canonical README for a generated application.
///
/// Shared by the template fallback and the publisher's default-content
/// substitution; the Requirements section is always present, falling back
/// to a placeholder line when no checks were supplied.
#[must_use]
pub fn render_readme(title: &str, brief: &str, checks: &[String]) -> String {
    let requirements = if checks.is_empty() {
        NO_CHECKS_PLACEHOLDER.to_owned()
    } else {
        checks
            .iter()
            .map(|check| format!("- {check}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# {title}\n\
         \n\
         ## Overview\n\
         This application was automatically generated from the following brief:\n\
         \n\
         {brief}\n\
         \n\
         ## Requirements\n\
         {requirements}\n\
         \n\
         ## Usage\n\
         1. Visit the published site, or open `index.html` in a web browser\n\
         2. The application loads and runs automatically\n\
         \n\
         ## Technical Details\n\
         - Built with HTML5, CSS3, and JavaScript\n\
         - Uses Bootstrap 5 for styling\n\
         - Responsive design for all devices\n\
         \n\
         ## License\n\
         MIT, see the LICENSE file.\n"
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

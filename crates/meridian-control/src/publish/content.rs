//! Assembly of the file set committed to a site repository.

use chrono::{Datelike, Utc};

use crate::generate::template;
use crate::types::{DeployRequest, SiteArtifact};

/// Build the files to commit, as `(path, contents)` pairs.
///
/// A generated member that is empty or whitespace is replaced with the
/// template rendering for the same request, so the pushed repository always
/// carries a working page and a README.
#[must_use]
pub fn site_files(request: &DeployRequest, artifact: &SiteArtifact) -> Vec<(&'static str, String)> {
    let index_html = if artifact.index_html.trim().is_empty() {
        template::render_page(&request.brief)
    } else {
        artifact.index_html.clone()
    };

    let readme = if artifact.readme.trim().is_empty() {
        template::render_readme(&request.task, &request.brief, &request.checks)
    } else {
        artifact.readme.clone()
    };

    vec![
        ("index.html", index_html),
        ("README.md", readme),
        ("LICENSE", licence_text(Utc::now().year())),
    ]
}

/// MIT licence text for the generated repository.
#[must_use]
pub fn licence_text(year: i32) -> String {
    format!(
        r#"MIT License

Copyright (c) {year}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"#
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_request() -> DeployRequest {
        DeployRequest {
            email: "dev@example.com".to_owned(),
            task: "Clock App".to_owned(),
            round: 1,
            nonce: "abc123".to_owned(),
            brief: "Build a digital clock".to_owned(),
            checks: vec!["has title".to_owned()],
            evaluation_url: "https://eval.example.com/hook".to_owned(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_generated_content_passes_through() {
        let request = sample_request();
        let artifact = SiteArtifact {
            index_html: "<!DOCTYPE html><html><body>clock</body></html>".to_owned(),
            readme: "# Clock App".to_owned(),
        };

        let files = site_files(&request, &artifact);
        assert_eq!(files[0].0, "index.html");
        assert_eq!(files[0].1, artifact.index_html);
        assert_eq!(files[1].0, "README.md");
        assert_eq!(files[1].1, artifact.readme);
        assert_eq!(files[2].0, "LICENSE");
    }

    #[test]
    fn test_empty_members_get_template_content() {
        let request = sample_request();
        let artifact = SiteArtifact {
            index_html: "   \n".to_owned(),
            readme: String::new(),
        };

        let files = site_files(&request, &artifact);
        assert!(files[0].1.contains("<!DOCTYPE html>"));
        assert!(files[0].1.contains("Build a digital clock"));
        assert!(files[1].1.contains("# Clock App"));
        assert!(files[1].1.contains("has title"));
    }

    #[test]
    fn test_licence_is_mit_with_year() {
        let text = licence_text(2026);
        assert!(text.starts_with("MIT License"));
        assert!(text.contains("Copyright (c) 2026"));
    }
}

//! Prompt assembly for the generation backends.

use crate::types::DecodedAttachment;

/// System message sent with every backend request.
pub const SYSTEM_PROMPT: &str =
    "You are an expert web developer who creates clean, production-ready code.";

/// Attachment content shorter than this many chars is previewed in the prompt.
const PREVIEW_THRESHOLD: usize = 1000;

/// Maximum number of chars included in an attachment preview.
const PREVIEW_LEN: usize = 500;

/// Build the user prompt from the brief, checks, and decoded attachments.
#[must_use]
pub fn build_prompt(brief: &str, checks: &[String], attachments: &[DecodedAttachment]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Generate a complete, production-ready single-page web application \
         based on the following requirements:\n\nBRIEF:\n",
    );
    prompt.push_str(brief);
    prompt.push('\n');

    if !attachments.is_empty() {
        prompt.push_str("\nATTACHMENTS:\n");
        for attachment in attachments {
            prompt.push_str(&format!(
                "- {} ({})\n",
                attachment.name, attachment.mime_type
            ));
            if let Some(text) = attachment.as_text() {
                if text.chars().count() < PREVIEW_THRESHOLD {
                    let preview: String = text.chars().take(PREVIEW_LEN).collect();
                    prompt.push_str(&format!("  Content: {preview}...\n"));
                }
            }
        }
    }

    if !checks.is_empty() {
        prompt.push_str("\nVALIDATION CHECKS:\n");
        for check in checks {
            prompt.push_str(&format!("- {check}\n"));
        }
    }

    prompt.push_str(
        "\nREQUIREMENTS:\n\
         1. Create a single HTML file (index.html) with embedded CSS and JavaScript\n\
         2. Use modern, semantic HTML5\n\
         3. Include responsive design (mobile-friendly)\n\
         4. Use Bootstrap 5 from CDN for styling (unless specified otherwise)\n\
         5. Write clean, well-commented JavaScript\n\
         6. Handle errors gracefully\n\
         7. Make the page professional and user-friendly\n\
         8. Ensure all validation checks can pass\n\
         9. Include proper meta tags and title\n\
         \n\
         OUTPUT FORMAT:\n\
         Provide the complete code in the following structure:\n\
         \n\
         ```html\n\
         <!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
             <!-- Your complete head section -->\n\
         </head>\n\
         <body>\n\
             <!-- Your complete body content -->\n\
         </body>\n\
         </html>\n\
         ```\n\
         \n\
         Also provide a README.md in a ```markdown block explaining:\n\
         - What the application does\n\
         - How to use it\n\
         - Technical implementation details\n\
         - How it satisfies the requirements\n\
         \n\
         Generate ONLY production-ready, working code. No placeholders.",
    );

    prompt
}

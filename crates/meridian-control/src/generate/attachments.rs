//! Best-effort decoding of `data:` URI attachments.
//!
//! A decode failure is never an error: the attachment is logged and
//! dropped, and generation proceeds without it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::types::{Attachment, AttachmentContent, DecodedAttachment};

/// MIME types decoded to text rather than raw bytes.
const TEXTUAL_MIME_TYPES: [&str; 2] = ["application/json", "application/javascript"];

/// Decode every attachment that parses, dropping the rest.
#[must_use]
pub fn decode_all(attachments: &[Attachment]) -> Vec<DecodedAttachment> {
    attachments.iter().filter_map(decode_attachment).collect()
}

/// Decode a single `data:<mime>;base64,<content>` URI.
///
/// Returns `None` (after logging) for non-data URLs, undecodable base64,
/// and text-typed content that is not valid UTF-8.
#[must_use]
pub fn decode_attachment(attachment: &Attachment) -> Option<DecodedAttachment> {
    let Some(rest) = attachment.url.strip_prefix("data:") else {
        warn!(name = %attachment.name, "dropping attachment: not a data URI");
        return None;
    };
    let Some((header, encoded)) = rest.split_once(',') else {
        warn!(name = %attachment.name, "dropping attachment: malformed data URI");
        return None;
    };
    let mime_type = header.split(';').next().unwrap_or_default();

    let bytes = match STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(name = %attachment.name, error = %e, "dropping attachment: invalid base64");
            return None;
        }
    };

    let content = if is_textual(mime_type) {
        match String::from_utf8(bytes) {
            Ok(text) => AttachmentContent::Text(text),
            Err(e) => {
                warn!(name = %attachment.name, error = %e, "dropping attachment: not valid UTF-8");
                return None;
            }
        }
    } else {
        AttachmentContent::Binary(bytes)
    };

    Some(DecodedAttachment {
        name: attachment.name.clone(),
        mime_type: mime_type.to_owned(),
        content,
    })
}

fn is_textual(mime_type: &str) -> bool {
    mime_type.starts_with("text/") || TEXTUAL_MIME_TYPES.contains(&mime_type)
}

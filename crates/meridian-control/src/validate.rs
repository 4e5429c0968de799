//! Request validation and secret verification.
//!
//! Validation is structural only and performs no I/O; authentication is a
//! separate step so a payload can be rejected with the right status code
//! (400 for shape problems, 403 for a bad secret).

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::{DeployError, DeployResult};
use crate::types::{Attachment, DeployRequest};

/// Fields that must be present on every deployment payload.
const REQUIRED_FIELDS: [&str; 7] = [
    "email",
    "secret",
    "task",
    "round",
    "nonce",
    "brief",
    "evaluation_url",
];

/// Validate the raw payload and build a typed [`DeployRequest`].
///
/// All missing required fields are reported in one message rather than one
/// at a time. The `secret` field is checked for presence here but never
/// carried on the returned request; see [`provided_secret`].
pub fn parse_request(payload: &Value) -> DeployResult<DeployRequest> {
    let Some(object) = payload.as_object() else {
        return Err(DeployError::validation("Request body must be a JSON object"));
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(DeployError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let email = object.get("email").and_then(Value::as_str).unwrap_or_default();
    if !email_is_valid(email) {
        return Err(DeployError::validation("Invalid email format"));
    }

    let round = object.get("round").and_then(Value::as_u64).filter(|n| *n >= 1);
    let Some(round) = round else {
        return Err(DeployError::validation("Round must be a positive integer"));
    };

    let task = require_non_empty_str(object, "task", "Task")?;
    let nonce = require_non_empty_str(object, "nonce", "Nonce")?;
    let brief = require_non_empty_str(object, "brief", "Brief")?;

    let evaluation_url = object
        .get("evaluation_url")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !evaluation_url.starts_with("http") {
        return Err(DeployError::validation(
            "Evaluation URL must be a valid HTTP(S) URL",
        ));
    }

    let checks = parse_checks(object)?;
    let attachments = parse_attachments(object)?;

    Ok(DeployRequest {
        email: email.to_owned(),
        task: task.to_owned(),
        round,
        nonce: nonce.to_owned(),
        brief: brief.to_owned(),
        checks,
        evaluation_url: evaluation_url.to_owned(),
        attachments,
    })
}

/// Extract the secret from the raw payload, if it is a string.
///
/// A non-string secret is treated as absent and fails verification rather
/// than failing validation.
#[must_use]
pub fn provided_secret(payload: &Value) -> Option<&str> {
    payload.get("secret").and_then(Value::as_str)
}

/// Verify the provided secret against the configured one.
///
/// Denies every request when no secret is configured (an empty configured
/// value counts as unconfigured); the service never falls open. Comparison
/// is constant-time with a length pre-check.
#[must_use]
pub fn verify_secret(provided: Option<&str>, expected: Option<&SecretString>) -> bool {
    let Some(expected) = expected else {
        warn!("shared secret is not configured; denying request");
        return false;
    };
    let expected = expected.expose_secret();
    if expected.is_empty() {
        warn!("shared secret is empty; denying request");
        return false;
    }

    let Some(provided) = provided else {
        return false;
    };
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    }

    provided.ct_eq(expected).into()
}

fn email_is_valid(email: &str) -> bool {
    // The domain after the last '@' must contain a dot.
    match email.rsplit_once('@') {
        Some((_, domain)) => domain.contains('.'),
        None => false,
    }
}

fn require_non_empty_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    field: &str,
    label: &str,
) -> DeployResult<&'a str> {
    match object.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DeployError::validation(format!(
            "{label} must be a non-empty string"
        ))),
    }
}

fn parse_checks(object: &serde_json::Map<String, Value>) -> DeployResult<Vec<String>> {
    let Some(value) = object.get("checks") else {
        return Ok(Vec::new());
    };
    let Some(items) = value.as_array() else {
        return Err(DeployError::validation("Checks must be a list"));
    };

    let mut checks = Vec::with_capacity(items.len());
    for item in items {
        let Some(check) = item.as_str() else {
            return Err(DeployError::validation("Checks must be a list of strings"));
        };
        checks.push(check.to_owned());
    }
    Ok(checks)
}

fn parse_attachments(object: &serde_json::Map<String, Value>) -> DeployResult<Vec<Attachment>> {
    let Some(value) = object.get("attachments") else {
        return Ok(Vec::new());
    };
    let Some(items) = value.as_array() else {
        return Err(DeployError::validation("Attachments must be a list"));
    };

    let mut attachments = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Some(entry) = item.as_object() else {
            return Err(DeployError::validation(format!(
                "Attachment {idx} must be an object"
            )));
        };
        let name = entry.get("name").and_then(Value::as_str);
        let url = entry.get("url").and_then(Value::as_str);
        let (Some(name), Some(url)) = (name, url) else {
            return Err(DeployError::validation(format!(
                "Attachment {idx} must have 'name' and 'url' fields"
            )));
        };
        attachments.push(Attachment {
            name: name.to_owned(),
            url: url.to_owned(),
        });
    }
    Ok(attachments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "email": "dev@example.com",
            "secret": "hunter2",
            "task": "clock-app",
            "round": 1,
            "nonce": "abc-123",
            "brief": "Build a digital clock",
            "checks": ["has title"],
            "evaluation_url": "https://eval.example.com/hook",
        })
    }

    #[test]
    fn test_valid_payload_parses() {
        let request = parse_request(&valid_payload()).unwrap();
        assert_eq!(request.task, "clock-app");
        assert_eq!(request.round, 1);
        assert_eq!(request.checks, vec!["has title"]);
        assert!(request.attachments.is_empty());
    }

    #[test]
    fn test_all_missing_fields_reported_at_once() {
        let err = parse_request(&json!({ "task": "t" })).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Missing required fields: "));
        for field in ["email", "secret", "round", "nonce", "brief", "evaluation_url"] {
            assert!(message.contains(field), "missing {field} in: {message}");
        }
        assert!(!message.contains("task"));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = parse_request(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.to_string(), "Request body must be a JSON object");
    }

    #[test]
    fn test_email_validation() {
        let mut payload = valid_payload();
        for bad in ["no-at-sign", "user@nodot", "user@", "@", "a@b.c@d"] {
            payload["email"] = json!(bad);
            let err = parse_request(&payload).unwrap_err();
            assert_eq!(err.to_string(), "Invalid email format", "for {bad}");
        }
        // Domain after the last '@' is what counts.
        payload["email"] = json!("odd@but@valid.example");
        assert!(parse_request(&payload).is_ok());
    }

    #[test]
    fn test_round_must_be_positive_integer() {
        let mut payload = valid_payload();
        for bad in [json!(0), json!(-3), json!(2.5), json!(true), json!("3")] {
            payload["round"] = bad.clone();
            let err = parse_request(&payload).unwrap_err();
            assert_eq!(err.to_string(), "Round must be a positive integer", "for {bad}");
        }
        payload["round"] = json!(7);
        assert_eq!(parse_request(&payload).unwrap().round, 7);
    }

    #[test]
    fn test_text_fields_must_be_non_empty() {
        for (field, label) in [("task", "Task"), ("nonce", "Nonce"), ("brief", "Brief")] {
            let mut payload = valid_payload();
            payload[field] = json!("");
            let err = parse_request(&payload).unwrap_err();
            assert_eq!(err.to_string(), format!("{label} must be a non-empty string"));

            payload[field] = json!(42);
            let err = parse_request(&payload).unwrap_err();
            assert_eq!(err.to_string(), format!("{label} must be a non-empty string"));
        }
    }

    #[test]
    fn test_evaluation_url_must_look_like_http() {
        let mut payload = valid_payload();
        payload["evaluation_url"] = json!("ftp://example.com");
        let err = parse_request(&payload).unwrap_err();
        assert_eq!(err.to_string(), "Evaluation URL must be a valid HTTP(S) URL");
    }

    #[test]
    fn test_checks_validation() {
        let mut payload = valid_payload();
        payload["checks"] = json!("not a list");
        assert_eq!(
            parse_request(&payload).unwrap_err().to_string(),
            "Checks must be a list"
        );

        payload["checks"] = json!([1, 2]);
        assert_eq!(
            parse_request(&payload).unwrap_err().to_string(),
            "Checks must be a list of strings"
        );
    }

    #[test]
    fn test_attachments_validation() {
        let mut payload = valid_payload();
        payload["attachments"] = json!("nope");
        assert_eq!(
            parse_request(&payload).unwrap_err().to_string(),
            "Attachments must be a list"
        );

        payload["attachments"] = json!([42]);
        assert_eq!(
            parse_request(&payload).unwrap_err().to_string(),
            "Attachment 0 must be an object"
        );

        payload["attachments"] = json!([{"name": "a.txt"}]);
        assert_eq!(
            parse_request(&payload).unwrap_err().to_string(),
            "Attachment 0 must have 'name' and 'url' fields"
        );

        payload["attachments"] = json!([
            {"name": "a.txt", "url": "data:text/plain;base64,aGk="}
        ]);
        let request = parse_request(&payload).unwrap();
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attachments[0].name, "a.txt");
    }

    #[test]
    fn test_verify_secret_denies_when_unconfigured() {
        assert!(!verify_secret(Some("anything"), None));
        assert!(!verify_secret(Some(""), None));
        assert!(!verify_secret(None, None));

        // An empty configured secret counts as unconfigured, so even an
        // empty provided value is denied.
        let empty = SecretString::from(String::new());
        assert!(!verify_secret(Some(""), Some(&empty)));
    }

    #[test]
    fn test_verify_secret_matches() {
        let expected = SecretString::from("hunter2".to_owned());
        assert!(verify_secret(Some("hunter2"), Some(&expected)));
        assert!(!verify_secret(Some("hunter3"), Some(&expected)));
        assert!(!verify_secret(Some("hunter22"), Some(&expected)));
        assert!(!verify_secret(None, Some(&expected)));
    }

    #[test]
    fn test_provided_secret_requires_string() {
        assert_eq!(provided_secret(&valid_payload()), Some("hunter2"));
        assert_eq!(provided_secret(&json!({ "secret": 42 })), None);
        assert_eq!(provided_secret(&json!({})), None);
    }
}

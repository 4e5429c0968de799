//! Repository name and description sanitisation.
//!
//! Forge APIs reject names outside `[A-Za-z0-9-]` and descriptions with
//! control characters; everything the requester supplies is sanitised
//! before it reaches the API.

use chrono::Utc;

/// Forge limit on repository name length.
const MAX_REPO_NAME_LEN: usize = 100;

/// How much of the brief is carried into the repository description.
const DESCRIPTION_BRIEF_LEN: usize = 100;

/// Derive a valid repository name from a task name.
///
/// Spaces and underscores become hyphens, every other character outside
/// `[A-Za-z0-9-]` is dropped, hyphens are stripped from both ends, and the
/// result is capped at 100 chars (re-stripping any trailing hyphen the cap
/// introduces, so the function stays idempotent). An empty result falls
/// back to a UTC timestamp name.
#[must_use]
pub fn sanitise_repo_name(task_name: &str) -> String {
    let mapped: String = task_name
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    let trimmed = mapped.trim_matches('-');
    let capped: String = trimmed.chars().take(MAX_REPO_NAME_LEN).collect();
    let name = capped.trim_end_matches('-');

    if name.is_empty() {
        format!("task-{}", Utc::now().format("%Y%m%d-%H%M%S"))
    } else {
        name.to_owned()
    }
}

/// Remove every control character from a free-text field.
#[must_use]
pub fn sanitise_description(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Build the repository description from the brief.
#[must_use]
pub fn build_description(brief: &str) -> String {
    let truncated: String = brief.chars().take(DESCRIPTION_BRIEF_LEN).collect();
    sanitise_description(&format!("Auto-generated application: {truncated}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_and_underscores_become_hyphens() {
        assert_eq!(sanitise_repo_name("Clock App!"), "Clock-App");
        assert_eq!(sanitise_repo_name("my_task name"), "my-task-name");
    }

    #[test]
    fn test_invalid_characters_are_dropped() {
        assert_eq!(sanitise_repo_name("weather (v2)"), "weather-v2");
        assert_eq!(sanitise_repo_name("--already--ok--"), "already--ok");
        assert_eq!(sanitise_repo_name("日本語 App"), "App");
    }

    #[test]
    fn test_sanitisation_is_idempotent() {
        for input in [
            "Clock App!",
            "weather (v2)",
            "--lots--of--hyphens--",
            "MiXeD_case 123",
            "x",
        ] {
            let once = sanitise_repo_name(input);
            assert_eq!(sanitise_repo_name(&once), once, "for {input:?}");
        }
    }

    #[test]
    fn test_long_names_are_capped_without_trailing_hyphen() {
        let long = "a".repeat(150);
        assert_eq!(sanitise_repo_name(&long).len(), 100);

        // The cap can land on a hyphen; it must not survive.
        let tricky = format!("{}-{}", "a".repeat(99), "b".repeat(20));
        let name = sanitise_repo_name(&tricky);
        assert_eq!(name, "a".repeat(99));
        assert_eq!(sanitise_repo_name(&name), name);
    }

    #[test]
    fn test_empty_result_falls_back_to_timestamp_name() {
        for input in ["", "!!!", "日本語", "---"] {
            let name = sanitise_repo_name(input);
            assert!(name.starts_with("task-"), "for {input:?}: {name}");
            // task-YYYYMMDD-HHMMSS
            assert_eq!(name.len(), "task-20260101-000000".len());
        }
    }

    #[test]
    fn test_description_strips_control_characters() {
        let messy = "line1\nline2\rline3\ttab\x00null\x0cff\x0bvt\x1besc\x08bs end";
        let clean = sanitise_description(messy);
        for c in ['\n', '\r', '\t', '\x00', '\x0c', '\x0b', '\x1b', '\x08'] {
            assert!(!clean.contains(c));
        }
        assert_eq!(clean, "line1line2line3tabnullffvtescbs end");
    }

    #[test]
    fn test_description_built_from_brief() {
        let description = build_description("Build a digital clock");
        assert_eq!(description, "Auto-generated application: Build a digital clock");

        let long_brief = "x".repeat(150);
        let description = build_description(&long_brief);
        assert_eq!(
            description.len(),
            "Auto-generated application: ".len() + 100
        );
    }
}

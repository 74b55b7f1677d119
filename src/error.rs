//! # Error Handling
//!
//! This module defines the centralized error type for `baseline-builder`. It
//! uses `thiserror` to build an `Error` enum covering every anticipated
//! failure mode, each variant carrying enough context (component, command,
//! image) to tell the user what went wrong and where.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all library errors.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The error surface covers:
//!
//! - Baseline spec parsing and validation errors.
//! - Missing credential environment variables.
//! - Selection of a component that is not in the spec.
//! - Git and Docker command failures.
//! - Stage precondition failures (stages run out of order).
//! - Component state record errors.
//! - I/O, JSON and URL errors.
//!
//! Errors never carry credentials: URLs are redacted before they are stored
//! in a variant (see [`crate::config::redact_credentials`]).

use thiserror::Error;

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!("\n  hint: {}", h))
        .unwrap_or_default()
}

/// Main error type for baseline-builder operations
#[derive(Error, Debug)]
pub enum Error {
    /// The baseline spec file is not valid JSON or does not match the
    /// expected shape (for example the `components` key is missing).
    #[error("Baseline spec parsing error: {message}")]
    SpecParse { message: String },

    /// The baseline spec parsed, but its content is inconsistent.
    ///
    /// `component` is `None` for errors on the top-level object.
    #[error("Invalid baseline spec{}: {message}{}", component.as_ref().map(|c| format!(" (component '{}')", c)).unwrap_or_default(), hint_suffix(hint))]
    SpecInvalid {
        component: Option<String>,
        message: String,
        /// Optional hint for how to fix the spec
        hint: Option<String>,
    },

    /// One or more required credential variables are not set.
    #[error("Missing required environment variables: {}", names.join(", "))]
    MissingEnvironment { names: Vec<String> },

    /// A component was selected on the command line that the spec does not
    /// declare.
    #[error("Unknown component '{name}'; the spec declares: {}", known.join(", "))]
    UnknownComponent { name: String, known: Vec<String> },

    /// A `git` invocation failed.
    #[error("Git command failed for {repository}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repository: String,
        stderr: String,
    },

    /// A `docker` invocation failed.
    #[error("Docker command failed for {image}: {command} - {stderr}")]
    DockerCommand {
        command: String,
        image: String,
        stderr: String,
    },

    /// A stage was run against a component whose working copy is not in the
    /// state the stage requires.
    #[error("Cannot run {stage} for component '{component}': {message}{}", hint_suffix(hint))]
    Precondition {
        stage: String,
        component: String,
        message: String,
        hint: Option<String>,
    },

    /// The checkout target exists but no completed checkout was recorded
    /// for it.
    #[error("Working copy {path} already exists but was not checked out completely\n  hint: remove the directory and run checkout again")]
    WorkingCopyExists { path: String },

    /// The working copy was checked out for another commit or nightly mirror
    /// than the baseline spec now declares.
    #[error("Working copy {path} of component '{component}' was checked out for {recorded}, but the baseline spec now pins {wanted}\n  hint: remove the directory and run checkout again")]
    StaleWorkingCopy {
        component: String,
        path: String,
        recorded: String,
        wanted: String,
    },

    /// The component state record could not be read or written.
    #[error("Component state error: {message}")]
    State { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_spec_parse() {
        let error = Error::SpecParse {
            message: "missing field `components`".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Baseline spec parsing error"));
        assert!(display.contains("missing field `components`"));
    }

    #[test]
    fn test_error_display_spec_invalid_with_component_and_hint() {
        let error = Error::SpecInvalid {
            component: Some("frontend".to_string()),
            message: "nightly-branch is required when use-nightly is true".to_string(),
            hint: Some("Add \"nightly-branch\": \"<branch>\"".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid baseline spec (component 'frontend')"));
        assert!(display.contains("nightly-branch is required"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn test_error_display_spec_invalid_top_level() {
        let error = Error::SpecInvalid {
            component: None,
            message: "tag must not be empty".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert_eq!(display, "Invalid baseline spec: tag must not be empty");
    }

    #[test]
    fn test_error_display_missing_environment() {
        let error = Error::MissingEnvironment {
            names: vec!["GITHUB_TOKEN".to_string(), "DOCKER_TOKEN".to_string()],
        };
        let display = format!("{}", error);
        assert!(display.contains("GITHUB_TOKEN, DOCKER_TOKEN"));
    }

    #[test]
    fn test_error_display_unknown_component() {
        let error = Error::UnknownComponent {
            name: "nope".to_string(),
            known: vec!["backend".to_string(), "frontend".to_string()],
        };
        let display = format!("{}", error);
        assert!(display.contains("'nope'"));
        assert!(display.contains("backend, frontend"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "push origin refs/tags/v1".to_string(),
            repository: "git_repos/backend".to_string(),
            stderr: "rejected".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("git_repos/backend"));
        assert!(display.contains("rejected"));
    }

    #[test]
    fn test_error_display_docker_command() {
        let error = Error::DockerCommand {
            command: "pull".to_string(),
            image: "org/api:1.0".to_string(),
            stderr: "manifest unknown".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Docker command failed for org/api:1.0"));
        assert!(display.contains("manifest unknown"));
    }

    #[test]
    fn test_error_display_precondition() {
        let error = Error::Precondition {
            stage: "tag".to_string(),
            component: "backend".to_string(),
            message: "no working copy".to_string(),
            hint: Some("run `baseline-builder checkout backend` first".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Cannot run tag for component 'backend'"));
        assert!(display.contains("hint: run"));
    }

    #[test]
    fn test_error_display_stale_working_copy() {
        let error = Error::StaleWorkingCopy {
            component: "backend".to_string(),
            path: "git_repos/backend".to_string(),
            recorded: "commit abc123".to_string(),
            wanted: "commit fff999".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("checked out for commit abc123"));
        assert!(display.contains("now pins commit fff999"));
        assert!(display.contains("remove the directory"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }
}

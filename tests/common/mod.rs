//! Shared test utilities for integration and E2E tests.
//!
//! The fixture builds local "GitHub" repositories under a temporary
//! directory and points the binary at them with `--github-url file://...`,
//! so the full checkout, merge, tag and push cycle runs without network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let backend = fixture.create_upstream("acme/backend");
//!     fixture.write_spec(&specs::single("backend", "acme/backend", &backend.first));
//!     fixture.command().arg("checkout").arg("all").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::specs;
    pub use super::TestFixture;
}

/// Credentials exported to every command; never valid anywhere.
pub const CREDENTIALS: [(&str, &str); 4] = [
    ("GITHUB_USERNAME", "octocat"),
    ("GITHUB_TOKEN", "ghp_test_token"),
    ("DOCKER_USERNAME", "dockercat"),
    ("DOCKER_TOKEN", "dckr_test_token"),
];

/// Environment variables that would leak settings from the host.
const HOST_VARIABLES: [&str; 6] = [
    "BASELINE_SPEC",
    "BASELINE_OUTPUT_DIR",
    "BASELINE_GITHUB_URL",
    "DOCKER_REGISTRY",
    "BASELINE_GIT_USER_NAME",
    "BASELINE_GIT_USER_EMAIL",
];

/// Spec JSON builders.
#[allow(dead_code)]
pub mod specs {
    use serde_json::{json, Value};

    /// A component without nightly mirror or images.
    pub fn plain(name: &str, repository: &str, commit: &str) -> Value {
        json!({
            "repository-name": name,
            "github-repository": repository,
            "commit": commit,
            "use-nightly": false,
        })
    }

    /// A component merged into `mirror` at `branch`.
    pub fn nightly(name: &str, repository: &str, commit: &str, mirror: &str, branch: &str) -> Value {
        json!({
            "repository-name": name,
            "github-repository": repository,
            "commit": commit,
            "use-nightly": true,
            "nightly-repository": mirror,
            "nightly-branch": branch,
        })
    }

    /// A complete spec file for `tag`.
    pub fn baseline(tag: &str, components: Vec<Value>) -> String {
        serde_json::to_string_pretty(&json!({ "tag": tag, "components": components }))
            .expect("spec serializes")
    }

    /// A spec with a single plain component, tagged `b1`.
    pub fn single(name: &str, repository: &str, commit: &str) -> String {
        baseline("b1", vec![plain(name, repository, commit)])
    }
}

/// Run git in `dir` with a fixed identity and return trimmed stdout.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Fixture")
        .env("GIT_AUTHOR_EMAIL", "fixture@example.com")
        .env("GIT_COMMITTER_NAME", "Fixture")
        .env("GIT_COMMITTER_EMAIL", "fixture@example.com")
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local repository standing in for a GitHub repository.
#[allow(dead_code)]
pub struct Upstream {
    pub path: PathBuf,
    /// First commit on `main`.
    pub first: String,
    /// Second (head) commit on `main`.
    pub second: String,
}

/// A temporary directory holding local remotes, the spec file and the
/// output directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the local remotes live in, laid out as `<owner>/<name>`.
    pub fn remotes(&self) -> PathBuf {
        self.path().join("remotes")
    }

    /// `file://` URL of [`Self::remotes`], with trailing slash.
    pub fn remotes_url(&self) -> String {
        url::Url::from_directory_path(self.remotes())
            .expect("absolute temp path")
            .to_string()
    }

    /// Default output directory of the binary.
    pub fn output_dir(&self) -> PathBuf {
        self.path().join("git_repos")
    }

    /// Working copy of `name` in the output directory.
    pub fn working_copy(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Create `<owner>/<name>` with two commits on `main`.
    pub fn create_upstream(&self, repository: &str) -> Upstream {
        let path = self.remotes().join(repository);
        std::fs::create_dir_all(&path).expect("Failed to create upstream directory");
        git(&path, &["init", "--quiet", "--initial-branch=main"]);

        std::fs::write(path.join("README.md"), "first\n").expect("Failed to write file");
        git(&path, &["add", "README.md"]);
        git(&path, &["commit", "--quiet", "-m", "first"]);
        let first = git(&path, &["rev-parse", "HEAD"]);

        std::fs::write(path.join("CHANGELOG.md"), "second\n").expect("Failed to write file");
        git(&path, &["add", "CHANGELOG.md"]);
        git(&path, &["commit", "--quiet", "-m", "second"]);
        let second = git(&path, &["rev-parse", "HEAD"]);

        Upstream {
            path,
            first,
            second,
        }
    }

    /// Fork `upstream` into `<mirror>` with `branch` one commit ahead of the
    /// upstream's first commit. `main` stays checked out so that pushes to
    /// `branch` are accepted.
    pub fn create_nightly_mirror(&self, upstream: &Upstream, mirror: &str, branch: &str) -> PathBuf {
        let path = self.remotes().join(mirror);
        std::fs::create_dir_all(path.parent().expect("mirror has an owner"))
            .expect("Failed to create mirror owner directory");
        git(
            self.path(),
            &[
                "clone",
                "--quiet",
                upstream.path.to_str().expect("utf-8 path"),
                path.to_str().expect("utf-8 path"),
            ],
        );
        git(&path, &["checkout", "--quiet", "-b", branch, &upstream.first]);
        std::fs::write(path.join("NIGHTLY.md"), "nightly\n").expect("Failed to write file");
        git(&path, &["add", "NIGHTLY.md"]);
        git(&path, &["commit", "--quiet", "-m", "nightly build"]);
        git(&path, &["checkout", "--quiet", "main"]);
        path
    }

    /// Write the spec file at its default location.
    pub fn write_spec(&self, content: &str) {
        self.temp_dir
            .child("baseline-spec.json")
            .write_str(content)
            .expect("Failed to write spec file");
    }

    /// A command in the fixture directory with credentials, the local
    /// remotes as GitHub and a committer identity.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = self.command_without_credentials();
        for (name, value) in CREDENTIALS {
            cmd.env(name, value);
        }
        cmd
    }

    /// Like [`Self::command`], without any of the required variables.
    pub fn command_without_credentials(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("baseline-builder");
        cmd.current_dir(self.path());
        for (name, _) in CREDENTIALS {
            cmd.env_remove(name);
        }
        for name in HOST_VARIABLES {
            cmd.env_remove(name);
        }
        cmd.env("NO_COLOR", "1")
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .arg("--github-url")
            .arg(self.remotes_url())
            .arg("--git-user-name")
            .arg("Baseline Bot")
            .arg("--git-user-email")
            .arg("baseline@example.com");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_has_two_commits() {
        let fixture = TestFixture::new();
        let upstream = fixture.create_upstream("acme/backend");
        assert_ne!(upstream.first, upstream.second);
        assert_eq!(git(&upstream.path, &["rev-parse", "main"]), upstream.second);
    }

    #[test]
    fn test_remotes_url_is_a_directory_url() {
        let fixture = TestFixture::new();
        let url = fixture.remotes_url();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/remotes/"));
    }
}

//! Thin wrappers over the system `git` command.
//!
//! Every function runs one `git` invocation and turns a non-zero exit status
//! into [`Error::GitCommand`]. Using the system binary means the usual git
//! configuration (credential helpers, proxies, `~/.gitconfig`) applies.
//! Arguments and stderr are passed through [`redact_credentials`] before
//! they are logged or stored in an error, since clone and remote URLs carry
//! the GitHub token.

use std::path::Path;
use std::process::Command;

use log::debug;
use url::Url;

use crate::config::{redact_credentials, GitIdentity};
use crate::error::{Error, Result};

/// Result of merging a branch into the checked-out branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A merge commit was created.
    Committed { commit: String },
    /// HEAD moved to the merged branch without a new commit.
    FastForward { commit: String },
    /// The merged branch was already contained in HEAD.
    UpToDate,
}

impl MergeOutcome {
    /// True when the merge did not produce a new commit.
    pub fn is_noop(&self) -> bool {
        !matches!(self, MergeOutcome::Committed { .. })
    }
}

fn git_command(dir: Option<&Path>, identity: Option<&GitIdentity>) -> Command {
    let mut cmd = Command::new("git");
    // never block on an interactive credential prompt
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    if let Some(identity) = identity {
        cmd.arg("-c")
            .arg(format!("user.name={}", identity.name))
            .arg("-c")
            .arg(format!("user.email={}", identity.email));
    }
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// Run git with `args` and return its trimmed stdout.
///
/// `location` names the repository in error messages.
fn run(
    dir: Option<&Path>,
    identity: Option<&GitIdentity>,
    location: &str,
    args: &[&str],
) -> Result<String> {
    let printable = redact_credentials(&args.join(" "));
    debug!("git {} (in {})", printable, location);

    let output = git_command(dir, identity)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: printable.clone(),
            repository: location.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        // merge reports conflicts on stdout
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(Error::GitCommand {
            command: printable,
            repository: location.to_string(),
            stderr: redact_credentials(&detail),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn run_in(dir: &Path, args: &[&str]) -> Result<String> {
    run(Some(dir), None, &dir.display().to_string(), args)
}

/// Clone `url` into `target_dir`. The parent directory is created if needed;
/// `target_dir` itself must not exist.
pub fn clone(url: &Url, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let target = target_dir.to_string_lossy();
    run(
        None,
        None,
        &redact_credentials(url.as_str()),
        &["clone", url.as_str(), &target],
    )?;
    Ok(())
}

/// Create branch `name` at `start_point` without checking it out.
pub fn create_branch(dir: &Path, name: &str, start_point: &str) -> Result<()> {
    run_in(dir, &["branch", name, start_point])?;
    Ok(())
}

/// Check out `branch`, resetting index and working tree to it.
pub fn checkout_force(dir: &Path, branch: &str) -> Result<()> {
    run_in(dir, &["checkout", "--force", branch])?;
    Ok(())
}

/// Register `url` as remote `name`.
pub fn add_remote(dir: &Path, name: &str, url: &Url) -> Result<()> {
    run_in(dir, &["remote", "add", name, url.as_str()])?;
    Ok(())
}

/// Fetch all branches of `remote`.
pub fn fetch(dir: &Path, remote: &str) -> Result<()> {
    run_in(dir, &["fetch", remote])?;
    Ok(())
}

/// Resolve `rev` to a full commit id.
pub fn rev_parse(dir: &Path, rev: &str) -> Result<String> {
    let spec = format!("{}^{{commit}}", rev);
    run_in(dir, &["rev-parse", "--verify", &spec])
}

/// Name of the checked-out branch (`HEAD` when detached).
pub fn current_branch(dir: &Path) -> Result<String> {
    run_in(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

fn ref_exists(dir: &Path, full_ref: &str) -> Result<bool> {
    let output = git_command(Some(dir), None)
        .args(["rev-parse", "--verify", "--quiet", full_ref])
        .output()?;
    Ok(output.status.success())
}

/// Whether local branch `name` exists.
pub fn branch_exists(dir: &Path, name: &str) -> Result<bool> {
    ref_exists(dir, &format!("refs/heads/{}", name))
}

/// Whether tag `name` exists.
pub fn tag_exists(dir: &Path, name: &str) -> Result<bool> {
    ref_exists(dir, &format!("refs/tags/{}", name))
}

/// Merge `branch` into the checked-out branch.
///
/// The outcome is derived from how HEAD moved, not from git's messages.
pub fn merge(
    dir: &Path,
    branch: &str,
    message: &str,
    identity: Option<&GitIdentity>,
) -> Result<MergeOutcome> {
    let before = rev_parse(dir, "HEAD")?;
    run(
        Some(dir),
        identity,
        &dir.display().to_string(),
        &["merge", "--no-edit", "-m", message, branch],
    )?;
    let after = rev_parse(dir, "HEAD")?;

    if before == after {
        Ok(MergeOutcome::UpToDate)
    } else if after == rev_parse(dir, branch)? {
        Ok(MergeOutcome::FastForward { commit: after })
    } else {
        Ok(MergeOutcome::Committed { commit: after })
    }
}

/// Create annotated tag `name` pointing at `target`.
pub fn create_annotated_tag(
    dir: &Path,
    name: &str,
    message: &str,
    target: &str,
    identity: Option<&GitIdentity>,
) -> Result<()> {
    run(
        Some(dir),
        identity,
        &dir.display().to_string(),
        &["tag", "--annotate", "--message", message, name, target],
    )?;
    Ok(())
}

/// Push `refspec` to `remote`.
pub fn push(dir: &Path, remote: &str, refspec: &str) -> Result<()> {
    run_in(dir, &["push", remote, refspec])?;
    Ok(())
}

//! # Version Control and Registry Seams
//!
//! The stages never call `git` or `docker` directly. They go through two
//! traits:
//!
//! - **`GitOperations`**: clone, branch, merge, tag and push on a working
//!   copy.
//! - **`RegistryOperations`**: login, pull, tag and push of container images.
//!
//! `SystemGit` and `DockerCli` are the production implementations, wrapping
//! [`crate::git`] and [`crate::docker`]. Tests substitute in-memory fakes to
//! exercise stage logic without touching the network.

use std::path::Path;

use url::Url;

use crate::config::{GitIdentity, Login};
use crate::error::Result;
use crate::git::MergeOutcome;

/// Trait for git operations - allows faking in tests
pub trait GitOperations {
    /// Clone `url` into `target_dir`.
    fn clone_repository(&self, url: &Url, target_dir: &Path) -> Result<()>;

    /// Create local branch `name` at `start_point`.
    fn create_branch(&self, dir: &Path, name: &str, start_point: &str) -> Result<()>;

    /// Check out `branch`, resetting index and working tree.
    fn checkout(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Register a remote.
    fn add_remote(&self, dir: &Path, name: &str, url: &Url) -> Result<()>;

    /// Fetch a remote.
    fn fetch(&self, dir: &Path, remote: &str) -> Result<()>;

    /// Merge `branch` into the checked-out branch.
    fn merge(&self, dir: &Path, branch: &str, message: &str) -> Result<MergeOutcome>;

    fn tag_exists(&self, dir: &Path, tag: &str) -> Result<bool>;

    /// Create an annotated tag at `target`.
    fn create_tag(&self, dir: &Path, tag: &str, message: &str, target: &str) -> Result<()>;

    /// Push `refspec` to `remote`.
    fn push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<()>;
}

/// Trait for container registry operations - allows faking in tests
pub trait RegistryOperations {
    fn login(&self, login: &Login, server: Option<&str>) -> Result<()>;

    fn pull(&self, reference: &str) -> Result<()>;

    /// Tag local image `source` as `target`.
    fn tag(&self, source: &str, target: &str) -> Result<()>;

    fn push(&self, reference: &str) -> Result<()>;
}

/// `GitOperations` backed by the system `git` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    identity: Option<GitIdentity>,
}

impl SystemGit {
    /// Use `identity` for merge commits and tags instead of git's own
    /// configuration.
    pub fn new(identity: Option<GitIdentity>) -> Self {
        Self { identity }
    }
}

impl GitOperations for SystemGit {
    fn clone_repository(&self, url: &Url, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn create_branch(&self, dir: &Path, name: &str, start_point: &str) -> Result<()> {
        crate::git::create_branch(dir, name, start_point)
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::checkout_force(dir, branch)
    }

    fn add_remote(&self, dir: &Path, name: &str, url: &Url) -> Result<()> {
        crate::git::add_remote(dir, name, url)
    }

    fn fetch(&self, dir: &Path, remote: &str) -> Result<()> {
        crate::git::fetch(dir, remote)
    }

    fn merge(&self, dir: &Path, branch: &str, message: &str) -> Result<MergeOutcome> {
        crate::git::merge(dir, branch, message, self.identity.as_ref())
    }

    fn tag_exists(&self, dir: &Path, tag: &str) -> Result<bool> {
        crate::git::tag_exists(dir, tag)
    }

    fn create_tag(&self, dir: &Path, tag: &str, message: &str, target: &str) -> Result<()> {
        crate::git::create_annotated_tag(dir, tag, message, target, self.identity.as_ref())
    }

    fn push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<()> {
        crate::git::push(dir, remote, refspec)
    }
}

/// `RegistryOperations` backed by the `docker` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerCli;

impl RegistryOperations for DockerCli {
    fn login(&self, login: &Login, server: Option<&str>) -> Result<()> {
        crate::docker::login(login, server)
    }

    fn pull(&self, reference: &str) -> Result<()> {
        crate::docker::pull(reference)
    }

    fn tag(&self, source: &str, target: &str) -> Result<()> {
        crate::docker::tag(source, target)
    }

    fn push(&self, reference: &str) -> Result<()> {
        crate::docker::push(reference)
    }
}

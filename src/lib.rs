//! # Baseline Builder Library
//!
//! This library assembles a *baseline*: a consistent, tagged snapshot of a
//! set of component repositories. It is used by the `baseline-builder`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use baseline_builder::spec;
//! use baseline_builder::stages::Selection;
//!
//! let spec = spec::parse(r#"{
//!   "tag": "baseline-1",
//!   "components": [{
//!     "repository-name": "backend",
//!     "github-repository": "acme/backend",
//!     "commit": "abc123",
//!     "use-nightly": false
//!   }]
//! }"#).unwrap();
//!
//! assert_eq!(spec.component_names(), vec!["backend"]);
//! assert!(Selection::parse("all").includes("backend"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Spec (`spec`)**: the JSON file naming the baseline tag and, per
//!   component, the pinned commit, the optional nightly mirror and the
//!   Docker images to republish.
//! - **Configuration (`config`)**: credentials from the environment and the
//!   settings shared by all stages.
//! - **Stages (`stages`)**: checkout, merge, tag, push and docker, each
//!   runnable on its own for one component or all of them.
//! - **Repository access (`repository`, `git`, `docker`)**: the git and
//!   docker command-line tools behind two traits.
//! - **Workspace (`workspace`, `state`)**: the output directory and the
//!   per-component progress record kept next to the working copies.

pub mod config;
pub mod docker;
pub mod error;
pub mod git;
pub mod output;
pub mod repository;
pub mod spec;
pub mod stages;
pub mod state;
pub mod workspace;

#[cfg(test)]
mod selection_proptest;

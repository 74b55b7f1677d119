//! # Baseline Spec Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `baseline-spec.json` file and the logic for loading it.
//!
//! ## Key Components
//!
//! - **`BaselineSpec`**: The validated spec: a baseline tag plus an ordered
//!   list of components.
//! - **`Component`**: One repository participating in the baseline, with its
//!   commit pin, optional nightly mirror and Docker images.
//! - **`NightlyMirror`**: Present only for components with `use-nightly`.
//!
//! ## Parsing
//!
//! Parsing happens in two steps. The JSON is first deserialized into
//! file-shaped structs that mirror the kebab-case keys one to one. Those are
//! then validated and converted into the public types, so that a component
//! with `use-nightly: true` and no `nightly-branch` is rejected at load time
//! instead of failing halfway through a run.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default location of the spec file, relative to the working directory.
pub const DEFAULT_SPEC_FILE: &str = "baseline-spec.json";

/// A Docker image to republish under the baseline tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    /// Image repository, e.g. `org/api`.
    pub name: String,
    /// Source tag to pull.
    pub tag: String,
}

impl DockerImage {
    /// `name:tag` reference of the source image.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

/// Nightly mirror configuration of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightlyMirror {
    /// `owner/name` of the mirror on GitHub.
    pub repository: String,
    /// Branch of the mirror that receives the merged baseline.
    pub branch: String,
}

/// One component of the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Unique name, also used as the working copy directory name.
    pub repository_name: String,
    /// `owner/name` of the repository on GitHub.
    pub github_repository: String,
    /// Pinned commit.
    pub commit: String,
    /// Set iff `use-nightly` is true.
    pub nightly: Option<NightlyMirror>,
    pub docker_images: Vec<DockerImage>,
}

impl Component {
    pub fn uses_nightly(&self) -> bool {
        self.nightly.is_some()
    }
}

/// The validated baseline spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineSpec {
    /// Baseline identifier applied to every repository and image.
    pub tag: String,
    pub components: Vec<Component>,
}

impl BaselineSpec {
    /// Find a component by its repository name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.repository_name == name)
    }

    /// Names of all components, in spec order.
    pub fn component_names(&self) -> Vec<String> {
        self.components
            .iter()
            .map(|c| c.repository_name.clone())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SpecFile {
    tag: String,
    components: Vec<ComponentFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ComponentFile {
    repository_name: String,
    github_repository: String,
    commit: String,
    use_nightly: bool,
    #[serde(default)]
    nightly_repository: Option<String>,
    #[serde(default)]
    nightly_branch: Option<String>,
    #[serde(default)]
    docker_hub_repositories: Vec<DockerImage>,
}

fn github_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("static regex is valid")
    })
}

/// Characters valid in both a git tag and a Docker image tag.
fn baseline_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("static regex is valid")
    })
}

fn invalid(component: Option<&str>, message: impl Into<String>, hint: Option<&str>) -> Error {
    Error::SpecInvalid {
        component: component.map(str::to_string),
        message: message.into(),
        hint: hint.map(str::to_string),
    }
}

fn check_github_path(component: &str, key: &str, value: &str) -> Result<()> {
    if github_path_regex().is_match(value) {
        Ok(())
    } else {
        Err(invalid(
            Some(component),
            format!("{} '{}' is not an owner/name path", key, value),
            Some("Use the GitHub path without host, e.g. \"my-org/my-repo\""),
        ))
    }
}

fn check_repository_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(None, "repository-name must not be empty", None));
    }
    let mut components = Path::new(name).components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );
    if name == "all" {
        return Err(invalid(
            Some(name),
            "repository-name 'all' is reserved",
            Some("`all` selects every component on the command line; pick another name"),
        ));
    }
    if !is_plain {
        return Err(invalid(
            Some(name),
            "repository-name must be a plain directory name",
            Some("It names the working copy under the output directory; remove any '/' or '..'"),
        ));
    }
    Ok(())
}

fn check_baseline_tag(tag: &str) -> Result<()> {
    // git refuses these even though Docker accepts them
    let git_reserved = tag.contains("..") || tag.ends_with('.') || tag.ends_with(".lock");
    if baseline_tag_regex().is_match(tag) && !git_reserved {
        Ok(())
    } else {
        Err(invalid(
            None,
            format!("tag '{}' is not usable as a git tag and Docker image tag", tag),
            Some("Use letters, digits, '_', '.' and '-', starting with a letter, digit or '_', at most 128 characters"),
        ))
    }
}

impl TryFrom<ComponentFile> for Component {
    type Error = Error;

    fn try_from(file: ComponentFile) -> Result<Self> {
        check_repository_name(&file.repository_name)?;
        let name = file.repository_name.as_str();

        check_github_path(name, "github-repository", &file.github_repository)?;

        if file.commit.trim().is_empty() {
            return Err(invalid(Some(name), "commit must not be empty", None));
        }

        let nightly = if file.use_nightly {
            let repository = file.nightly_repository.ok_or_else(|| {
                invalid(
                    Some(name),
                    "nightly-repository is required when use-nightly is true",
                    Some("Add \"nightly-repository\": \"<owner>/<repo>\" or set use-nightly to false"),
                )
            })?;
            let branch = file.nightly_branch.ok_or_else(|| {
                invalid(
                    Some(name),
                    "nightly-branch is required when use-nightly is true",
                    Some("Add \"nightly-branch\": \"<branch>\" or set use-nightly to false"),
                )
            })?;
            check_github_path(name, "nightly-repository", &repository)?;
            if branch.trim().is_empty() {
                return Err(invalid(Some(name), "nightly-branch must not be empty", None));
            }
            Some(NightlyMirror { repository, branch })
        } else {
            None
        };

        for image in &file.docker_hub_repositories {
            if image.name.is_empty() || image.tag.is_empty() {
                return Err(invalid(
                    Some(name),
                    "docker-hub-repositories entries need a non-empty name and tag",
                    None,
                ));
            }
        }

        Ok(Component {
            repository_name: file.repository_name,
            github_repository: file.github_repository,
            commit: file.commit,
            nightly,
            docker_images: file.docker_hub_repositories,
        })
    }
}

impl TryFrom<SpecFile> for BaselineSpec {
    type Error = Error;

    fn try_from(file: SpecFile) -> Result<Self> {
        if file.tag.trim().is_empty() {
            return Err(invalid(None, "tag must not be empty", None));
        }
        check_baseline_tag(&file.tag)?;

        let mut seen = HashSet::new();
        let mut components = Vec::with_capacity(file.components.len());
        for component in file.components {
            let component = Component::try_from(component)?;
            if !seen.insert(component.repository_name.clone()) {
                return Err(invalid(
                    Some(&component.repository_name),
                    "repository-name is declared more than once",
                    Some("Each component needs its own working copy directory"),
                ));
            }
            components.push(component);
        }

        Ok(BaselineSpec {
            tag: file.tag,
            components,
        })
    }
}

/// Parse and validate a baseline spec from a JSON string.
pub fn parse(json_content: &str) -> Result<BaselineSpec> {
    let file: SpecFile = serde_json::from_str(json_content).map_err(|e| Error::SpecParse {
        message: e.to_string(),
    })?;
    BaselineSpec::try_from(file)
}

/// Read, parse and validate a baseline spec file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BaselineSpec> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

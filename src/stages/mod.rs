//! The five stages of a baseline build.
//!
//! ## Overview
//!
//! A baseline is built in order:
//! 1. Checkout - clone every component and branch `baseline` at its pinned commit
//! 2. Merge - merge `baseline` into `baseline-nightly` for nightly components
//! 3. Tag - create the annotated baseline tag
//! 4. Push - push the tag (and the nightly branch) to GitHub
//! 5. Docker - republish the component images under the baseline tag
//!
//! Every stage walks the whole component list on its own and re-opens the
//! working copies from disk, so any stage can be run alone for one component
//! or for all of them. Stages that depend on an earlier stage check the
//! component state record first (see [`crate::state`]).

use std::fmt;
use std::path::PathBuf;

use crate::config::{Credentials, Settings};
use crate::error::{Error, Result};
use crate::output::Printer;
use crate::repository::{GitOperations, RegistryOperations};
use crate::spec::{BaselineSpec, Component};
use crate::state::{Progress, StateRecord};
use crate::workspace::Workspace;

pub mod checkout;
pub mod docker;
pub mod merge;
pub mod orchestrator;
pub mod push;
pub mod status;
pub mod tag;

/// Branch created at the pinned commit.
pub const BASELINE_BRANCH: &str = "baseline";
/// Branch tracking the nightly mirror, receiving the merge.
pub const NIGHTLY_BRANCH: &str = "baseline-nightly";
/// Remote name of the nightly mirror.
pub const NIGHTLY_REMOTE: &str = "nightly";
/// Remote name of the component repository.
pub const ORIGIN_REMOTE: &str = "origin";

/// A stage of the baseline build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Checkout,
    Merge,
    Tag,
    Push,
    Docker,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Checkout,
        Stage::Merge,
        Stage::Tag,
        Stage::Push,
        Stage::Docker,
    ];

    /// Command-line name of the stage.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Checkout => "checkout",
            Stage::Merge => "merge",
            Stage::Tag => "tag",
            Stage::Push => "push",
            Stage::Docker => "docker",
        }
    }

    /// Completes "Skipping <component> from ...".
    pub fn skip_phrase(self) -> &'static str {
        match self {
            Stage::Checkout => "checkout",
            Stage::Merge => "merging",
            Stage::Tag => "creating tag",
            Stage::Push => "pushing tag",
            Stage::Docker => "pushing Docker images",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which components a stage processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Component(String),
}

impl Selection {
    /// `"all"` selects every component, anything else one component by name.
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            Selection::All
        } else {
            Selection::Component(raw.to_string())
        }
    }

    pub fn includes(&self, repository_name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Component(name) => name == repository_name,
        }
    }

    /// Fail if the selection names a component the spec does not declare.
    pub fn validate(&self, spec: &BaselineSpec) -> Result<()> {
        match self {
            Selection::Component(name) if spec.component(name).is_none() => {
                Err(Error::UnknownComponent {
                    name: name.clone(),
                    known: spec.component_names(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Everything a stage needs, passed explicitly.
pub struct StageContext<'a> {
    pub spec: &'a BaselineSpec,
    pub credentials: &'a Credentials,
    pub settings: &'a Settings,
    pub workspace: &'a Workspace,
    pub git: &'a dyn GitOperations,
    pub registry: &'a dyn RegistryOperations,
    pub printer: &'a Printer,
}

/// Which components a stage run processed and which it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Run `f` for each selected component in spec order, printing
/// "Skipping <name> from <activity>." for the others.
pub(crate) fn for_each_selected<F>(
    spec: &BaselineSpec,
    printer: &Printer,
    selection: &Selection,
    activity: &str,
    mut f: F,
) -> Result<StageReport>
where
    F: FnMut(&Component) -> Result<()>,
{
    selection.validate(spec)?;
    let mut report = StageReport::default();
    for component in &spec.components {
        let name = &component.repository_name;
        if !selection.includes(name) {
            printer.skip(&format!("Skipping {} from {}.", name, activity));
            report.skipped.push(name.clone());
            continue;
        }
        f(component)?;
        report.processed.push(name.clone());
    }
    Ok(report)
}

/// Check that `component` has a working copy that reached `level`, and
/// return its path.
fn require(
    ctx: &StageContext<'_>,
    record: &StateRecord,
    component: &Component,
    stage: Stage,
    level: Progress,
) -> Result<PathBuf> {
    let name = &component.repository_name;
    let path = ctx.workspace.repo_path(name);

    let previous = match level {
        Progress::Cloned => Stage::Checkout,
        Progress::Merged => Stage::Merge,
        Progress::Tagged => Stage::Tag,
        Progress::Pushed => Stage::Push,
    };
    let hint = Some(format!("run `baseline-builder {} {}` first", previous, name));

    if !ctx.workspace.has_working_copy(name) {
        return Err(Error::Precondition {
            stage: stage.to_string(),
            component: name.clone(),
            message: format!("no working copy at {}", path.display()),
            hint: Some(format!("run `baseline-builder checkout {}` first", name)),
        });
    }
    if !record.reached(name, level) {
        let current = record
            .progress(name)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "untouched".to_string());
        return Err(Error::Precondition {
            stage: stage.to_string(),
            component: name.clone(),
            message: format!("component is {}, but {} requires it to be {}", current, stage, level),
            hint,
        });
    }
    Ok(path)
}

//! Per-component progress record.
//!
//! Each stage raises a component's recorded progress after it finishes with
//! it, and later stages check the record before touching the working copy.
//! That turns "tag before checkout" into a clear precondition error instead
//! of whatever git prints for a missing directory.
//!
//! The record is tied to one baseline tag. When it is loaded for a different
//! tag, the tag-dependent levels no longer apply and progress is capped at
//! [`Progress::Merged`].
//!
//! Each checkout also records the [`CheckoutPin`] it was made for. A
//! component whose pin no longer matches the spec loses its progress on
//! load, so no later stage works on a stale working copy.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::spec::{BaselineSpec, Component};

/// How far a component got through the git stages. Ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Progress {
    Cloned,
    Merged,
    Tagged,
    Pushed,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Progress::Cloned => "cloned",
            Progress::Merged => "merged",
            Progress::Tagged => "tagged",
            Progress::Pushed => "pushed",
        };
        f.write_str(name)
    }
}

/// The commit and nightly mirror a working copy was checked out for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckoutPin {
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nightly_repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nightly_branch: Option<String>,
}

impl CheckoutPin {
    pub fn of(component: &Component) -> Self {
        Self {
            commit: component.commit.clone(),
            nightly_repository: component.nightly.as_ref().map(|n| n.repository.clone()),
            nightly_branch: component.nightly.as_ref().map(|n| n.branch.clone()),
        }
    }
}

impl std::fmt::Display for CheckoutPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "commit {}", self.commit)?;
        if let (Some(repository), Some(branch)) = (&self.nightly_repository, &self.nightly_branch) {
            write!(f, " with nightly {} at {}", repository, branch)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComponentState {
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub images_published: bool,
    /// Set by checkout; `None` for records that predate it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutPin>,
}

/// The persisted record for all components of one baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Baseline tag the record was written for.
    pub tag: String,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentState>,
}

impl StateRecord {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            components: BTreeMap::new(),
        }
    }

    /// Re-target the record at `tag`, dropping what no longer holds.
    pub fn retarget(mut self, tag: &str) -> Self {
        if self.tag == tag {
            return self;
        }
        warn!(
            "state record was written for baseline '{}', not '{}'; keeping checkout and merge progress only",
            self.tag, tag
        );
        for state in self.components.values_mut() {
            state.progress = state.progress.map(|p| p.min(Progress::Merged));
            state.images_published = false;
        }
        self.tag = tag.to_string();
        self
    }

    /// Drop the progress of every component whose recorded checkout does not
    /// match `spec`. The recorded pin is kept so that checkout can explain
    /// why it refuses the existing working copy.
    pub fn reconcile(mut self, spec: &BaselineSpec) -> Self {
        for component in &spec.components {
            let Some(state) = self.components.get_mut(&component.repository_name) else {
                continue;
            };
            if state.progress.is_none() {
                continue;
            }
            let wanted = CheckoutPin::of(component);
            if state.checkout.as_ref() != Some(&wanted) {
                warn!(
                    "component '{}' was checked out for {}, the spec now pins {}; its progress is reset",
                    component.repository_name,
                    state
                        .checkout
                        .as_ref()
                        .map_or_else(|| "an unknown pin".to_string(), |p| p.to_string()),
                    wanted
                );
                state.progress = None;
            }
        }
        self
    }

    pub fn get(&self, component: &str) -> ComponentState {
        self.components.get(component).cloned().unwrap_or_default()
    }

    pub fn progress(&self, component: &str) -> Option<Progress> {
        self.components.get(component).and_then(|s| s.progress)
    }

    /// Whether `component` has reached at least `level`.
    pub fn reached(&self, component: &str, level: Progress) -> bool {
        self.progress(component).is_some_and(|p| p >= level)
    }

    /// Raise `component` to `level`. Progress never moves backwards.
    pub fn advance(&mut self, component: &str, level: Progress) {
        let state = self.components.entry(component.to_string()).or_default();
        state.progress = Some(state.progress.map_or(level, |p| p.max(level)));
    }

    /// Record a fresh checkout made for `pin`: progress restarts at
    /// [`Progress::Cloned`].
    pub fn restart(&mut self, component: &str, pin: CheckoutPin) {
        let state = self.components.entry(component.to_string()).or_default();
        state.progress = Some(Progress::Cloned);
        state.checkout = Some(pin);
    }

    pub fn mark_images_published(&mut self, component: &str) {
        self.components
            .entry(component.to_string())
            .or_default()
            .images_published = true;
    }
}

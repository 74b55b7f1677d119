//! Stage 2: Merge
//!
//! For components with a nightly mirror, merges `baseline` into
//! `baseline-nightly`. A merge that produces no commit (fast-forward, or the
//! pinned commit is already contained in the mirror) counts as success.
//! Components without a nightly mirror are not touched.

use super::{
    for_each_selected, require, Selection, Stage, StageContext, StageReport, BASELINE_BRANCH,
    NIGHTLY_BRANCH,
};
use crate::error::Result;
use crate::git::MergeOutcome;
use crate::spec::Component;
use crate::state::{Progress, StateRecord};

/// Commit message of the merge commit for `component`.
pub fn merge_message(component: &Component) -> String {
    format!("Merging from {}", component.commit)
}

/// Execute the merge stage.
pub fn execute(ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    let printer = ctx.printer;
    printer.header("Merging branches from repositories with nightly mirrors...");

    let mut record = ctx.workspace.load_state(ctx.spec)?;
    let activity = Stage::Merge.skip_phrase();
    let report = for_each_selected(ctx.spec, printer, selection, activity, |component| {
        if merge_component(ctx, &mut record, component)? {
            ctx.workspace.save_state(&record)?;
        }
        Ok(())
    })?;

    printer.done("all repositories were merged.");
    Ok(report)
}

/// Returns whether the component was merged (false for non-nightly ones).
fn merge_component(
    ctx: &StageContext<'_>,
    record: &mut StateRecord,
    component: &Component,
) -> Result<bool> {
    let printer = ctx.printer;
    let name = &component.repository_name;

    if !component.uses_nightly() {
        printer.step(&format!("Repository {} doesn't need merging.", name));
        return Ok(false);
    }

    let dir = require(ctx, record, component, Stage::Merge, Progress::Cloned)?;
    ctx.git.checkout(&dir, NIGHTLY_BRANCH)?;

    printer.step(&format!("Merging code from {}...", name));
    let outcome = ctx
        .git
        .merge(&dir, BASELINE_BRANCH, &merge_message(component))?;
    match outcome {
        MergeOutcome::Committed { commit } => {
            printer.done(&format!("merge was committed ({}).", short_id(&commit)));
        }
        MergeOutcome::FastForward { .. } | MergeOutcome::UpToDate => {
            printer.done("Worktree is clean, nothing to commit.");
        }
    }

    record.advance(name, Progress::Merged);
    Ok(true)
}

fn short_id(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}

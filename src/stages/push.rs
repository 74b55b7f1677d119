//! Stage 4: Push
//!
//! Nightly components push `baseline-nightly` to the mirror's branch and
//! then the tag to the mirror. Other components push only the tag, to
//! `origin`. There is no retry; a rejected push aborts the run.

use super::{
    for_each_selected, require, Selection, Stage, StageContext, StageReport, NIGHTLY_BRANCH,
    NIGHTLY_REMOTE, ORIGIN_REMOTE,
};
use crate::error::Result;
use crate::spec::Component;
use crate::state::{Progress, StateRecord};

/// Refspec that pushes the baseline tag.
pub fn tag_refspec(tag: &str) -> String {
    format!("refs/tags/{}", tag)
}

/// Execute the push stage.
pub fn execute(ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    let printer = ctx.printer;
    printer.header("Pushing everything to GitHub...");

    let mut record = ctx.workspace.load_state(ctx.spec)?;
    let activity = Stage::Push.skip_phrase();
    let report = for_each_selected(ctx.spec, printer, selection, activity, |component| {
        push_component(ctx, &mut record, component)?;
        ctx.workspace.save_state(&record)
    })?;

    printer.done("everything was pushed to GitHub.");
    Ok(report)
}

fn push_component(
    ctx: &StageContext<'_>,
    record: &mut StateRecord,
    component: &Component,
) -> Result<()> {
    let printer = ctx.printer;
    let name = &component.repository_name;
    let dir = require(ctx, record, component, Stage::Push, Progress::Tagged)?;
    let tag_ref = tag_refspec(&ctx.spec.tag);

    printer.step(&format!("Pushing tag to repository {}...", name));
    match &component.nightly {
        Some(nightly) => {
            printer.step("Pushing changes to nightly mirror repository...");
            let branch_ref = format!("{}:{}", NIGHTLY_BRANCH, nightly.branch);
            ctx.git.push(&dir, NIGHTLY_REMOTE, &branch_ref)?;
            printer.done("changes were pushed to nightly mirror.");

            printer.step("Pushing baseline tag...");
            ctx.git.push(&dir, NIGHTLY_REMOTE, &tag_ref)?;
            printer.done("baseline tag was pushed to nightly mirror.");
        }
        None => {
            printer.step("Pushing baseline tag...");
            ctx.git.push(&dir, ORIGIN_REMOTE, &tag_ref)?;
            printer.done("baseline tag was pushed.");
        }
    }

    record.advance(name, Progress::Pushed);
    printer.done(&format!("all changes were pushed to {}.", name));
    Ok(())
}

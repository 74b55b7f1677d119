//! Stage 3: Tag
//!
//! Creates the annotated baseline tag on `baseline-nightly` for nightly
//! components and on `baseline` otherwise. A repository that already has
//! the tag is left as it is.

use super::{
    for_each_selected, require, Selection, Stage, StageContext, StageReport, BASELINE_BRANCH,
    NIGHTLY_BRANCH,
};
use crate::error::Result;
use crate::spec::Component;
use crate::state::{Progress, StateRecord};

/// Message of the annotated baseline tag.
pub fn tag_message(tag: &str) -> String {
    format!("Baseline: {}", tag)
}

/// Execute the tag stage.
pub fn execute(ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    let printer = ctx.printer;
    printer.header("Creating tag for all repositories...");

    let mut record = ctx.workspace.load_state(ctx.spec)?;
    let activity = Stage::Tag.skip_phrase();
    let report = for_each_selected(ctx.spec, printer, selection, activity, |component| {
        tag_component(ctx, &mut record, component)?;
        ctx.workspace.save_state(&record)
    })?;

    printer.done("all repositories were tagged.");
    Ok(report)
}

fn tag_component(
    ctx: &StageContext<'_>,
    record: &mut StateRecord,
    component: &Component,
) -> Result<()> {
    let printer = ctx.printer;
    let name = &component.repository_name;
    let tag = &ctx.spec.tag;

    // nightly components are tagged after the merge
    let required = if component.uses_nightly() {
        Progress::Merged
    } else {
        Progress::Cloned
    };
    let dir = require(ctx, record, component, Stage::Tag, required)?;

    printer.step(&format!("Creating tag for repository {}...", name));
    printer.step("Checking whether tag has already been created...");
    if ctx.git.tag_exists(&dir, tag)? {
        printer.skip(&format!(
            "tag {} has already been created, skipping repository {}.",
            tag, name
        ));
        record.advance(name, Progress::Tagged);
        return Ok(());
    }
    printer.step("tag is not created yet. Good to go.");

    let target = if component.uses_nightly() {
        NIGHTLY_BRANCH
    } else {
        BASELINE_BRANCH
    };
    printer.step("Creating baseline tag...");
    ctx.git.create_tag(&dir, tag, &tag_message(tag), target)?;
    printer.done(&format!(
        "repository {} was properly tagged on {}.",
        name, target
    ));

    record.advance(name, Progress::Tagged);
    Ok(())
}

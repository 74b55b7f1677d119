//! Orchestrator for a baseline build
//!
//! Runs one stage for a selection, or all five stages for every component.
//! A full build is simply the stages in order: each one walks the complete
//! component list before the next starts, and the first failure stops the
//! run.

use log::debug;

use super::{checkout, docker, merge, push, tag, Selection, Stage, StageContext, StageReport};
use crate::error::Result;

/// Execute a single stage for `selection`.
pub fn run(stage: Stage, ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    debug!("running stage {} for {:?}", stage, selection);
    match stage {
        Stage::Checkout => checkout::execute(ctx, selection),
        Stage::Merge => merge::execute(ctx, selection),
        Stage::Tag => tag::execute(ctx, selection),
        Stage::Push => push::execute(ctx, selection),
        Stage::Docker => docker::execute(ctx, selection),
    }
}

/// Execute the complete build (stages 1-5) for all components.
pub fn run_all(ctx: &StageContext<'_>) -> Result<Vec<(Stage, StageReport)>> {
    let mut reports = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        let report = run(stage, ctx, &Selection::All)?;
        reports.push((stage, report));
    }
    Ok(reports)
}

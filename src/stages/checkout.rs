//! Stage 1: Checkout
//!
//! Clones each selected component into `<output>/<repository-name>` and
//! creates the `baseline` branch at the pinned commit. Components with a
//! nightly mirror also get a `nightly` remote and a `baseline-nightly`
//! branch at the mirror's branch head, which is left checked out.
//!
//! A component whose working copy exists and is recorded as cloned for the
//! same commit and nightly mirror is skipped, so the stage can be re-run
//! after a partial failure. A working copy made for another pin, or a
//! directory without any record, is left alone and reported.

use super::{
    for_each_selected, Selection, Stage, StageContext, StageReport, BASELINE_BRANCH,
    NIGHTLY_BRANCH, NIGHTLY_REMOTE,
};
use crate::config::authenticated_url;
use crate::error::{Error, Result};
use crate::spec::Component;
use crate::state::{CheckoutPin, StateRecord};

/// Execute the checkout stage.
pub fn execute(ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    let printer = ctx.printer;
    printer.header("Checking out repositories...");
    printer.step("Creating output directory...");
    ctx.workspace.ensure_root()?;
    printer.done(&format!(
        "output directory {} is ready.",
        ctx.workspace.root().display()
    ));

    let mut record = ctx.workspace.load_state(ctx.spec)?;
    let activity = Stage::Checkout.skip_phrase();
    let report = for_each_selected(ctx.spec, printer, selection, activity, |component| {
        checkout_component(ctx, &mut record, component)?;
        ctx.workspace.save_state(&record)
    })?;

    printer.done("repositories were checked out.");
    Ok(report)
}

fn checkout_component(
    ctx: &StageContext<'_>,
    record: &mut StateRecord,
    component: &Component,
) -> Result<()> {
    let printer = ctx.printer;
    let name = &component.repository_name;
    let dest = ctx.workspace.repo_path(name);

    let pin = CheckoutPin::of(component);

    if dest.exists() {
        let state = record.get(name);
        return match &state.checkout {
            Some(recorded) if *recorded != pin => Err(Error::StaleWorkingCopy {
                component: name.clone(),
                path: dest.display().to_string(),
                recorded: recorded.to_string(),
                wanted: pin.to_string(),
            }),
            Some(_) if state.progress.is_some() => {
                printer.skip(&format!(
                    "{} is already checked out at {}.",
                    name,
                    dest.display()
                ));
                Ok(())
            }
            _ => Err(Error::WorkingCopyExists {
                path: dest.display().to_string(),
            }),
        };
    }

    printer.step(&format!("Checking out {}", name));
    printer.step(&format!(
        "From GitHub repository {}",
        component.github_repository
    ));
    printer.step(&format!("At commit {}", component.commit));

    let url = authenticated_url(
        &ctx.settings.github_url,
        &component.github_repository,
        &ctx.credentials.github,
    )?;

    printer.step("Cloning repository...");
    ctx.git.clone_repository(&url, &dest)?;
    printer.done("repository was cloned.");

    printer.step("Creating branch...");
    ctx.git
        .create_branch(&dest, BASELINE_BRANCH, &component.commit)?;
    ctx.git.checkout(&dest, BASELINE_BRANCH)?;
    printer.done(&format!("'{}' branch was created.", BASELINE_BRANCH));

    if let Some(nightly) = &component.nightly {
        printer.step("Checking out nightly mirror repository...");
        printer.step(&format!("From GitHub repository {}", nightly.repository));
        printer.step(&format!("At branch {}", nightly.branch));

        let nightly_url = authenticated_url(
            &ctx.settings.github_url,
            &nightly.repository,
            &ctx.credentials.github,
        )?;
        ctx.git.add_remote(&dest, NIGHTLY_REMOTE, &nightly_url)?;
        ctx.git.fetch(&dest, NIGHTLY_REMOTE)?;

        let start_point = format!("{}/{}", NIGHTLY_REMOTE, nightly.branch);
        ctx.git.create_branch(&dest, NIGHTLY_BRANCH, &start_point)?;
        ctx.git.checkout(&dest, NIGHTLY_BRANCH)?;
        printer.done("nightly mirror repository fetched, branches updated.");
    }

    record.restart(name, pin);
    Ok(())
}

//! Stage 5: Docker
//!
//! Republishes each component's images under the baseline tag: pull
//! `name:tag`, tag it `name:<baseline>`, push `name:<baseline>`. The stage
//! logs into the registry once, right before the first image, so a
//! selection without images never contacts the registry. Local tags are
//! not cleaned up.

use super::{for_each_selected, Selection, Stage, StageContext, StageReport};
use crate::error::Result;
use crate::spec::DockerImage;

/// `name:<baseline tag>` reference for `image`.
pub fn baseline_reference(image: &DockerImage, baseline_tag: &str) -> String {
    format!("{}:{}", image.name, baseline_tag)
}

/// Execute the docker stage.
pub fn execute(ctx: &StageContext<'_>, selection: &Selection) -> Result<StageReport> {
    let printer = ctx.printer;
    printer.header("Republishing Docker images...");

    let mut record = ctx.workspace.load_state(ctx.spec)?;
    let mut logged_in = false;
    let activity = Stage::Docker.skip_phrase();
    let report = for_each_selected(ctx.spec, printer, selection, activity, |component| {
        if component.docker_images.is_empty() {
            printer.step(&format!(
                "Repository {} has no Docker images.",
                component.repository_name
            ));
            return Ok(());
        }

        for image in &component.docker_images {
            if !logged_in {
                printer.step("Logging into the registry...");
                ctx.registry
                    .login(&ctx.credentials.docker, ctx.settings.registry.as_deref())?;
                printer.done("logged in.");
                logged_in = true;
            }

            let source = image.reference();
            let target = baseline_reference(image, &ctx.spec.tag);

            printer.step(&format!("Pulling image {}...", source));
            ctx.registry.pull(&source)?;
            printer.done("image pulled.");

            printer.step(&format!("Tagging it with {}...", ctx.spec.tag));
            ctx.registry.tag(&source, &target)?;
            printer.done("tagged.");

            printer.step("Pushing new tag...");
            ctx.registry.push(&target)?;
            printer.done(&format!("{} pushed.", target));
        }

        record.mark_images_published(&component.repository_name);
        ctx.workspace.save_state(&record)
    })?;

    printer.done("all Docker images were republished.");
    Ok(report)
}

//! Read-only report of the recorded component state.

use super::{for_each_selected, Selection, StageReport};
use crate::error::Result;
use crate::output::Printer;
use crate::spec::{BaselineSpec, Component};
use crate::state::StateRecord;
use crate::workspace::Workspace;

fn describe(record: &StateRecord, workspace: &Workspace, component: &Component) -> String {
    let name = &component.repository_name;
    let state = record.get(name);
    let progress = state
        .progress
        .map(|p| p.to_string())
        .unwrap_or_else(|| "untouched".to_string());
    let copy = if workspace.has_working_copy(name) {
        "present"
    } else {
        "missing"
    };
    let images = if component.docker_images.is_empty() {
        "none"
    } else if state.images_published {
        "published"
    } else {
        "pending"
    };
    format!(
        "{}: {} (working copy {}, images {})",
        name, progress, copy, images
    )
}

/// Print the state of the selected components for baseline `spec.tag`.
///
/// Needs no credentials and never touches a repository.
pub fn execute(
    spec: &BaselineSpec,
    workspace: &Workspace,
    selection: &Selection,
    printer: &Printer,
) -> Result<StageReport> {
    printer.header(&format!("Status of baseline {}", spec.tag));
    let record = workspace.load_state(spec)?;
    for_each_selected(spec, printer, selection, "status", |component| {
        printer.step(&describe(&record, workspace, component));
        Ok(())
    })
}

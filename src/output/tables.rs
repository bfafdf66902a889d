use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use circleci_client::{Job, JobStatus, Pipeline, PipelineState, Workflow, WorkflowStatus};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn workflow_status_cell(status: WorkflowStatus) -> Cell {
    let color = match status {
        WorkflowStatus::Success => TableColor::Green,
        WorkflowStatus::Failed
        | WorkflowStatus::Error
        | WorkflowStatus::Failing
        | WorkflowStatus::Unauthorized => TableColor::Red,
        WorkflowStatus::Running | WorkflowStatus::OnHold => TableColor::Yellow,
        WorkflowStatus::NotRun | WorkflowStatus::Canceled => TableColor::Grey,
    };
    Cell::new(status.as_str()).fg(color)
}

pub fn job_status_cell(status: JobStatus) -> Cell {
    let color = match status {
        JobStatus::Success => TableColor::Green,
        JobStatus::Failed
        | JobStatus::Error
        | JobStatus::InfrastructureFail
        | JobStatus::Timedout
        | JobStatus::TerminatedUnknown
        | JobStatus::Unauthorized => TableColor::Red,
        JobStatus::Running
        | JobStatus::Queued
        | JobStatus::OnHold
        | JobStatus::Blocked
        | JobStatus::NotRunning => TableColor::Yellow,
        JobStatus::NotRun | JobStatus::Retried | JobStatus::Canceled => TableColor::Grey,
    };
    Cell::new(status.as_str()).fg(color)
}

fn pipeline_state_cell(state: PipelineState) -> Cell {
    let (text, color) = match state {
        PipelineState::Created => ("created", TableColor::Green),
        PipelineState::Errored => ("errored", TableColor::Red),
        PipelineState::SetupPending => ("setup-pending", TableColor::Yellow),
        PipelineState::Setup => ("setup", TableColor::Yellow),
        PipelineState::Pending => ("pending", TableColor::Yellow),
    };
    Cell::new(text).fg(color)
}

pub fn pipelines_table(pipelines: &[Pipeline]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["#", "State", "Branch", "Revision", "Trigger", "Created"]);
    for pipeline in pipelines {
        table.add_row(vec![
            Cell::new(pipeline.number),
            pipeline_state_cell(pipeline.state),
            Cell::new(pipeline.vcs.branch.as_deref().unwrap_or("-")),
            Cell::new(pipeline.vcs.revision.chars().take(8).collect::<String>()),
            Cell::new(&pipeline.trigger.actor.login),
            Cell::new(pipeline.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn workflows_table(workflows: &[Workflow]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Name", "Status", "Ended", "Pipeline #", "Link"]);
    for workflow in workflows {
        table.add_row(vec![
            Cell::new(&workflow.name),
            workflow_status_cell(workflow.status),
            Cell::new(if workflow.ended() { "yes" } else { "no" }),
            Cell::new(workflow.pipeline_number),
            Cell::new(workflow.app_url()),
        ]);
    }
    table
}

pub fn jobs_table(jobs: &[Job]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["#", "Name", "Status", "Ended", "Duration"]);
    for job in jobs {
        let duration = match (job.started_at, job.stopped_at) {
            (Some(start), Some(stop)) => format!("{}s", (stop - start).num_seconds()),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(job.job_number.map_or_else(|| "-".to_string(), |n| n.to_string())),
            Cell::new(&job.name),
            job_status_cell(job.status),
            Cell::new(if job.ended() { "yes" } else { "no" }),
            Cell::new(duration),
        ]);
    }
    table
}

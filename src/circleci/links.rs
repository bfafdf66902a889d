//! Web UI links derived from API records.
//!
//! All links are computed on demand from the stored fields.

use super::ids::{ProjectSlug, WorkflowId};
use super::types::{Job, Workflow};

const APP_URL: &str = "https://app.circleci.com/pipelines";

impl ProjectSlug {
    /// Web UI page listing the project's pipelines.
    ///
    /// # Returns
    ///
    /// Clickable URL (e.g., <https://app.circleci.com/pipelines/gh/acme/widgets>)
    pub fn app_url(&self) -> String {
        format!("{APP_URL}/{self}")
    }
}

impl Workflow {
    /// Web UI page of this workflow, built from its slug, pipeline number and id.
    ///
    /// # Returns
    ///
    /// Clickable URL (e.g., <https://app.circleci.com/pipelines/gh/acme/widgets/25/workflows/fda0...>)
    pub fn app_url(&self) -> String {
        format!(
            "{}/{}/workflows/{}",
            self.project_slug.app_url(),
            self.pipeline_number,
            self.id
        )
    }
}

impl Job {
    /// Web UI page of this job within its workflow.
    ///
    /// Job records do not carry their workflow, so the caller passes it in.
    ///
    /// # Arguments
    ///
    /// * `pipeline_number` - Number of the pipeline the workflow belongs to
    /// * `workflow_id` - Workflow the job ran in
    ///
    /// # Returns
    ///
    /// Clickable URL, or `None` for jobs without a number (approval jobs, jobs not started yet)
    pub fn app_url(&self, pipeline_number: u64, workflow_id: WorkflowId) -> Option<String> {
        let number = self.job_number?;
        Some(format!(
            "{}/{}/workflows/{}/jobs/{}",
            self.project_slug.app_url(),
            pipeline_number,
            workflow_id,
            number
        ))
    }
}

mod fetch;
mod paginate;
mod transport;

use std::time::Duration;

use log::info;

pub use fetch::{fetch_page, validate};
pub use paginate::{paginate, Paginator};
pub use transport::{HttpTransport, Transport, DEFAULT_BASE_URL};

use super::ids::{Branch, PageToken, PipelineId, ProjectSlug, WorkflowId};
use super::params::{PipelineWorkflowsParams, ProjectPipelinesParams, WorkflowJobsParams};
use super::types::{
    Job, Pipeline, PipelineWorkflowsPage, ProjectPipelinesPage, Workflow, WorkflowJobsPage,
};
use crate::auth::Token;
use crate::error::Result;

/// Settings needed to build a [`CircleCiClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Token,
    pub timeout: Option<Duration>,
    /// Upper bound on pages fetched by one auto-paginating walk.
    pub max_pages: Option<usize>,
}

impl ClientConfig {
    pub fn new(token: Token) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
            timeout: None,
            max_pages: None,
        }
    }
}

pub type ProjectPipelines<'a, X> = Paginator<'a, X, Pipeline, ProjectPipelinesParams>;
pub type PipelineWorkflows<'a, X> = Paginator<'a, X, Workflow, PipelineWorkflowsParams>;
pub type WorkflowJobs<'a, X> = Paginator<'a, X, Job, WorkflowJobsParams>;

/// Read-only CircleCI v2 client.
///
/// Every collection is available as a single page (`project_pipelines`,
/// `pipeline_workflows`, ...) for manual cursor handling, and as a lazy
/// iterator over all pages (`iter_*`).
pub struct CircleCiClient<X = HttpTransport> {
    transport: X,
    max_pages: Option<usize>,
}

impl CircleCiClient<HttpTransport> {
    /// Client against the public CircleCI API.
    pub fn new(token: Token) -> Result<Self> {
        Self::from_config(&ClientConfig::new(token))
    }

    /// Builds an HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// [`CircleCiError::Config`](crate::CircleCiError::Config) if the base URL
    /// does not parse or the HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport =
            HttpTransport::new(&config.base_url, config.token.clone(), config.timeout)?;
        info!("CircleCI client targeting {}", transport.api_url());

        Ok(Self {
            transport,
            max_pages: config.max_pages,
        })
    }
}

impl<X: Transport> CircleCiClient<X> {
    /// Client over any [`Transport`], with no page cap.
    pub fn with_transport(transport: X) -> Self {
        Self {
            transport,
            max_pages: None,
        }
    }

    /// Caps every `iter_*` walk at `max_pages` pages.
    #[must_use]
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Fetches one page of a project's pipelines, newest first.
    ///
    /// # Arguments
    ///
    /// * `project` - Project slug (e.g., "gh/acme/widgets")
    /// * `branch` - Only pipelines built for this branch
    /// * `page_token` - Continuation token from a previous page; `None` for the first page
    ///
    /// # Returns
    ///
    /// The page, with `next_page_token` set when more pipelines remain.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status, a network failure, or a body that is not a
    /// valid pipeline page.
    pub fn project_pipelines(
        &self,
        project: &ProjectSlug,
        branch: Option<Branch>,
        page_token: Option<PageToken>,
    ) -> Result<ProjectPipelinesPage> {
        fetch_page(
            &self.transport,
            &project_pipelines_endpoint(project),
            &ProjectPipelinesParams { branch, page_token },
        )
    }

    /// Every pipeline of `project`, fetched lazily page by page.
    ///
    /// # Arguments
    ///
    /// * `project` - Project slug (e.g., "gh/acme/widgets")
    /// * `branch` - Only pipelines built for this branch; kept on every page request
    ///
    /// # Returns
    ///
    /// An iterator of pipelines. No request is sent until it is first advanced.
    pub fn iter_project_pipelines(
        &self,
        project: &ProjectSlug,
        branch: Option<Branch>,
    ) -> ProjectPipelines<'_, X> {
        paginate(
            &self.transport,
            &project_pipelines_endpoint(project),
            ProjectPipelinesParams {
                branch,
                page_token: None,
            },
        )
        .max_pages(self.max_pages)
    }

    /// Fetches one page of the workflows of a pipeline.
    ///
    /// # Arguments
    ///
    /// * `pipeline_id` - Pipeline UUID
    /// * `page_token` - Continuation token from a previous page; `None` for the first page
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CircleCiClient::project_pipelines`].
    pub fn pipeline_workflows(
        &self,
        pipeline_id: PipelineId,
        page_token: Option<PageToken>,
    ) -> Result<PipelineWorkflowsPage> {
        fetch_page(
            &self.transport,
            &pipeline_workflows_endpoint(pipeline_id),
            &PipelineWorkflowsParams { page_token },
        )
    }

    /// Every workflow of a pipeline, fetched lazily.
    pub fn iter_pipeline_workflows(&self, pipeline_id: PipelineId) -> PipelineWorkflows<'_, X> {
        paginate(
            &self.transport,
            &pipeline_workflows_endpoint(pipeline_id),
            PipelineWorkflowsParams::default(),
        )
        .max_pages(self.max_pages)
    }

    /// Fetches one page of the jobs of a workflow.
    ///
    /// # Arguments
    ///
    /// * `workflow_id` - Workflow UUID
    /// * `page_token` - Continuation token from a previous page; `None` for the first page
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CircleCiClient::project_pipelines`].
    pub fn workflow_jobs(
        &self,
        workflow_id: WorkflowId,
        page_token: Option<PageToken>,
    ) -> Result<WorkflowJobsPage> {
        fetch_page(
            &self.transport,
            &workflow_jobs_endpoint(workflow_id),
            &WorkflowJobsParams { page_token },
        )
    }

    /// Every job of a workflow, fetched lazily.
    pub fn iter_workflow_jobs(&self, workflow_id: WorkflowId) -> WorkflowJobs<'_, X> {
        paginate(
            &self.transport,
            &workflow_jobs_endpoint(workflow_id),
            WorkflowJobsParams::default(),
        )
        .max_pages(self.max_pages)
    }

    /// Most recent pipeline of `project`, in server order.
    ///
    /// Reads only the first page. `Ok(None)` when the project has no pipelines.
    pub fn latest_pipeline(
        &self,
        project: &ProjectSlug,
        branch: Option<Branch>,
    ) -> Result<Option<Pipeline>> {
        let page = self.project_pipelines(project, branch, None)?;
        Ok(page.items.into_iter().next())
    }

    /// One page of workflows of the project's most recent pipeline.
    ///
    /// `Ok(None)` when the project has no pipelines.
    pub fn latest_pipeline_workflows(
        &self,
        project: &ProjectSlug,
        branch: Option<Branch>,
        page_token: Option<PageToken>,
    ) -> Result<Option<PipelineWorkflowsPage>> {
        self.latest_pipeline(project, branch)?
            .map(|pipeline| self.pipeline_workflows(pipeline.id, page_token))
            .transpose()
    }

    /// All workflows of the project's most recent pipeline.
    ///
    /// Resolving the pipeline costs one request up front; workflows are then
    /// fetched lazily.
    pub fn iter_latest_pipeline_workflows(
        &self,
        project: &ProjectSlug,
        branch: Option<Branch>,
    ) -> Result<Option<PipelineWorkflows<'_, X>>> {
        Ok(self
            .latest_pipeline(project, branch)?
            .map(|pipeline| self.iter_pipeline_workflows(pipeline.id)))
    }
}

fn project_pipelines_endpoint(project: &ProjectSlug) -> String {
    format!("project/{}/pipeline", project.encode())
}

fn pipeline_workflows_endpoint(pipeline_id: PipelineId) -> String {
    format!("pipeline/{pipeline_id}/workflow")
}

fn workflow_jobs_endpoint(workflow_id: WorkflowId) -> String {
    format!("workflow/{workflow_id}/job")
}

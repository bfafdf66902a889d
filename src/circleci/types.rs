use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{JobId, PageToken, PipelineId, ProjectSlug, UserId, WorkflowId};

/// One response's worth of items plus the cursor for the next one.
///
/// `next_page_token` is `None` on the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next_page_token: Option<PageToken>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next_page_token.is_some()
    }
}

pub type ProjectPipelinesPage = Page<Pipeline>;
pub type PipelineWorkflowsPage = Page<Workflow>;
pub type WorkflowJobsPage = Page<Job>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineErrorType {
    Config,
    ConfigFetch,
    Timeout,
    Permission,
    Other,
    Plan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineError {
    #[serde(rename = "type")]
    pub kind: PipelineErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    ScheduledPipeline,
    Explicit,
    Api,
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
    pub avatar_url: String,
}

/// What started a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerType,
    pub received_at: DateTime<Utc>,
    pub actor: Actor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub subject: String,
    pub body: String,
}

/// VCS metadata attached to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineVcs {
    pub provider_name: String,
    pub target_repository_url: String,
    pub origin_repository_url: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub review_url: Option<String>,
    pub revision: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub commit: Option<Commit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    Created,
    Errored,
    SetupPending,
    Setup,
    Pending,
}

/// A CircleCI pipeline as returned by `project/{slug}/pipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub errors: Vec<PipelineError>,
    pub project_slug: ProjectSlug,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub number: u64,
    pub state: PipelineState,
    pub created_at: DateTime<Utc>,
    /// Free-form pipeline parameters supplied at trigger time.
    #[serde(default)]
    pub trigger_parameters: Option<serde_json::Map<String, serde_json::Value>>,
    pub trigger: Trigger,
    pub vcs: PipelineVcs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Success,
    Running,
    NotRun,
    Failed,
    Error,
    Failing,
    OnHold,
    Canceled,
    Unauthorized,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Error | Self::Canceled | Self::Unauthorized
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Running => "running",
            Self::NotRun => "not_run",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Failing => "failing",
            Self::OnHold => "on_hold",
            Self::Canceled => "canceled",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// A workflow belonging to a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub pipeline_id: PipelineId,
    #[serde(default)]
    pub canceled_by: Option<UserId>,
    #[serde(default)]
    pub errored_by: Option<UserId>,
    pub name: String,
    pub project_slug: ProjectSlug,
    #[serde(default)]
    pub tag: Option<String>,
    pub status: WorkflowStatus,
    pub started_by: UserId,
    pub pipeline_number: u64,
    pub created_at: DateTime<Utc>,
    /// Unset while the workflow is still running.
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
}

impl Workflow {
    /// Whether the workflow has reached a status it will not leave.
    pub fn ended(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Build,
    Approval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Running,
    NotRun,
    Failed,
    Error,
    Retried,
    Queued,
    NotRunning,
    InfrastructureFail,
    Timedout,
    OnHold,
    #[serde(rename = "terminated-unknown")]
    TerminatedUnknown,
    Blocked,
    Canceled,
    Unauthorized,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failed
                | Self::Error
                | Self::Canceled
                | Self::Unauthorized
                | Self::Timedout
                | Self::InfrastructureFail
                | Self::TerminatedUnknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Running => "running",
            Self::NotRun => "not_run",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Retried => "retried",
            Self::Queued => "queued",
            Self::NotRunning => "not_running",
            Self::InfrastructureFail => "infrastructure_fail",
            Self::Timedout => "timedout",
            Self::OnHold => "on_hold",
            Self::TerminatedUnknown => "terminated-unknown",
            Self::Blocked => "blocked",
            Self::Canceled => "canceled",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// A job within a workflow. Approval jobs have no `job_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JobType,
    pub status: JobStatus,
    #[serde(default)]
    pub job_number: Option<u64>,
    pub project_slug: ProjectSlug,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<JobId>,
    #[serde(default)]
    pub approval_request_id: Option<JobId>,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub canceled_by: Option<UserId>,
}

impl Job {
    /// Whether the job has reached a status it will not leave.
    pub fn ended(&self) -> bool {
        self.status.is_terminal()
    }
}

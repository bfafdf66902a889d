//! CircleCI v2 API: identifiers, resource schema and the paginating client.

pub mod client;
pub mod ids;
mod links;
pub mod params;
pub mod types;

pub use client::{CircleCiClient, ClientConfig, HttpTransport, Paginator, Transport};
pub use ids::{Branch, JobId, PageToken, PipelineId, ProjectSlug, UserId, WorkflowId};
pub use types::{Job, JobStatus, Page, Pipeline, PipelineState, Workflow, WorkflowStatus};

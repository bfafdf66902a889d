//! Read-only client for the CircleCI v2 REST API.
//!
//! Projects, pipelines, workflows and jobs can be read one page at a time or
//! through lazy iterators that follow continuation tokens until the last page.
//!
//! ```no_run
//! use circleci_client::{CircleCiClient, ProjectSlug, Token};
//!
//! # fn main() -> circleci_client::Result<()> {
//! let client = CircleCiClient::new(Token::from("my-token"))?;
//! let project = ProjectSlug::github("acme", "widgets")?;
//! for pipeline in client.iter_project_pipelines(&project, None).take(10) {
//!     let pipeline = pipeline?;
//!     println!("#{} {:?}", pipeline.number, pipeline.state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod circleci;
pub mod config;
pub mod error;

pub use auth::Token;
pub use circleci::{
    Branch, CircleCiClient, ClientConfig, Job, JobId, JobStatus, Page, PageToken, Pipeline,
    PipelineId, PipelineState, Paginator, ProjectSlug, Transport, UserId, Workflow, WorkflowId,
    WorkflowStatus,
};
pub use error::{CircleCiError, Result};

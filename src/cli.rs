use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use circleci_client::config::{Config, OutputFormat};
use circleci_client::{
    Branch, CircleCiClient, Page, PageToken, PipelineId, ProjectSlug, Token, WorkflowId,
};

use crate::output::{self, bright_yellow, Listing};

#[derive(Parser)]
#[command(name = "circleci")]
#[command(author, version, about = "Read-only CircleCI API client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// CircleCI personal API token
    #[arg(short, long, global = true, env = "CIRCLECI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path to a config file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List pipelines of a project, newest first
    Pipelines {
        /// Project slug, e.g. gh/org/repo
        #[arg(short = 'P', long)]
        project: Option<String>,

        #[arg(short, long)]
        branch: Option<String>,

        /// Stop after this many pipelines
        #[arg(short, long, conflicts_with = "page_token")]
        limit: Option<usize>,

        /// Fetch only the page at this token
        #[arg(long)]
        page_token: Option<String>,
    },
    /// List workflows of a pipeline
    Workflows {
        #[arg(long)]
        pipeline: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List jobs of a workflow
    Jobs {
        #[arg(long)]
        workflow: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List workflows of the most recent pipeline of a project
    Latest {
        #[arg(short = 'P', long)]
        project: Option<String>,

        #[arg(short, long)]
        branch: Option<String>,
    },
}

/// Collects up to `limit` items; the iterator is dropped before any further page is requested.
fn collect_limited<T>(
    items: impl Iterator<Item = circleci_client::Result<T>>,
    limit: Option<usize>,
) -> Result<Vec<T>> {
    let collected = items
        .take(limit.unwrap_or(usize::MAX))
        .collect::<circleci_client::Result<Vec<T>>>()?;
    Ok(collected)
}

fn report_next_page<T>(page: &Page<T>) {
    if let Some(token) = &page.next_page_token {
        eprintln!("{} {token}", bright_yellow("More results, next page token:"));
    }
}

impl Cli {
    fn resolve_project(config: &Config, project: Option<&str>) -> Result<ProjectSlug> {
        let raw = project
            .or(config.circleci.project.as_deref())
            .context("No project given: pass --project or set circleci.project in the config file")?;
        Ok(ProjectSlug::decode(raw)?)
    }

    fn resolve_branch(config: &Config, branch: Option<&str>) -> Option<Branch> {
        branch
            .or(config.circleci.branch.as_deref())
            .map(Branch::from)
    }

    fn list(&self, config: &Config, client: &CircleCiClient) -> Result<Listing> {
        match &self.command {
            Commands::Pipelines {
                project,
                branch,
                limit,
                page_token,
            } => {
                let project = Self::resolve_project(config, project.as_deref())?;
                let branch = Self::resolve_branch(config, branch.as_deref());
                info!("Listing pipelines for project: {project}");

                let pipelines = if let Some(token) = page_token {
                    let page = client.project_pipelines(
                        &project,
                        branch,
                        Some(PageToken::from(token.as_str())),
                    )?;
                    report_next_page(&page);
                    page.items
                } else {
                    collect_limited(client.iter_project_pipelines(&project, branch), *limit)?
                };
                Ok(Listing::Pipelines(pipelines))
            }
            Commands::Workflows { pipeline, limit } => {
                let pipeline_id: PipelineId = pipeline
                    .parse()
                    .with_context(|| format!("Invalid pipeline id: {pipeline}"))?;
                info!("Listing workflows for pipeline: {pipeline_id}");

                let workflows = collect_limited(client.iter_pipeline_workflows(pipeline_id), *limit)?;
                Ok(Listing::Workflows(workflows))
            }
            Commands::Jobs { workflow, limit } => {
                let workflow_id: WorkflowId = workflow
                    .parse()
                    .with_context(|| format!("Invalid workflow id: {workflow}"))?;
                info!("Listing jobs for workflow: {workflow_id}");

                let jobs = collect_limited(client.iter_workflow_jobs(workflow_id), *limit)?;
                Ok(Listing::Jobs(jobs))
            }
            Commands::Latest { project, branch } => {
                let project = Self::resolve_project(config, project.as_deref())?;
                let branch = Self::resolve_branch(config, branch.as_deref());
                info!("Listing workflows of the latest pipeline for project: {project}");

                let workflows = match client.iter_latest_pipeline_workflows(&project, branch)? {
                    Some(walker) => collect_limited(walker, None)?,
                    None => {
                        info!("Project {project} has no pipelines");
                        Vec::new()
                    }
                };
                Ok(Listing::Workflows(workflows))
            }
        }
    }

    pub fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let token = self.token.as_deref().map(Token::from);
        let client = CircleCiClient::from_config(&config.circleci.client_config(token)?)?;

        let listing = self.list(&config, &client)?;
        info!("Fetched {} records", listing.len());

        let format = self.format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;
        let rendered = listing.render(format, pretty)?;

        output::emit(&rendered, self.output.as_deref())
    }
}

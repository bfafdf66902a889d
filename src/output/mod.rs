mod styling;
mod tables;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use circleci_client::config::OutputFormat;
use circleci_client::{Job, Pipeline, Workflow};

pub use styling::{bright_yellow, dim, magenta_bold};

/// Prints the banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⚙ circleci"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CircleCI API client")
    );
}

/// A list of records that can be shown as a table or as JSON.
pub enum Listing {
    Pipelines(Vec<Pipeline>),
    Workflows(Vec<Workflow>),
    Jobs(Vec<Job>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Self::Pipelines(items) => items.len(),
            Self::Workflows(items) => items.len(),
            Self::Jobs(items) => items.len(),
        }
    }

    fn render_table(&self) -> String {
        match self {
            Self::Pipelines(items) => tables::pipelines_table(items).to_string(),
            Self::Workflows(items) => tables::workflows_table(items).to_string(),
            Self::Jobs(items) => tables::jobs_table(items).to_string(),
        }
    }

    fn render_json(&self, pretty: bool) -> Result<String> {
        match self {
            Self::Pipelines(items) => to_json(items, pretty),
            Self::Workflows(items) => to_json(items, pretty),
            Self::Jobs(items) => to_json(items, pretty),
        }
    }

    pub fn render(&self, format: OutputFormat, pretty: bool) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => self.render_json(pretty),
        }
    }
}

fn to_json<T: Serialize>(items: &[T], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(items)?
    } else {
        serde_json::to_string(items)?
    };
    Ok(json)
}

/// Writes rendered output to `path`, or stdout when no path is given.
pub fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
        info!("Output written to: {}", path.display());
    } else {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
    }
    Ok(())
}

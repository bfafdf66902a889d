use serde::Serialize;

use super::ids::{Branch, PageToken};
use crate::error::Result;

/// Query record of an endpoint that accepts a continuation token.
pub trait PageQuery: Serialize + Clone {
    fn page_token(&self) -> Option<&PageToken>;

    fn set_page_token(&mut self, token: Option<PageToken>);
}

/// Query for `project/{slug}/pipeline`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPipelinesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<PageToken>,
}

/// Query for `pipeline/{id}/workflow`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineWorkflowsParams {
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<PageToken>,
}

/// Query for `workflow/{id}/job`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowJobsParams {
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<PageToken>,
}

impl PageQuery for ProjectPipelinesParams {
    fn page_token(&self) -> Option<&PageToken> {
        self.page_token.as_ref()
    }

    fn set_page_token(&mut self, token: Option<PageToken>) {
        self.page_token = token;
    }
}

impl PageQuery for PipelineWorkflowsParams {
    fn page_token(&self) -> Option<&PageToken> {
        self.page_token.as_ref()
    }

    fn set_page_token(&mut self, token: Option<PageToken>) {
        self.page_token = token;
    }
}

impl PageQuery for WorkflowJobsParams {
    fn page_token(&self) -> Option<&PageToken> {
        self.page_token.as_ref()
    }

    fn set_page_token(&mut self, token: Option<PageToken>) {
        self.page_token = token;
    }
}

/// Flattens a query record into `(name, value)` pairs using its wire names.
///
/// Null fields never appear, so an unset filter is omitted rather than sent empty.
pub fn to_query_pairs<P: Serialize>(params: &P) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params)?;
    let serde_json::Value::Object(fields) = value else {
        return Ok(Vec::new());
    };

    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((name, s)),
            other => Some((name, other.to_string())),
        })
        .collect())
}

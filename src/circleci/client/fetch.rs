use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::transport::Transport;
use crate::circleci::params::to_query_pairs;
use crate::circleci::types::Page;
use crate::error::{CircleCiError, Result};

/// Decodes a raw body into `T`, reporting the target type on failure.
pub fn validate<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| CircleCiError::validation::<T>(&e))
}

/// Fetches and validates a single page of `endpoint`.
///
/// Transport failures are returned unchanged.
pub fn fetch_page<T, X, P>(transport: &X, endpoint: &str, params: &P) -> Result<Page<T>>
where
    T: DeserializeOwned,
    X: Transport + ?Sized,
    P: Serialize,
{
    let query = to_query_pairs(params)?;
    let body = transport.get(endpoint, &query)?;
    let page: Page<T> = validate(&body)?;

    debug!(
        "Fetched {} items from '{endpoint}' (more: {})",
        page.items.len(),
        page.has_next()
    );

    Ok(page)
}

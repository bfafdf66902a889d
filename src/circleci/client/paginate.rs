use std::collections::VecDeque;
use std::iter::FusedIterator;

use log::debug;
use serde::de::DeserializeOwned;

use super::fetch::fetch_page;
use super::transport::Transport;
use crate::circleci::params::PageQuery;
use crate::circleci::types::Page;
use crate::error::{CircleCiError, Result};

/// Lazy iterator over every item of a paginated collection.
///
/// Pages are requested one at a time, only once the items of the previous page
/// have all been handed out. The first error ends the iteration; a fresh
/// [`paginate`] call starts over from page one.
///
/// The server is trusted to eventually stop returning a continuation token.
/// Use [`Paginator::max_pages`] to bound the walk instead.
pub struct Paginator<'a, X, T, P> {
    transport: &'a X,
    endpoint: String,
    params: P,
    buffer: VecDeque<T>,
    done: bool,
    pages_fetched: usize,
    max_pages: Option<usize>,
}

/// Walks `endpoint` from the first page, ignoring any token in `params`.
pub fn paginate<'a, X, T, P>(
    transport: &'a X,
    endpoint: &str,
    params: P,
) -> Paginator<'a, X, T, P>
where
    X: Transport,
    T: DeserializeOwned,
    P: PageQuery,
{
    let mut params = params;
    params.set_page_token(None);

    Paginator {
        transport,
        endpoint: endpoint.to_owned(),
        params,
        buffer: VecDeque::new(),
        done: false,
        pages_fetched: 0,
        max_pages: None,
    }
}

impl<X, T, P> Paginator<'_, X, T, P> {
    /// Caps the number of pages requested. `None` means no cap.
    #[must_use]
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<X, T, P> Iterator for Paginator<'_, X, T, P>
where
    X: Transport,
    T: DeserializeOwned,
    P: PageQuery,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            if let Some(max_pages) = self.max_pages {
                if self.pages_fetched >= max_pages {
                    self.done = true;
                    return Some(Err(CircleCiError::PageLimitExceeded {
                        endpoint: self.endpoint.clone(),
                        max_pages,
                    }));
                }
            }

            let fetched: Result<Page<T>> = fetch_page(self.transport, &self.endpoint, &self.params);
            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.pages_fetched += 1;
            debug!(
                "Fetched page {} of '{}' ({} items)",
                self.pages_fetched,
                self.endpoint,
                page.items.len()
            );

            match page.next_page_token {
                Some(token) => self.params.set_page_token(Some(token)),
                None => {
                    debug!(
                        "Reached last page of '{}' after {} pages",
                        self.endpoint, self.pages_fetched
                    );
                    self.done = true;
                }
            }
            self.buffer.extend(page.items);
        }
    }
}

impl<X, T, P> FusedIterator for Paginator<'_, X, T, P>
where
    X: Transport,
    T: DeserializeOwned,
    P: PageQuery,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circleci::client::testing::MockTransport;
    use crate::circleci::ids::{Branch, PageToken};
    use crate::circleci::params::{PipelineWorkflowsParams, ProjectPipelinesParams};

    fn three_pages() -> MockTransport {
        MockTransport::new(vec![
            Ok(r#"{"next_page_token": "T1", "items": [1, 2]}"#.to_string()),
            Ok(r#"{"next_page_token": "T2", "items": [3]}"#.to_string()),
            Ok(r#"{"next_page_token": null, "items": [4, 5]}"#.to_string()),
        ])
    }

    #[test]
    fn test_flattens_pages_in_order() {
        let transport = MockTransport::new(vec![
            Ok(r#"{"next_page_token": "T1", "items": [1, 2]}"#.to_string()),
            Ok(r#"{"next_page_token": null, "items": [3]}"#.to_string()),
        ]);

        let items: Vec<u32> = paginate(&transport, "numbers", PipelineWorkflowsParams::default())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].1.is_empty());
        assert_eq!(
            requests[1].1,
            vec![("page-token".to_string(), "T1".to_string())]
        );
    }

    #[test]
    fn test_early_termination_fetches_only_first_page() {
        let transport = three_pages();

        let first: Option<Result<u32>> =
            paginate(&transport, "numbers", PipelineWorkflowsParams::default()).next();

        assert_eq!(first.unwrap().unwrap(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_next_page_fetched_only_when_buffer_drained() {
        let transport = three_pages();
        let mut walker = paginate::<_, u32, _>(&transport, "numbers", PipelineWorkflowsParams::default());

        assert_eq!(walker.next().unwrap().unwrap(), 1);
        assert_eq!(walker.next().unwrap().unwrap(), 2);
        assert_eq!(transport.requests().len(), 1);

        assert_eq!(walker.next().unwrap().unwrap(), 3);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(walker.pages_fetched(), 2);
    }

    #[test]
    fn test_error_on_second_page_after_first_items() {
        let transport = MockTransport::new(vec![
            Ok(r#"{"next_page_token": "T1", "items": [1, 2]}"#.to_string()),
            Err(CircleCiError::Transport {
                status: 502,
                endpoint: "numbers".to_string(),
            }),
        ]);

        let results: Vec<Result<u32>> =
            paginate(&transport, "numbers", PipelineWorkflowsParams::default()).collect();

        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].as_ref().unwrap(), 1);
        assert_eq!(*results[1].as_ref().unwrap(), 2);
        assert!(matches!(
            results[2],
            Err(CircleCiError::Transport { status: 502, .. })
        ));
    }

    #[test]
    fn test_iteration_ends_after_error() {
        let transport = MockTransport::new(vec![Ok("not json".to_string())]);
        let mut walker = paginate::<_, u32, _>(&transport, "numbers", PipelineWorkflowsParams::default());

        assert!(matches!(
            walker.next(),
            Some(Err(CircleCiError::Validation { .. }))
        ));
        assert!(walker.next().is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_starting_token_is_cleared() {
        let transport = MockTransport::new(vec![Ok(r#"{"items": [7]}"#.to_string())]);
        let params = ProjectPipelinesParams {
            branch: Some(Branch::from("main")),
            page_token: Some(PageToken::from("stale")),
        };

        let items: Vec<u32> = paginate(&transport, "numbers", params)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items, vec![7]);
        assert_eq!(
            transport.requests()[0].1,
            vec![("branch".to_string(), "main".to_string())]
        );
    }

    #[test]
    fn test_empty_intermediate_page_is_skipped() {
        let transport = MockTransport::new(vec![
            Ok(r#"{"next_page_token": "T1", "items": []}"#.to_string()),
            Ok(r#"{"items": [9]}"#.to_string()),
        ]);

        let items: Vec<u32> = paginate(&transport, "numbers", PipelineWorkflowsParams::default())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items, vec![9]);
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_pages_fetched_counts_pages_not_items() {
        let transport = three_pages();
        let mut walker =
            paginate::<_, u32, _>(&transport, "numbers", PipelineWorkflowsParams::default());

        assert_eq!(walker.pages_fetched(), 0);
        walker.next();
        assert_eq!(walker.pages_fetched(), 1);
        walker.by_ref().take(2).for_each(drop);
        assert_eq!(walker.pages_fetched(), 2);
        walker.by_ref().for_each(drop);
        assert_eq!(walker.pages_fetched(), 3);
        assert_eq!(walker.endpoint(), "numbers");
    }

    #[test]
    fn test_page_cap_stops_walk() {
        let transport = three_pages();

        let results: Vec<Result<u32>> =
            paginate(&transport, "numbers", PipelineWorkflowsParams::default())
                .max_pages(Some(2))
                .collect();

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(results.len(), 4);
        assert!(matches!(
            results[3],
            Err(CircleCiError::PageLimitExceeded { max_pages: 2, .. })
        ));
    }

    #[test]
    fn test_page_cap_not_hit_when_walk_finishes() {
        let transport = three_pages();

        let items: Vec<u32> = paginate(&transport, "numbers", PipelineWorkflowsParams::default())
            .max_pages(Some(3))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_each_call_starts_from_first_page() {
        let transport = MockTransport::new(vec![
            Ok(r#"{"next_page_token": "T1", "items": [1]}"#.to_string()),
            Ok(r#"{"next_page_token": "T1", "items": [1]}"#.to_string()),
        ]);

        let first = paginate::<_, u32, _>(&transport, "numbers", PipelineWorkflowsParams::default())
            .next()
            .unwrap()
            .unwrap();
        let second = paginate::<_, u32, _>(&transport, "numbers", PipelineWorkflowsParams::default())
            .next()
            .unwrap()
            .unwrap();

        assert_eq!((first, second), (1, 1));
        let requests = transport.requests();
        assert!(requests[0].1.is_empty());
        assert!(requests[1].1.is_empty());
    }
}

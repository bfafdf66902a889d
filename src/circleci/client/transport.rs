use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::auth::Token;
use crate::error::{CircleCiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://circleci.com/api/v2/";

/// Issues one authenticated GET and hands back the raw body.
///
/// Implementations must fail on non-2xx responses and must not retry.
pub trait Transport {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<String>;
}

impl<X: Transport + ?Sized> Transport for &X {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<String> {
        (**self).get(endpoint, query)
    }
}

/// Blocking HTTP transport backed by a pooled `reqwest` client.
///
/// The client is shared by every request; nothing per-request is stored here.
pub struct HttpTransport {
    client: Client,
    api_url: Url,
    token: Token,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: Token, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "circleci-client/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CircleCiError::Config(format!("Failed to create HTTP client: {e}")))?;

        // stored with a trailing '/' so the logged API root reads as a directory
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let api_url = Url::parse(&normalized)
            .map_err(|e| CircleCiError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Appends `endpoint` to the API root one segment at a time.
    ///
    /// Each `/`-separated segment is percent-encoded, so `#` or `?` inside a
    /// project name stay part of the path.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CircleCiError::Config(format!("Base URL cannot take a path: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(endpoint.trim_start_matches('/').split('/'));
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<String> {
        let url = self.endpoint_url(endpoint)?;
        debug!("GET {url} {query:?}");

        let mut request = self
            .client
            .get(url)
            .basic_auth(self.token.as_str(), Some(""))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!("CircleCI API returned {status} for '{endpoint}'");
            return Err(CircleCiError::Transport {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
            });
        }

        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn transport(server: &mockito::Server) -> HttpTransport {
        HttpTransport::new(
            &format!("{}/api/v2", server.url()),
            Token::from("secret"),
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_get_sends_basic_auth_and_content_type() {
        let mut server = mockito::Server::new();
        // "secret:" base64-encoded
        let mock = server
            .mock("GET", "/api/v2/workflow/abc/job")
            .match_header("authorization", "Basic c2VjcmV0Og==")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create();

        let body = transport(&server).get("workflow/abc/job", &[]).unwrap();

        assert_eq!(body, r#"{"items": []}"#);
        mock.assert();
    }

    #[test]
    fn test_get_passes_query_pairs() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v2/project/gh/acme/widgets/pipeline")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("branch".into(), "main".into()),
                Matcher::UrlEncoded("page-token".into(), "T1".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create();

        let query = vec![
            ("branch".to_string(), "main".to_string()),
            ("page-token".to_string(), "T1".to_string()),
        ];
        transport(&server)
            .get("project/gh/acme/widgets/pipeline", &query)
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_get_without_query_sends_no_query_string() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v2/pipeline/abc/workflow")
            .match_query(Matcher::Exact(String::new()))
            .with_status(200)
            .with_body("{}")
            .create();

        transport(&server).get("pipeline/abc/workflow", &[]).unwrap();

        mock.assert();
    }

    #[test]
    fn test_non_success_status_is_transport_error() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v2/pipeline/abc/workflow")
            .with_status(404)
            .with_body(r#"{"message": "Not found"}"#)
            .expect(1)
            .create();

        let err = transport(&server)
            .get("pipeline/abc/workflow", &[])
            .unwrap_err();

        assert!(matches!(
            err,
            CircleCiError::Transport { status: 404, ref endpoint } if endpoint == "pipeline/abc/workflow"
        ));
        assert_eq!(err.status(), Some(404));
        mock.assert();
    }

    #[test]
    fn test_base_url_without_trailing_slash_is_normalized() {
        let transport =
            HttpTransport::new("https://circleci.example.com/api/v2", Token::from("t"), None)
                .unwrap();
        assert_eq!(
            transport.endpoint_url("workflow/x/job").unwrap().as_str(),
            "https://circleci.example.com/api/v2/workflow/x/job"
        );
    }

    #[test]
    fn test_endpoint_segments_are_percent_encoded() {
        let transport =
            HttpTransport::new("https://circleci.com/api/v2/", Token::from("t"), None).unwrap();

        assert_eq!(
            transport
                .endpoint_url("project/gh/acme/wid#gets/pipeline")
                .unwrap()
                .as_str(),
            "https://circleci.com/api/v2/project/gh/acme/wid%23gets/pipeline"
        );
        assert_eq!(
            transport
                .endpoint_url("project/gh/acme/wid?gets/pipeline")
                .unwrap()
                .as_str(),
            "https://circleci.com/api/v2/project/gh/acme/wid%3Fgets/pipeline"
        );
        assert_eq!(
            transport
                .endpoint_url("project/gh/100%/pipeline")
                .unwrap()
                .as_str(),
            "https://circleci.com/api/v2/project/gh/100%25/pipeline"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpTransport::new("not a url", Token::from("t"), None);
        assert!(matches!(result, Err(CircleCiError::Config(_))));
    }
}

// src/probe/http.rs
// =============================================================================
// This module issues one HTTP request for one candidate path.
//
// Key functionality:
// - Every probe uses the same request shape (method, headers, query
//   parameters, body) built once from the configuration
// - Redirects are never followed: a 301/302 is itself something to classify
// - Each request has its own timeout; there is no cross-probe cancellation
// - Wall-clock time of the whole request (headers + body) is measured
// - Transport failures come back as ProbeError, tagged with the path, and are
//   classified into a few kinds (timeout, connect, TLS, ...)
// =============================================================================

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::error::ConfigError;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// The shape shared by every probe request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub headers: HeaderMap,
    pub params: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            params: Vec::new(),
            body: None,
        }
    }
}

/// Everything we keep from one completed request
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// The path that was probed, as it sits in the frontier
    pub path: String,
    /// The URL that was requested
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    /// Response headers in wire order; repeated names appear repeatedly
    pub headers: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Why a probe produced no response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Tls,
    /// Headers arrived but reading the body failed
    Body,
    Other,
}

/// A transport-level failure for one path. Never fatal to the scan.
#[derive(Debug, Error)]
#[error("request for {path} failed ({kind:?}): {source}")]
pub struct ProbeError {
    pub path: String,
    pub kind: TransportKind,
    #[source]
    pub source: reqwest::Error,
}

/// Issues probe requests against one target.
///
/// Cheap to clone: the reqwest client is reference counted internally and the
/// request shape sits behind an Arc.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    base_url: Arc<str>,
    request: Arc<RequestSpec>,
}

impl Prober {
    /// Builds a prober for `base_url`.
    ///
    /// `base_url` is the target without a trailing slash; probed paths are
    /// appended to it.
    pub fn new(
        base_url: &str,
        request: RequestSpec,
        proxy: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none());

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|source| ConfigError::InvalidProxy {
                url: proxy_url.to_string(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            request: Arc::new(request),
        })
    }

    /// The full URL a path is requested at
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Requests one path and reads the whole response.
    pub async fn probe(&self, path: String) -> Result<ProbeOutcome, ProbeError> {
        let url = self.url_for(&path);
        let start = Instant::now();

        let mut request = self
            .client
            .request(self.request.method.clone(), &url)
            .headers(self.request.headers.clone());
        if !self.request.params.is_empty() {
            request = request.query(&self.request.params);
        }
        if let Some(body) = &self.request.body {
            request = request.body(body.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                let kind = categorize_error(&source);
                return Err(ProbeError { path, kind, source });
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(source) => {
                let kind = if source.is_timeout() {
                    TransportKind::Timeout
                } else {
                    TransportKind::Body
                };
                return Err(ProbeError { path, kind, source });
            }
        };

        Ok(ProbeOutcome {
            path,
            url,
            status,
            body,
            headers,
            elapsed: start.elapsed(),
        })
    }
}

// Sorts a reqwest error into a TransportKind
//
// reqwest doesn't expose TLS failures as their own category, so we fall back
// to looking at the message text for those.
fn categorize_error(error: &reqwest::Error) -> TransportKind {
    let text = error.to_string().to_lowercase();

    if error.is_timeout() {
        TransportKind::Timeout
    } else if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
        TransportKind::Tls
    } else if error.is_connect() {
        TransportKind::Connect
    } else if error.is_body() || error.is_decode() {
        TransportKind::Body
    } else {
        TransportKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober(base: &str, request: RequestSpec) -> Prober {
        Prober::new(base, request, None, DEFAULT_TIMEOUT).expect("prober builds")
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let p = prober("http://example.com/", RequestSpec::default());
        assert_eq!(p.url_for("/admin"), "http://example.com/admin");
        assert_eq!(p.url_for("admin"), "http://example.com/admin");
        assert_eq!(p.url_for("//admin"), "http://example.com/admin");
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let p = prober("http://example.com/app", RequestSpec::default());
        assert_eq!(p.url_for("/login"), "http://example.com/app/login");
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let result = Prober::new(
            "http://example.com",
            RequestSpec::default(),
            Some("::not a proxy::"),
            DEFAULT_TIMEOUT,
        );
        assert!(matches!(result, Err(ConfigError::InvalidProxy { .. })));
    }

    #[tokio::test]
    async fn test_probe_collects_status_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hello"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-powered-by", "php")
                    .set_body_string("hello world"),
            )
            .mount(&server)
            .await;

        let outcome = prober(&server.uri(), RequestSpec::default())
            .probe("/hello".to_string())
            .await
            .expect("probe succeeds");

        assert_eq!(outcome.path, "/hello");
        assert_eq!(outcome.url, format!("{}/hello", server.uri()));
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.text(), "hello world");
        assert!(outcome
            .headers
            .iter()
            .any(|(n, v)| n == "x-powered-by" && v == "php"));
    }

    #[tokio::test]
    async fn test_probe_does_not_follow_redirects() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = prober(&server.uri(), RequestSpec::default())
            .probe("/old".to_string())
            .await
            .expect("probe succeeds");

        assert_eq!(outcome.status, 302);
    }

    #[tokio::test]
    async fn test_probe_applies_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(header("x-test", "1"))
            .and(query_param("debug", "true"))
            .and(body_string("a=b"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-test"), HeaderValue::from_static("1"));
        let request = RequestSpec {
            method: Method::POST,
            headers,
            params: vec![("debug".to_string(), "true".to_string())],
            body: Some("a=b".to_string()),
        };

        let outcome = prober(&server.uri(), request)
            .probe("/api".to_string())
            .await
            .expect("probe succeeds");

        assert_eq!(outcome.status, 201);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Grab a free port, then close the listener so nothing answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = prober(&format!("http://{}", addr), RequestSpec::default())
            .probe("/admin".to_string())
            .await
            .expect_err("nothing is listening");

        assert_eq!(err.path, "/admin");
        assert_eq!(err.kind, TransportKind::Connect);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let p = Prober::new(
            &server.uri(),
            RequestSpec::default(),
            None,
            Duration::from_millis(200),
        )
        .unwrap();
        let err = p.probe("/slow".to_string()).await.expect_err("times out");

        assert_eq!(err.kind, TransportKind::Timeout);
    }
}

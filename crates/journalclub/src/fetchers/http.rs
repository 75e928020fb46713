//! HTTP fetcher
//!
//! Redirects are followed by hand rather than by reqwest so that relative
//! `Location` values can be resolved against the current hop and the bound
//! can be reported with the originating URL.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::types::{FetchRequest, FetchResponse};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// HTTP/HTTPS fetcher
///
/// - GET only
/// - follows up to `max_redirects` redirects, relative targets included
/// - deadlines on connect, first byte and full body
pub struct HttpFetcher {
    client: reqwest::Client,
    options: FetchOptions,
}

impl HttpFetcher {
    /// Create a fetcher with the given options
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(options.connect_timeout())
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(Self { client, options })
    }

    /// Options this fetcher was built with
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut current = validate_url(&request.url)?;
        let mut redirects = 0;

        loop {
            debug!(url = %current, redirects, "GET");

            let mut http_request = self.client.get(current.clone());
            for (name, value) in &request.headers {
                http_request = http_request.header(name.as_str(), value.as_str());
            }

            let response = tokio::time::timeout(
                self.options.first_byte_timeout(),
                http_request.send(),
            )
            .await
            .map_err(|_| FetchError::FirstByteTimeout {
                url: current.to_string(),
            })?
            .map_err(FetchError::from_reqwest)?;

            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = response.headers().get(LOCATION) {
                    if redirects >= self.options.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: request.url.clone(),
                            limit: self.options.max_redirects,
                        });
                    }
                    let next = resolve_location(&current, location)?;
                    debug!(
                        from = %current,
                        to = %next,
                        status = status.as_u16(),
                        "Following redirect"
                    );
                    redirects += 1;
                    current = next;
                    continue;
                }
            }

            if !status.is_success() {
                warn!(url = %current, status = status.as_u16(), "Non-success response");
            }

            let body =
                read_body_with_deadline(response, self.options.body_timeout(), &current).await?;

            return Ok(FetchResponse {
                url: current.to_string(),
                status_code: status.as_u16(),
                redirects,
                content: String::from_utf8_lossy(&body).into_owned(),
            });
        }
    }
}

/// Check the URL is present and http(s)
fn validate_url(url: &str) -> Result<Url, FetchError> {
    if url.is_empty() {
        return Err(FetchError::MissingUrl);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }
    Url::parse(url).map_err(|_| FetchError::InvalidUrlScheme)
}

/// Resolve a `Location` header against the URL that produced it
fn resolve_location(current: &Url, location: &HeaderValue) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidRedirect {
        url: current.to_string(),
        location: String::from_utf8_lossy(location.as_bytes()).into_owned(),
    };

    let location = location.to_str().map_err(|_| invalid())?;
    let next = current.join(location.trim()).map_err(|_| invalid())?;
    match next.scheme() {
        "http" | "https" => Ok(next),
        _ => Err(invalid()),
    }
}

/// Read the whole response body, failing if it does not finish by the deadline
async fn read_body_with_deadline(
    response: reqwest::Response,
    timeout: Duration,
    url: &Url,
) -> Result<Bytes, FetchError> {
    let mut body = BytesMut::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk from {}: {}", url, e);
                        return Err(FetchError::from_reqwest(e));
                    }
                    None => {
                        return Ok(body.freeze());
                    }
                }
            }
            _ = timeout_future => {
                warn!(url = %url, received = body.len(), "Body deadline reached");
                return Err(FetchError::BodyTimeout { url: url.to_string() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(matches!(validate_url(""), Err(FetchError::MissingUrl)));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(FetchError::InvalidUrlScheme)
        ));
        assert!(validate_url("https://example.com/a").is_ok());
    }

    #[test]
    fn test_resolve_absolute_location() {
        let current = Url::parse("https://doi.org/10.1/a").unwrap();
        let location = HeaderValue::from_static("https://dl.acm.org/doi/10.1/a");
        assert_eq!(
            resolve_location(&current, &location).unwrap().as_str(),
            "https://dl.acm.org/doi/10.1/a"
        );
    }

    #[test]
    fn test_resolve_relative_location() {
        let current = Url::parse("https://example.com/papers/list?page=2").unwrap();

        let location = HeaderValue::from_static("/moved/list");
        assert_eq!(
            resolve_location(&current, &location).unwrap().as_str(),
            "https://example.com/moved/list"
        );

        let location = HeaderValue::from_static("other");
        assert_eq!(
            resolve_location(&current, &location).unwrap().as_str(),
            "https://example.com/papers/other"
        );
    }

    #[test]
    fn test_resolve_rejects_non_http_location() {
        let current = Url::parse("https://example.com/").unwrap();
        let location = HeaderValue::from_static("mailto:someone@example.com");
        assert!(matches!(
            resolve_location(&current, &location),
            Err(FetchError::InvalidRedirect { .. })
        ));
    }

    #[test]
    fn test_http_fetcher_name() {
        let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
        assert_eq!(fetcher.name(), "http");
        assert_eq!(fetcher.options().max_redirects, 20);
    }
}

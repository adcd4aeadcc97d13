//! Redirect resolution for remote (`http`/`https`) inputs.
//!
//! The encoder follows redirects poorly, so URL inputs are resolved to their
//! final location before the command is assembled.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;

use crate::error::{CoreError, CoreResult};

/// Response to a single redirect-free HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub location: Option<String>,
}

/// Issues HEAD requests without following redirects.
pub trait RedirectClient {
    fn head(&self, url: &str) -> CoreResult<HeadResponse>;
}

/// [`RedirectClient`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct HttpRedirectClient {
    client: Client,
}

impl HttpRedirectClient {
    pub fn new() -> CoreResult<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| CoreError::RemoteInput(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl RedirectClient for HttpRedirectClient {
    fn head(&self, url: &str) -> CoreResult<HeadResponse> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| CoreError::RemoteInput(format!("HEAD {url} failed: {e}")))?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(HeadResponse {
            status: response.status().as_u16(),
            location,
        })
    }
}

/// Whether `input` names a remote resource.
#[must_use]
pub fn is_remote(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Follows redirects from `url` until a 2xx answer.
///
/// Fails with [`CoreError::TooManyRedirects`] once more than `max_attempts`
/// redirects have been followed.
pub fn resolve_remote_input(
    url: &str,
    max_attempts: u32,
    client: &dyn RedirectClient,
) -> CoreResult<String> {
    let mut current =
        Url::parse(url).map_err(|e| CoreError::RemoteInput(format!("invalid URL {url}: {e}")))?;
    let mut redirects = 0u32;

    loop {
        let response = client.head(current.as_str())?;
        match response.status {
            200..=299 => {
                if redirects > 0 {
                    log::debug!("Resolved {url} to {current} after {redirects} redirect(s)");
                }
                return Ok(current.to_string());
            }
            300..=399 => {
                let Some(location) = response.location else {
                    return Err(CoreError::RemoteInput(format!(
                        "{current} answered {} without a Location header",
                        response.status
                    )));
                };
                redirects += 1;
                if redirects > max_attempts {
                    return Err(CoreError::TooManyRedirects {
                        url: url.to_string(),
                        limit: max_attempts,
                    });
                }
                current = current.join(&location).map_err(|e| {
                    CoreError::RemoteInput(format!("bad redirect target {location}: {e}"))
                })?;
                log::debug!("Following redirect {redirects} to {current}");
            }
            status => {
                return Err(CoreError::RemoteInput(format!(
                    "{current} answered with status {status}"
                )));
            }
        }
    }
}

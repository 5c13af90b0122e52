// 🌐 Fetcher - register download that never fails the run
//
// Every transport problem becomes `FetchOutcome::Unavailable`. Redirects are
// followed by hand; the scheme is checked on every hop.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// OUTCOME TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub text: String,
    pub content_type: Option<String>,
    pub final_url: String,
    /// Redirects followed before the body was served
    pub hops: usize,
}

impl FetchedBody {
    /// Error pages come back as HTML with a 200; the register is never markup
    pub fn looks_like_html(&self) -> bool {
        let starts_with_markup = self.text.trim_start().starts_with('<');
        let html_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        starts_with_markup || html_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Body(FetchedBody),
    Unavailable(String),
}

impl FetchOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, FetchOutcome::Body(_))
    }
}

// ============================================================================
// FETCHER
// ============================================================================

pub struct Fetcher {
    client: Client,
    max_redirects: usize,
}

impl Fetcher {
    /// Build the HTTP client. Fails only if the TLS backend cannot initialise.
    pub fn new(user_agent: &str, timeout: Duration, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Fetcher {
            client,
            max_redirects,
        })
    }

    /// GET the url, following at most `max_redirects` redirects
    pub fn fetch(&self, url: &str) -> FetchOutcome {
        let mut current = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return unavailable(format!("invalid url {url}: {e}")),
        };

        for hop in 0..=self.max_redirects {
            if !matches!(current.scheme(), "http" | "https") {
                return unavailable(format!("unsupported scheme in {current}"));
            }

            debug!(url = %current, hop, "requesting");
            let response = match self.client.get(current.clone()).send() {
                Ok(response) => response,
                Err(e) => return unavailable(format!("request to {current} failed: {e}")),
            };

            let status = response.status();
            if status.is_redirection() {
                let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                else {
                    return unavailable(format!("HTTP {status} from {current} without Location"));
                };

                let next = match current.join(location) {
                    Ok(next) => next,
                    Err(e) => return unavailable(format!("bad redirect target {location:?}: {e}")),
                };
                debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return unavailable(format!("HTTP {status} from {current}"));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            let bytes = match response.bytes() {
                Ok(bytes) => bytes,
                Err(e) => return unavailable(format!("reading body from {current} failed: {e}")),
            };

            let text = String::from_utf8_lossy(&bytes)
                .trim_start_matches('\u{feff}')
                .to_string();

            info!(url = %current, hops = hop, bytes = bytes.len(), "fetched source");
            return FetchOutcome::Body(FetchedBody {
                text,
                content_type,
                final_url: current.to_string(),
                hops: hop,
            });
        }

        unavailable(format!(
            "too many redirects (more than {})",
            self.max_redirects
        ))
    }
}

fn unavailable(reason: String) -> FetchOutcome {
    warn!(%reason, "source unavailable");
    FetchOutcome::Unavailable(reason)
}

// ============================================================================
// TESTS
// ============================================================================

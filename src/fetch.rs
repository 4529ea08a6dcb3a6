use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::browser::BrowserSession;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser navigation retry policy: fixed attempt count with
/// exponential backoff, then one unscripted HTTP fallback.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Extra wait after load completion for script-driven content.
    pub settle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            settle: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following 0-based `attempt`, doubling
    /// each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.pow(attempt)
    }
}

/// How a page's HTML was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    Browser,
    Http,
}

#[derive(Debug)]
pub struct FetchedPage {
    pub html: String,
    /// URL after redirects; relative links resolve against this.
    pub final_url: String,
    pub path: FetchPath,
}

/// Fetches rendered pages: scripted browser first (with retry), plain
/// HTTP GET as the last resort. With no session every fetch goes
/// straight to HTTP.
pub struct PageFetcher {
    session: Option<Arc<BrowserSession>>,
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(session: Option<BrowserSession>, client: reqwest::Client) -> Self {
        Self {
            session: session.map(Arc::new),
            client,
            policy: RetryPolicy::default(),
        }
    }

    pub fn has_browser(&self) -> bool {
        self.session.is_some()
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if let Some(session) = &self.session {
            for attempt in 0..self.policy.max_attempts {
                match self.render_in_browser(session, url).await {
                    Ok((html, final_url)) => {
                        info!("Fetched {} with browser (attempt {})", url, attempt + 1);
                        return Ok(FetchedPage {
                            html,
                            final_url,
                            path: FetchPath::Browser,
                        });
                    }
                    Err(e) if attempt + 1 < self.policy.max_attempts => {
                        let delay = self.policy.backoff(attempt);
                        warn!(
                            "Browser navigation to {} failed (attempt {}/{}): {}; retrying in {:.0?}",
                            url,
                            attempt + 1,
                            self.policy.max_attempts,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Err(e) => {
                        warn!(
                            "Browser navigation to {} failed after {} attempts: {}; falling back to HTTP",
                            url, self.policy.max_attempts, e
                        );
                    }
                }
            }
        }

        self.http_get(url).await
    }

    async fn render_in_browser(
        &self,
        session: &Arc<BrowserSession>,
        url: &str,
    ) -> Result<(String, String)> {
        let session = Arc::clone(session);
        let url = url.to_string();
        let settle = self.policy.settle;
        tokio::task::spawn_blocking(move || session.render(&url, settle))
            .await
            .context("browser task panicked")?
    }

    /// Unscripted GET with a browser user-agent; only HTTP 200 counts
    /// as success. No retries on this path.
    async fn http_get(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed for {url}"))?;

        if response.status() != StatusCode::OK {
            bail!("HTTP error: {}", response.status().as_u16());
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        info!("Fetched {} with plain HTTP", url);
        Ok(FetchedPage {
            html,
            final_url,
            path: FetchPath::Http,
        })
    }
}

/// Shared client: browser user-agent, 30s timeout.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

// ── Tests ──

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use headless_chrome::protocol::cdp::Network::ResourceType;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::info;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// A headless Chrome session reused across the whole batch. The browser
/// process is torn down when the session is dropped.
pub struct BrowserSession {
    // Held so the browser process lives as long as the session.
    _browser: Browser,
    tab: Arc<Tab>,
    /// Status of the most recent main-document response, fed by a
    /// network listener registered at open time.
    last_status: Arc<Mutex<Option<i64>>>,
}

impl BrowserSession {
    /// Launch the browser and route any triggered file downloads into
    /// `download_dir`.
    pub fn open(download_dir: &Path) -> Result<Self> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            ..Default::default()
        })
        .context("failed to launch headless browser")?;

        let tab = browser.new_tab().context("failed to open browser tab")?;
        tab.set_default_timeout(NAVIGATION_TIMEOUT);
        tab.call_method(Page::SetDownloadBehavior {
            behavior: Page::SetDownloadBehaviorBehaviorOption::Allow,
            download_path: Some(download_dir.to_string_lossy().into_owned()),
        })
        .context("failed to set download directory")?;

        let last_status = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&last_status);
        tab.register_response_handling(
            "document_status",
            Box::new(move |params, _fetch_body| {
                if params.Type == ResourceType::Document {
                    *slot.lock().unwrap() = Some(params.response.status as i64);
                }
            }),
        )
        .context("failed to register response listener")?;

        info!("Browser session started");
        Ok(Self {
            _browser: browser,
            tab,
            last_status,
        })
    }

    /// Navigate to `url`, wait for load completion plus a settle delay
    /// for deferred script-driven content, and return the rendered HTML
    /// together with the tab's final URL. A non-OK document response
    /// fails the attempt even though an error page rendered.
    pub fn render(&self, url: &str, settle: Duration) -> Result<(String, String)> {
        self.last_status.lock().unwrap().take();

        self.tab
            .navigate_to(url)
            .with_context(|| format!("navigation to {url} failed"))?
            .wait_until_navigated()
            .with_context(|| format!("page load for {url} did not complete"))?;

        if let Some(status) = *self.last_status.lock().unwrap() {
            if !is_ok_status(status) {
                bail!("HTTP error: {status}");
            }
        }
        std::thread::sleep(settle);

        let html = self.tab.get_content().context("could not read page content")?;
        Ok((html, self.tab.get_url()))
    }
}

/// Successful range for a document response, as browsers define ok.
fn is_ok_status(status: i64) -> bool {
    (200..300).contains(&status)
}

// ── Tests ──

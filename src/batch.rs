use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::documents;
use crate::extract;
use crate::fetch::{self, PageFetcher};
use crate::model::FetchResult;

/// Document candidates processed per page with the browser available,
/// and in HTTP-only mode.
const MAX_DOCUMENTS: usize = 5;
const MAX_DOCUMENTS_FALLBACK: usize = 3;

/// Runs a batch of URLs strictly sequentially. Owns the HTTP client,
/// the optional browser session, and a temp directory for downloads
/// that is removed when the runner is dropped.
pub struct BatchRunner {
    fetcher: PageFetcher,
    client: reqwest::Client,
    download_dir: TempDir,
}

impl BatchRunner {
    /// Build a runner. A browser launch failure is not fatal: the whole
    /// batch downgrades to the plain-HTTP path with a smaller document
    /// cap.
    pub fn init(use_browser: bool) -> Result<Self> {
        let download_dir = tempfile::Builder::new()
            .prefix("grant_research_")
            .tempdir()
            .context("failed to create download directory")?;

        let session = if use_browser {
            match BrowserSession::open(download_dir.path()) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Browser unavailable, batch falls back to plain HTTP: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        let client = fetch::build_client()?;
        Ok(Self {
            fetcher: PageFetcher::new(session, client.clone()),
            client,
            download_dir,
        })
    }

    fn document_cap(&self) -> usize {
        if self.fetcher.has_browser() {
            MAX_DOCUMENTS
        } else {
            MAX_DOCUMENTS_FALLBACK
        }
    }

    /// Process every URL independently; one FetchResult per input URL,
    /// in input order. A failing URL never aborts the batch.
    pub async fn run(&self, urls: &[String]) -> Vec<FetchResult> {
        let pb = ProgressBar::new(urls.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .expect("static progress template")
                .progress_chars("=> "),
        );

        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            pb.set_message(url.clone());
            info!("Scraping {}", url);
            let result = match self.scrape_one(url).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Error scraping {}: {:#}", url, e);
                    FetchResult::failed(url, format!("{e:#}"))
                }
            };
            results.push(result);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let ok = results.iter().filter(|r| r.success).count();
        info!("Batch done: {} ok, {} failed", ok, results.len() - ok);
        results
    }

    async fn scrape_one(&self, url: &str) -> Result<FetchResult> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => return Ok(FetchResult::failed(url, format!("{e:#}"))),
        };

        let page_text = extract::text::html_to_text(&page.html);
        let mut info = extract::extract_grant_info(&page_text);

        let candidates = documents::find_document_links(&page.html, &page.final_url);
        let mut docs = Vec::new();
        for link in candidates.iter().take(self.document_cap()) {
            match documents::fetch_document(&self.client, link, self.download_dir.path()).await {
                Ok(doc) => {
                    // Page-derived records win over same-named document records.
                    extract::merge_programs(&mut info.programs, &doc.info.programs);
                    docs.push(doc);
                }
                Err(e) => warn!("Error processing document {}: {:#}", link.url, e),
            }
        }

        Ok(FetchResult {
            url: url.to_string(),
            success: true,
            page_text,
            documents: docs,
            info,
            error: None,
        })
    }
}

// ── Tests ──

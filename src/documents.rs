use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

use crate::extract;
use crate::model::DocumentResult;

/// Stored document text is capped to this many characters; field
/// extraction runs over the capped text.
pub const MAX_DOCUMENT_CHARS: usize = 10_000;

/// A candidate downloadable document found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLink {
    pub url: String,
    pub anchor_text: String,
}

/// Find PDF candidates among a page's anchors: href ends in ".pdf"
/// (case-insensitive) or contains "pdf". Relative hrefs are resolved
/// against the page's final URL; source order is preserved.
pub fn find_document_links(html: &str, page_url: &str) -> Vec<DocumentLink> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");
    let base = Url::parse(page_url).ok();

    let mut links = Vec::new();
    for el in doc.select(&anchors) {
        let Some(href) = el.value().attr("href") else { continue };
        let lower = href.to_lowercase();
        if !(lower.ends_with(".pdf") || lower.contains("pdf")) {
            continue;
        }

        let resolved = if lower.starts_with("http://") || lower.starts_with("https://") {
            href.to_string()
        } else {
            match base.as_ref().and_then(|b| b.join(href).ok()) {
                Some(url) => url.to_string(),
                None => continue,
            }
        };

        links.push(DocumentLink {
            url: resolved,
            anchor_text: el.text().collect::<String>().trim().to_string(),
        });
    }
    links
}

/// Download a document into `dir`, extract its text, cap it, and run
/// field extraction over the capped text.
pub async fn fetch_document(
    client: &reqwest::Client,
    link: &DocumentLink,
    dir: &Path,
) -> Result<DocumentResult> {
    let file_name = file_name_for(&link.url);
    let path = download(client, &link.url, dir, &file_name).await?;
    info!("Downloaded document: {}", path.display());

    let text = extract_pdf_text(&path).await?;
    let text = cap_chars(&text, MAX_DOCUMENT_CHARS);
    let info = extract::extract_grant_info(&text);

    Ok(DocumentResult {
        url: link.url.clone(),
        file_name,
        anchor_text: link.anchor_text.clone(),
        text,
        info,
    })
}

/// Filename from the URL path, defaulting to a timestamped name,
/// with a ".pdf" suffix forced.
pub fn file_name_for(url: &str) -> String {
    let mut name = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segs| segs.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    if name.trim().is_empty() {
        name = format!("document_{}.pdf", chrono::Utc::now().timestamp());
    }
    if !name.to_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }
    name
}

async fn download(
    client: &reqwest::Client,
    url: &str,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed for {url}"))?
        .error_for_status()?;

    let path = dir.join(file_name);
    let mut file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("cannot create {}", path.display()))?;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(path)
}

async fn extract_pdf_text(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await?
        .map_err(|e| {
            warn!("PDF text extraction failed: {}", e);
            anyhow::anyhow!("pdf extraction failed: {e}")
        })?;
    Ok(text)
}

/// Truncate to at most `max` characters on a char boundary.
pub fn cap_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ── Tests ──

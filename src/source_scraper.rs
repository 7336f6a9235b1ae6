use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::config::HarvestConfig;
use crate::error::HarvestError;

pub const DEFAULT_DOWNLOAD_NAME: &str = "downloaded.pdf";

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("hardcoded anchor selector is valid"));

pub fn build_client(config: &HarvestConfig) -> Result<Client, HarvestError> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|error| HarvestError::Http(format!("failed to build HTTP client: {error}")))
}

async fn get_checked(
    client: &Client,
    url: &str,
    what: &str,
) -> Result<reqwest::Response, HarvestError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Fetch(format!(
            "failed to fetch {what} {url}: status {}",
            status.as_u16()
        )));
    }
    Ok(response)
}

fn is_absolute_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves `href` against the page URL by plain joining, so the page URL
/// always acts as a directory.
pub fn resolve_href(page_url: &str, href: &str) -> String {
    if is_absolute_href(href) {
        return href.to_string();
    }
    format!(
        "{}/{}",
        page_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

/// Collects the distinct PDF links of an HTML page.
pub fn extract_pdf_links(html: &str, page_url: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.to_ascii_lowercase().contains(".pdf"))
        .map(|href| resolve_href(page_url, href))
        .collect()
}

pub async fn discover_pdf_links(
    client: &Client,
    page_url: &str,
) -> Result<BTreeSet<String>, HarvestError> {
    tracing::info!(url = page_url, "searching page for PDF links");
    let html = get_checked(client, page_url, "page").await?.text().await?;
    let links = extract_pdf_links(&html, page_url);
    tracing::info!(url = page_url, count = links.len(), "found PDF links");
    Ok(links)
}

/// Local file name for a PDF URL: the last path segment, without query or
/// fragment.
pub fn pdf_file_name_from_url(url: &str) -> Result<String, HarvestError> {
    let parsed = Url::parse(url)?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string(), str::to_string);
    Ok(name)
}

pub async fn download_pdf(
    client: &Client,
    url: &str,
    destination_dir: &Path,
) -> Result<PathBuf, HarvestError> {
    let filename = pdf_file_name_from_url(url)?;
    tracing::info!(url, "downloading PDF");

    let bytes = get_checked(client, url, "PDF").await?.bytes().await?;
    tokio::fs::create_dir_all(destination_dir).await?;
    let path = std::path::absolute(destination_dir.join(filename))?;
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "downloaded PDF");
    Ok(path)
}

//! The parsed-document handle checks read from.
//!
//! `scraper::Html` is not `Send`, so the DOM is extracted exactly once into
//! an owned `ParsedPage` snapshot before any check runs. Checks only read
//! the snapshot; probing checks fetch additional resources on their own.

use indexmap::IndexMap;
use scraper::Html;
use std::time::Instant;
use url::Url;

use crate::error::{AppError, Result};
use crate::extractor::{ExtractedHeading, ExtractedImage, ExtractedLink, PageExtractor};

/// Metadata of the HTTP response the page came from.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: IndexMap<String, String>,
    pub elapsed_ms: u64,
    /// URL after redirects
    pub final_url: Url,
    pub body_bytes: usize,
}

impl ResponseMeta {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Owned, thread-safe snapshot of one fetched page.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub url: Url,
    pub title: Option<String>,
    pub meta_tags: IndexMap<String, String>,
    pub charset: Option<String>,
    pub lang: Option<String>,
    pub canonical: Option<String>,
    pub favicons: Vec<String>,
    pub headings: Vec<ExtractedHeading>,
    pub images: Vec<ExtractedImage>,
    pub links: Vec<ExtractedLink>,
    pub body_text: String,
    pub json_ld_count: usize,
    pub inline_style_count: usize,
    pub http_resources: Vec<String>,
    pub response: ResponseMeta,
}

impl ParsedPage {
    /// Extract everything the checks will need from raw HTML. Must be
    /// called before the page crosses an await point.
    pub fn parse(html: &str, url: Url, response: ResponseMeta) -> Self {
        let document = Html::parse_document(html);
        Self {
            title: PageExtractor::extract_title(&document),
            meta_tags: PageExtractor::extract_meta_tags(&document),
            charset: PageExtractor::extract_charset(&document),
            lang: PageExtractor::extract_html_lang(&document),
            canonical: PageExtractor::extract_canonical(&document),
            favicons: PageExtractor::extract_favicons(&document, &url),
            headings: PageExtractor::extract_headings(&document),
            images: PageExtractor::extract_images(&document, &url),
            links: PageExtractor::extract_links(&document, &url),
            body_text: PageExtractor::extract_body_text(&document),
            json_ld_count: PageExtractor::count_json_ld(&document),
            inline_style_count: PageExtractor::count_inline_styles(&document),
            http_resources: PageExtractor::extract_http_resources(&document),
            url,
            response,
        }
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta_tags.get(name).map(String::as_str)
    }

    pub fn robots_meta(&self) -> Option<&str> {
        self.meta("robots")
    }

    pub fn has_viewport(&self) -> bool {
        self.meta("viewport").is_some()
    }

    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }

    pub fn h1_texts(&self) -> Vec<&str> {
        self.headings
            .iter()
            .filter(|h| h.level == 1)
            .map(|h| h.text.as_str())
            .collect()
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &ExtractedLink> {
        self.links.iter().filter(|l| l.is_internal)
    }

    pub fn external_links(&self) -> impl Iterator<Item = &ExtractedLink> {
        self.links.iter().filter(|l| !l.is_internal)
    }
}

/// Fetch a URL and build its `ParsedPage`. This is the fetch capability the
/// scan worker uses; the engine itself only consumes the result.
pub async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<ParsedPage> {
    let start = Instant::now();
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| AppError::network(format!("failed to fetch {url}: {e}")))?;

    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let mut headers = IndexMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.as_str().to_lowercase())
                .and_modify(|existing: &mut String| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::network(format!("failed to read body of {url}: {e}")))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status >= 400 {
        return Err(AppError::network(format!(
            "{url} returned status {status}"
        )));
    }

    let meta = ResponseMeta {
        status,
        headers,
        elapsed_ms,
        body_bytes: body.len(),
        final_url: final_url.clone(),
    };
    Ok(ParsedPage::parse(&body, final_url, meta))
}

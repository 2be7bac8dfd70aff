//! Stateless DOM extraction over a parsed `scraper::Html`.
//!
//! Selectors are cached in `OnceLock`s since every scan hits the same small
//! set. All extraction happens up front so the resulting data is owned and
//! can cross thread boundaries (`scraper::Html` itself is not `Send`).

use indexmap::IndexMap;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHeading {
    pub level: u8,
    pub text: String,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub loading: Option<String>,
    pub is_decorative: bool,
}

#[derive(Debug, Clone)]
pub struct ExtractedLink {
    pub href: String,
    pub is_internal: bool,
    pub rel: Option<String>,
    pub text: Option<String>,
}

pub struct PageExtractor;

impl PageExtractor {
    pub fn extract_title(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("title").unwrap());
        html.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// All `<meta>` tags keyed by `name` or `property` (lowercased). First
    /// occurrence wins, matching how crawlers read duplicated metas.
    pub fn extract_meta_tags(html: &Html) -> IndexMap<String, String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta").unwrap());

        let mut metas = IndexMap::new();
        for el in html.select(selector) {
            let key = el
                .value()
                .attr("name")
                .or_else(|| el.value().attr("property"));
            if let (Some(key), Some(content)) = (key, el.value().attr("content")) {
                metas
                    .entry(key.trim().to_lowercase())
                    .or_insert_with(|| content.trim().to_string());
            }
        }
        metas
    }

    pub fn extract_charset(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[charset]").unwrap());
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr("charset"))
            .map(|s| s.trim().to_lowercase())
    }

    pub fn extract_html_lang(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("html").unwrap());
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn extract_canonical(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("link[rel='canonical']").unwrap());
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// `href`s of `<link rel="icon">` variants, resolved against the base.
    pub fn extract_favicons(html: &Html, base: &Url) -> Vec<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| {
            Selector::parse("link[rel~='icon'], link[rel='shortcut icon'], link[rel='apple-touch-icon']")
                .unwrap()
        });
        html.select(selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| base.join(href.trim()).ok())
            .map(|u| u.to_string())
            .collect()
    }

    pub fn extract_body_text(html: &Html) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("body").unwrap());
        html.select(selector)
            .next()
            .map(|body| {
                body.text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn extract_headings(html: &Html) -> Vec<ExtractedHeading> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

        html.select(selector)
            .enumerate()
            .filter_map(|(idx, element)| {
                let level = element
                    .value()
                    .name()
                    .trim_start_matches('h')
                    .parse::<u8>()
                    .ok()?;
                let text = element.text().collect::<String>().trim().to_string();
                Some(ExtractedHeading {
                    level,
                    text,
                    position: idx,
                })
            })
            .collect()
    }

    pub fn extract_images(html: &Html, base: &Url) -> Vec<ExtractedImage> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img[src]").unwrap());

        html.select(selector)
            .filter_map(|element| {
                let src = element.value().attr("src")?.trim();
                if src.is_empty() {
                    return None;
                }
                let resolved = base
                    .join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| src.to_string());

                let alt = element.value().attr("alt").map(|s| s.trim().to_string());
                let is_decorative = alt.as_deref().map(|a| a.is_empty()).unwrap_or(false)
                    || element.value().attr("role") == Some("presentation")
                    || element.value().attr("aria-hidden") == Some("true");

                Some(ExtractedImage {
                    src: resolved,
                    alt,
                    width: element
                        .value()
                        .attr("width")
                        .and_then(|w| w.parse::<i64>().ok()),
                    height: element
                        .value()
                        .attr("height")
                        .and_then(|h| h.parse::<i64>().ok()),
                    loading: element.value().attr("loading").map(|s| s.to_string()),
                    is_decorative,
                })
            })
            .collect()
    }

    pub fn extract_links(html: &Html, base: &Url) -> Vec<ExtractedLink> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

        let base_host = base.host_str().map(|s| s.to_string());
        let base_port = base.port();

        let mut links = Vec::new();
        for element in html.select(selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                continue;
            }

            let Ok(resolved) = base.join(href) else {
                continue;
            };
            let is_internal = resolved.host_str().map(|h| h.to_string()) == base_host
                && resolved.port() == base_port;

            let text = element.text().collect::<String>().trim().to_string();
            links.push(ExtractedLink {
                href: resolved.to_string(),
                is_internal,
                rel: element.value().attr("rel").map(|s| s.to_string()),
                text: if text.is_empty() { None } else { Some(text) },
            });
        }
        links
    }

    /// Count of `<script type="application/ld+json">` blocks.
    pub fn count_json_ld(html: &Html) -> usize {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR
            .get_or_init(|| Selector::parse("script[type='application/ld+json']").unwrap());
        html.select(selector).count()
    }

    /// Count of elements carrying an inline `style` attribute.
    pub fn count_inline_styles(html: &Html) -> usize {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("[style]").unwrap());
        html.select(selector).count()
    }

    /// `src`/`href` values loaded over plain http, for mixed-content checks.
    pub fn extract_http_resources(html: &Html) -> Vec<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| {
            Selector::parse("img[src], script[src], link[href], iframe[src], video[src], audio[src]")
                .unwrap()
        });

        html.select(selector)
            .filter_map(|el| el.value().attr("src").or_else(|| el.value().attr("href")))
            .map(str::trim)
            .filter(|v| v.starts_with("http://"))
            .map(|v| v.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(body)
    }

    #[test]
    fn extracts_title_and_trims() {
        let html = doc("<html><head><title>  Hello World </title></head></html>");
        assert_eq!(PageExtractor::extract_title(&html).as_deref(), Some("Hello World"));
    }

    #[test]
    fn empty_title_is_none() {
        let html = doc("<html><head><title>   </title></head></html>");
        assert!(PageExtractor::extract_title(&html).is_none());
    }

    #[test]
    fn meta_tags_keyed_by_name_or_property() {
        let html = doc(
            r#"<head>
                <meta name="description" content="a page">
                <meta property="og:title" content="OG">
                <meta name="description" content="duplicate loses">
            </head>"#,
        );
        let metas = PageExtractor::extract_meta_tags(&html);
        assert_eq!(metas.get("description").map(String::as_str), Some("a page"));
        assert_eq!(metas.get("og:title").map(String::as_str), Some("OG"));
    }

    #[test]
    fn headings_keep_document_order_and_levels() {
        let html = doc("<body><h1>A</h1><h3>B</h3><h2>C</h2></body>");
        let headings = PageExtractor::extract_headings(&html);
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 3, 2]);
        assert_eq!(headings[1].position, 1);
    }

    #[test]
    fn links_split_internal_external_and_skip_pseudo_schemes() {
        let base = Url::parse("https://example.com/page").unwrap();
        let html = doc(
            r##"<body>
                <a href="/about">About</a>
                <a href="https://other.com/x">Other</a>
                <a href="mailto:hi@example.com">Mail</a>
                <a href="#top">Top</a>
            </body>"##,
        );
        let links = PageExtractor::extract_links(&html, &base);
        assert_eq!(links.len(), 2);
        assert!(links[0].is_internal);
        assert!(!links[1].is_internal);
    }

    #[test]
    fn detects_http_resources_for_mixed_content() {
        let html = doc(
            r#"<body>
                <img src="http://cdn.example.com/a.png">
                <script src="https://cdn.example.com/app.js"></script>
            </body>"#,
        );
        let insecure = PageExtractor::extract_http_resources(&html);
        assert_eq!(insecure, vec!["http://cdn.example.com/a.png".to_string()]);
    }
}

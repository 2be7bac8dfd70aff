//! Shared fixtures for unit tests: build page snapshots and check contexts
//! without touching the network.

use indexmap::IndexMap;
use std::sync::Arc;
use url::Url;

use crate::config::EngineConfig;
use crate::document::{ParsedPage, ResponseMeta};
use crate::engine::context::{CheckContext, ResultSink};
use crate::engine::site_root;
use crate::service::http::{create_client, ClientType};

pub(crate) fn response_meta(url: &Url, headers: &[(&str, &str)], elapsed_ms: u64) -> ResponseMeta {
    let mut map = IndexMap::new();
    for (name, value) in headers {
        map.insert(name.to_lowercase(), value.to_string());
    }
    ResponseMeta {
        status: 200,
        headers: map,
        elapsed_ms,
        final_url: url.clone(),
        body_bytes: 0,
    }
}

pub(crate) fn page_from_html(html: &str, url: &str) -> Arc<ParsedPage> {
    page_with_response(html, url, &[], 100)
}

pub(crate) fn page_with_response(
    html: &str,
    url: &str,
    headers: &[(&str, &str)],
    elapsed_ms: u64,
) -> Arc<ParsedPage> {
    let url = Url::parse(url).expect("test URL must parse");
    let mut meta = response_meta(&url, headers, elapsed_ms);
    meta.body_bytes = html.len();
    Arc::new(ParsedPage::parse(html, url, meta))
}

pub(crate) fn ctx_for(page: Arc<ParsedPage>) -> Arc<CheckContext> {
    ctx_with_keyword(page, None)
}

pub(crate) fn ctx_with_keyword(
    page: Arc<ParsedPage>,
    keyword: Option<&str>,
) -> Arc<CheckContext> {
    let source_url = page.url.clone();
    Arc::new(CheckContext {
        base_url: site_root(&source_url),
        source_url,
        keyword: keyword.map(String::from),
        page,
        sink: ResultSink::new(),
        client: create_client(ClientType::Standard).unwrap(),
        no_redirect_client: create_client(ClientType::NoRedirect).unwrap(),
        config: EngineConfig::default(),
    })
}

//! End-to-end run of the full engine against a mock site.

use std::sync::Arc;

use seoscan::domain::models::{Report, Status};
use seoscan::domain::rules::Section;
use seoscan::{fetch_page, SeoEngine};
use url::Url;

fn demo_page(server_url: &str) -> String {
    let title = "Rust performance tuning guide for production web services";
    let description = "A practical walkthrough of profiling and tuning Rust web services in \
                       production, covering allocators, async executors, connection pooling \
                       and the metrics that matter most.";
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <meta name="robots" content="index, follow">
  <meta property="og:title" content="{title}">
  <meta property="og:description" content="{description}">
  <meta property="og:image" content="{server_url}/cover.png">
  <meta name="twitter:card" content="summary_large_image">
  <link rel="canonical" href="{server_url}/">
  <link rel="icon" href="/favicon.ico">
  <script type="application/ld+json">{{"@type":"Article"}}</script>
</head>
<body>
  <h1>Rust performance tuning</h1>
  <h2>Profiling</h2>
  <p>{body}</p>
  <img src="/cover.png" alt="cover" width="800" height="400" loading="lazy">
  <a href="/profiling">Profiling deep dive</a>
  <a href="https://other.example/reference" rel="nofollow">Reference</a>
</body>
</html>"#,
        body = "rust services need careful measurement before any tuning work begins ".repeat(10),
    )
}

async fn mock_site(server: &mut mockito::Server) -> Vec<mockito::Mock> {
    let html = demo_page(&server.url());
    vec![
        server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header("cache-control", "max-age=3600")
            .with_header("strict-transport-security", "max-age=63072000")
            .with_header("x-content-type-options", "nosniff")
            .with_header("x-frame-options", "DENY")
            .with_header("content-security-policy", "default-src 'self'")
            .with_header("referrer-policy", "no-referrer")
            .with_body(html)
            .expect_at_least(1)
            .create_async()
            .await,
        server
            .mock("HEAD", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-length", "12000")
            .expect_at_least(0)
            .create_async()
            .await,
        server
            .mock("GET", mockito::Matcher::Regex("^/.+".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><head><title>leaf</title></head><body><p>leaf page</p></body></html>")
            .expect_at_least(0)
            .create_async()
            .await,
    ]
}

#[tokio::test]
async fn full_engine_run_produces_scored_report() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_site(&mut server).await;

    let url = Url::parse(&format!("{}/", server.url())).unwrap();
    let engine = SeoEngine::with_defaults().unwrap();
    let page = fetch_page(engine.client(), &url).await.unwrap();

    let report = engine.run(Arc::new(page), url, Some("rust")).await;

    assert!(!report.is_base_error(), "errors: {:?}", report.errors);
    assert!(report.total_rules >= 40, "only {} rules recorded", report.total_rules);
    assert!(
        report.seo_final_rating > 0.0 && report.seo_final_rating <= 10.0,
        "score {}",
        report.seo_final_rating
    );

    let title = report
        .results
        .outcome(Section::MetaTags, "title_tag")
        .expect("title_tag outcome");
    assert_eq!(title.rating, 10);
    assert_eq!(title.status, Status::Good);

    let viewport = report
        .results
        .outcome(Section::Mobile, "responsive_design")
        .expect("responsive_design outcome");
    assert_eq!(viewport.rating, 10);

    let density = report
        .results
        .outcome(Section::Content, "keyword_density")
        .expect("keyword_density outcome");
    assert!(density.rating > 0, "keyword should be found in the body");

    // Page is plain http, so the TLS check must land in the issue list.
    let tls = report
        .results
        .outcome(Section::Security, "ssl_certificate")
        .expect("ssl_certificate outcome");
    assert_eq!(tls.rating, 1);
    assert!(
        report.issues.issues.iter().any(|i| i.key == "ssl_certificate"),
        "issues: {:?}",
        report.issues.issues
    );
}

#[tokio::test]
async fn report_survives_a_serde_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_site(&mut server).await;

    let url = Url::parse(&format!("{}/", server.url())).unwrap();
    let engine = SeoEngine::with_defaults().unwrap();
    let page = fetch_page(engine.client(), &url).await.unwrap();
    let report = engine.run(Arc::new(page), url, None).await;

    let json = serde_json::to_string(&report).unwrap();
    let restored: Report = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.seo_final_rating, report.seo_final_rating);
    assert_eq!(restored.total_rules, report.total_rules);
    assert_eq!(restored.issues.count, report.issues.count);
    assert_eq!(restored.results, report.results);
}

#[tokio::test]
async fn broken_site_still_yields_a_report() {
    let mut server = mockito::Server::new_async().await;
    let html = r#"<html><head><title>broken</title></head>
        <body><a href="/dead">dead</a></body></html>"#;
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(html)
        .expect_at_least(1)
        .create_async()
        .await;
    let _rest = server
        .mock("HEAD", mockito::Matcher::Any)
        .with_status(404)
        .expect_at_least(0)
        .create_async()
        .await;
    let _dead = server
        .mock("GET", mockito::Matcher::Regex("^/.+".to_string()))
        .with_status(404)
        .expect_at_least(0)
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/", server.url())).unwrap();
    let engine = SeoEngine::with_defaults().unwrap();
    let page = fetch_page(engine.client(), &url).await.unwrap();
    let report = engine.run(Arc::new(page), url, None).await;

    assert!(!report.is_base_error());
    let broken = report
        .results
        .outcome(Section::Links, "broken_internal_links")
        .expect("broken_internal_links outcome");
    assert_eq!(broken.rating, 2);
    assert!(
        report.issues.issues.iter().any(|i| i.key == "broken_internal_links"),
        "issues: {:?}",
        report.issues.issues
    );
}

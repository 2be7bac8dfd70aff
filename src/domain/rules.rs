//! Canonical rule registry.
//!
//! One closed catalog drives everything: the engine registers a check per
//! rule, the sink stamps each outcome with the rule's priority, and the
//! aggregator reads weights from here. Rule names double as the string keys
//! of the result tree.

use serde::{Deserialize, Serialize};

use crate::domain::models::Priority;

/// Top-level grouping of the result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    MetaTags,
    Headings,
    Content,
    Media,
    Links,
    Site,
    Security,
    Performance,
    Mobile,
    Schema,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::MetaTags => "meta_tags",
            Section::Headings => "headings",
            Section::Content => "content",
            Section::Media => "media",
            Section::Links => "links",
            Section::Site => "site",
            Section::Security => "security",
            Section::Performance => "performance",
            Section::Mobile => "mobile",
            Section::Schema => "schema",
        }
    }
}

/// Every rule the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    // meta_tags
    TitleTag,
    TitleTagLength,
    MetaDescription,
    MetaDescriptionLength,
    MetaKeywords,
    RobotsMetaTag,
    NoindexCheck,
    NofollowCheck,
    CanonicalTagExists,
    CanonicalTagValid,
    HtmlLang,
    CharsetDeclared,
    OpenGraphTags,
    TwitterCard,
    FaviconDeclared,
    // headings
    H1Unique,
    H2TagsExist,
    HeadingStructure,
    // content
    ContentLength,
    KeywordInTitle,
    KeywordInH1,
    KeywordDensity,
    ContentFreshness,
    DuplicateContent,
    // media
    AltAttributes,
    ImageDimensions,
    ImageLazyLoading,
    ImageFileSize,
    // links
    InternalLinksExist,
    ExternalLinksExist,
    NofollowOnExternalLinks,
    BrokenInternalLinks,
    BrokenExternalLinks,
    // site
    RobotsTxtExists,
    XmlSitemapExists,
    FaviconReachable,
    RedirectsMinimized,
    HttpsRedirect,
    PageDepth,
    // security
    SslCertificate,
    SecurityHeaders,
    MixedContent,
    // performance
    PageLoadTime,
    PageSize,
    GzipCompression,
    BrowserCaching,
    InlineStyles,
    // mobile
    ResponsiveDesign,
    // schema
    StructuredData,
}

impl RuleId {
    /// All registered rules, in result-tree order.
    pub const ALL: &'static [RuleId] = &[
        RuleId::TitleTag,
        RuleId::TitleTagLength,
        RuleId::MetaDescription,
        RuleId::MetaDescriptionLength,
        RuleId::MetaKeywords,
        RuleId::RobotsMetaTag,
        RuleId::NoindexCheck,
        RuleId::NofollowCheck,
        RuleId::CanonicalTagExists,
        RuleId::CanonicalTagValid,
        RuleId::HtmlLang,
        RuleId::CharsetDeclared,
        RuleId::OpenGraphTags,
        RuleId::TwitterCard,
        RuleId::FaviconDeclared,
        RuleId::H1Unique,
        RuleId::H2TagsExist,
        RuleId::HeadingStructure,
        RuleId::ContentLength,
        RuleId::KeywordInTitle,
        RuleId::KeywordInH1,
        RuleId::KeywordDensity,
        RuleId::ContentFreshness,
        RuleId::DuplicateContent,
        RuleId::AltAttributes,
        RuleId::ImageDimensions,
        RuleId::ImageLazyLoading,
        RuleId::ImageFileSize,
        RuleId::InternalLinksExist,
        RuleId::ExternalLinksExist,
        RuleId::NofollowOnExternalLinks,
        RuleId::BrokenInternalLinks,
        RuleId::BrokenExternalLinks,
        RuleId::RobotsTxtExists,
        RuleId::XmlSitemapExists,
        RuleId::FaviconReachable,
        RuleId::RedirectsMinimized,
        RuleId::HttpsRedirect,
        RuleId::PageDepth,
        RuleId::SslCertificate,
        RuleId::SecurityHeaders,
        RuleId::MixedContent,
        RuleId::PageLoadTime,
        RuleId::PageSize,
        RuleId::GzipCompression,
        RuleId::BrowserCaching,
        RuleId::InlineStyles,
        RuleId::ResponsiveDesign,
        RuleId::StructuredData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::TitleTag => "title_tag",
            RuleId::TitleTagLength => "title_tag_length",
            RuleId::MetaDescription => "meta_description",
            RuleId::MetaDescriptionLength => "meta_description_length",
            RuleId::MetaKeywords => "meta_keywords",
            RuleId::RobotsMetaTag => "robots_meta_tag",
            RuleId::NoindexCheck => "noindex_check",
            RuleId::NofollowCheck => "nofollow_check",
            RuleId::CanonicalTagExists => "canonical_tag_exists",
            RuleId::CanonicalTagValid => "canonical_tag_valid",
            RuleId::HtmlLang => "html_lang",
            RuleId::CharsetDeclared => "charset_declared",
            RuleId::OpenGraphTags => "open_graph_tags",
            RuleId::TwitterCard => "twitter_card",
            RuleId::FaviconDeclared => "favicon_declared",
            RuleId::H1Unique => "h1_unique",
            RuleId::H2TagsExist => "h2_tags_exist",
            RuleId::HeadingStructure => "heading_structure",
            RuleId::ContentLength => "content_length",
            RuleId::KeywordInTitle => "keyword_in_title",
            RuleId::KeywordInH1 => "keyword_in_h1",
            RuleId::KeywordDensity => "keyword_density",
            RuleId::ContentFreshness => "content_freshness",
            RuleId::DuplicateContent => "duplicate_content",
            RuleId::AltAttributes => "alt_attributes",
            RuleId::ImageDimensions => "image_dimensions",
            RuleId::ImageLazyLoading => "image_lazy_loading",
            RuleId::ImageFileSize => "image_file_size",
            RuleId::InternalLinksExist => "internal_links_exist",
            RuleId::ExternalLinksExist => "external_links_exist",
            RuleId::NofollowOnExternalLinks => "nofollow_on_external_links",
            RuleId::BrokenInternalLinks => "broken_internal_links",
            RuleId::BrokenExternalLinks => "broken_external_links",
            RuleId::RobotsTxtExists => "robots_txt_exists",
            RuleId::XmlSitemapExists => "xml_sitemap_exists",
            RuleId::FaviconReachable => "favicon_reachable",
            RuleId::RedirectsMinimized => "redirects_minimized",
            RuleId::HttpsRedirect => "https_redirect",
            RuleId::PageDepth => "page_depth",
            RuleId::SslCertificate => "ssl_certificate",
            RuleId::SecurityHeaders => "security_headers",
            RuleId::MixedContent => "mixed_content",
            RuleId::PageLoadTime => "page_load_time",
            RuleId::PageSize => "page_size",
            RuleId::GzipCompression => "gzip_compression",
            RuleId::BrowserCaching => "browser_caching",
            RuleId::InlineStyles => "inline_styles",
            RuleId::ResponsiveDesign => "responsive_design",
            RuleId::StructuredData => "structured_data",
        }
    }

    fn spec(&self) -> (Section, Priority, &'static str) {
        use Priority::*;
        use Section::*;
        match self {
            RuleId::TitleTag => (MetaTags, HighPriority, "Check if <title> tag exists"),
            RuleId::TitleTagLength => (MetaTags, HighPriority, "Check title length (ideal 50-60 chars)"),
            RuleId::MetaDescription => (MetaTags, HighPriority, "Check if meta description exists"),
            RuleId::MetaDescriptionLength => (MetaTags, AveragePriority, "Check meta description length (ideal 150-160 chars)"),
            RuleId::MetaKeywords => (MetaTags, LowPriority, "Check if meta keywords exist"),
            RuleId::RobotsMetaTag => (MetaTags, AveragePriority, "Check if robots meta tag exists"),
            RuleId::NoindexCheck => (MetaTags, HighPriority, "Check if the page is marked as noindex"),
            RuleId::NofollowCheck => (MetaTags, AveragePriority, "Check if the page is marked as nofollow"),
            RuleId::CanonicalTagExists => (MetaTags, AveragePriority, "Check if canonical tag exists"),
            RuleId::CanonicalTagValid => (MetaTags, AveragePriority, "Check if canonical tag points to a valid URL"),
            RuleId::HtmlLang => (MetaTags, LowPriority, "Check if <html> declares a lang attribute"),
            RuleId::CharsetDeclared => (MetaTags, LowPriority, "Check if a character encoding is declared"),
            RuleId::OpenGraphTags => (MetaTags, LowPriority, "Check if Open Graph tags exist"),
            RuleId::TwitterCard => (MetaTags, LowPriority, "Check if a Twitter card tag exists"),
            RuleId::FaviconDeclared => (MetaTags, LowPriority, "Check if a favicon is declared"),
            RuleId::H1Unique => (Headings, HighPriority, "Check if <h1> tag is unique on the page"),
            RuleId::H2TagsExist => (Headings, AveragePriority, "Check if <h2> tags exist"),
            RuleId::HeadingStructure => (Headings, AveragePriority, "Check heading levels for skipped jumps"),
            RuleId::ContentLength => (Content, AveragePriority, "Check if the page has enough textual content"),
            RuleId::KeywordInTitle => (Content, HighPriority, "Check if the target keyword appears in the title"),
            RuleId::KeywordInH1 => (Content, AveragePriority, "Check if the target keyword appears in the H1"),
            RuleId::KeywordDensity => (Content, AveragePriority, "Check target keyword density (ideal 1-3%)"),
            RuleId::ContentFreshness => (Content, LowPriority, "Check when the content was last updated"),
            RuleId::DuplicateContent => (Content, LowPriority, "Check for duplicate content (needs a corpus)"),
            RuleId::AltAttributes => (Media, HighPriority, "Check if all images have alt attributes"),
            RuleId::ImageDimensions => (Media, LowPriority, "Check if image dimensions are specified"),
            RuleId::ImageLazyLoading => (Media, LowPriority, "Check if below-the-fold images lazy-load"),
            RuleId::ImageFileSize => (Media, AveragePriority, "Check if image file sizes are optimized"),
            RuleId::InternalLinksExist => (Links, AveragePriority, "Check if internal links exist on the page"),
            RuleId::ExternalLinksExist => (Links, LowPriority, "Check if external links exist on the page"),
            RuleId::NofollowOnExternalLinks => (Links, LowPriority, "Check if external links use rel=nofollow"),
            RuleId::BrokenInternalLinks => (Links, HighPriority, "Check for broken internal links"),
            RuleId::BrokenExternalLinks => (Links, AveragePriority, "Check for broken external links"),
            RuleId::RobotsTxtExists => (Site, AveragePriority, "Check if robots.txt file exists"),
            RuleId::XmlSitemapExists => (Site, AveragePriority, "Check if XML sitemap exists"),
            RuleId::FaviconReachable => (Site, LowPriority, "Check if the favicon resolves"),
            RuleId::RedirectsMinimized => (Site, AveragePriority, "Check if redirects are minimized"),
            RuleId::HttpsRedirect => (Site, HighPriority, "Check if HTTP redirects to HTTPS"),
            RuleId::PageDepth => (Site, AveragePriority, "Measure link depth of the site structure"),
            RuleId::SslCertificate => (Security, HighPriority, "Check SSL certificate validity and expiry"),
            RuleId::SecurityHeaders => (Security, HighPriority, "Check HTTP security response headers"),
            RuleId::MixedContent => (Security, HighPriority, "Check for http:// resources on an https page"),
            RuleId::PageLoadTime => (Performance, HighPriority, "Check if page load time is under 3 seconds"),
            RuleId::PageSize => (Performance, AveragePriority, "Check the size of the HTML document"),
            RuleId::GzipCompression => (Performance, AveragePriority, "Check if response compression is enabled"),
            RuleId::BrowserCaching => (Performance, AveragePriority, "Check if browser caching is enabled"),
            RuleId::InlineStyles => (Performance, LowPriority, "Check for excessive inline style attributes"),
            RuleId::ResponsiveDesign => (Mobile, HighPriority, "Check if the page is mobile-friendly"),
            RuleId::StructuredData => (Schema, AveragePriority, "Check if structured data markup exists"),
        }
    }

    pub fn section(&self) -> Section {
        self.spec().0
    }

    pub fn priority(&self) -> Priority {
        self.spec().1
    }

    pub fn description(&self) -> &'static str {
        self.spec().2
    }

    /// Weight in the final average. Uniform today; the registry carries it
    /// so tuning stays a data change rather than an aggregator change.
    pub fn weight(&self) -> f64 {
        1.0
    }

    /// Reverse lookup from a result-tree key. Ad hoc sub-keys (nested
    /// heading-structure entries) have no RuleId and return None.
    pub fn from_name(name: &str) -> Option<RuleId> {
        RuleId::ALL.iter().copied().find(|r| r.as_str() == name)
    }
}

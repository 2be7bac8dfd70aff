//! seoscan analyzes a single web page and produces a categorized SEO health
//! report: fetch, parse once, fan the parsed page out to independent checks,
//! aggregate their ratings into one score.

pub mod checks;
pub mod config;
pub mod document;
pub mod domain;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod service;

#[cfg(test)]
mod test_utils;

pub use config::EngineConfig;
pub use document::{fetch_page, ParsedPage};
pub use domain::models::{Outcome, Report, ResultTree, ScanRecord, Status};
pub use domain::rules::{RuleId, Section};
pub use engine::SeoEngine;
pub use error::{AppError, Result};
pub use service::scan::{ScanJob, ScanQueue, ScanService, ScanStore};

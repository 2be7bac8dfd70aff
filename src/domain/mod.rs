pub mod models;
pub mod rules;

pub use models::*;
pub use rules::{RuleId, Section};

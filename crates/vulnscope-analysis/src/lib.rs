//! Vulnerability analysis for manifest dependencies
//!
//! This crate connects the report cache to an external analysis
//! provider: it decides when a file needs analyzing, normalizes
//! dependency identities and merges findings into the cache.

pub mod provider;
pub mod providers;
pub mod service;


pub use provider::AnalysisProvider;
pub use service::ReportService;

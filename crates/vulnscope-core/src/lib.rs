//! Vulnscope Core — dependency identity, analysis results and the two-level report cache

pub mod model;
pub mod clock;
pub mod cache;
pub mod config;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    AnalysisReport, AnalysisResult, Dependency, DependencyReport, Issue, NO_FINDINGS, PackageUrl,
    PurlError, Severity, TransitiveReport,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cache::{CacheStats, FileCache, ReportCache};
pub use config::{CacheConfig, ConfigError};

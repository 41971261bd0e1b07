//! Test utilities for Vulnscope

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::ManualClock;
use crate::cache::FileCache;
use crate::model::{Dependency, DependencyReport, Issue, Severity};

pub const REPORT_TTL: Duration = Duration::from_secs(60);
pub const FILE_TTL: Duration = Duration::from_secs(50 * 60);

/// Parse a package URL into a dependency, panicking on bad input
pub fn dep(purl: &str) -> Dependency {
    Dependency::parse(purl).unwrap()
}

/// A finding carrying one issue of the given severity, optionally referencing `purl`
pub fn finding(purl: Option<&str>, severity: Severity) -> DependencyReport {
    let label = purl.unwrap_or("unreferenced");
    DependencyReport {
        reference: purl.map(str::to_string),
        issues: vec![Issue {
            id: format!("CVE-{}", label.len()),
            title: Some(format!("Issue in {}", label)),
            severity,
            cvss_score: None,
        }],
        transitive: vec![],
        recommendation: None,
    }
}

/// A file cache with the default limits, driven by a manual clock
pub fn manual_file_cache(capacity: usize) -> (Arc<ManualClock>, FileCache) {
    let clock = Arc::new(ManualClock::new());
    let cache = FileCache::new(
        NonZeroUsize::new(capacity).unwrap(),
        FILE_TTL,
        REPORT_TTL,
        clock.clone(),
    );
    (clock, cache)
}

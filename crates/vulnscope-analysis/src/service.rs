//! Report service: decides what to fetch and merges findings into the cache

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use vulnscope_core::{AnalysisResult, Dependency, DependencyReport, FileCache, NO_FINDINGS};

use crate::provider::AnalysisProvider;

/// Front door for callers that need vulnerability results per manifest file.
///
/// Concurrent calls for the same file are not coalesced; both may reach the
/// provider before either has populated the cache.
pub struct ReportService {
    cache: Arc<FileCache>,
    provider: Arc<dyn AnalysisProvider>,
}

impl ReportService {
    pub fn new(cache: Arc<FileCache>, provider: Arc<dyn AnalysisProvider>) -> Self {
        Self { cache, provider }
    }

    pub fn cache(&self) -> &Arc<FileCache> {
        &self.cache
    }

    pub fn provider(&self) -> &dyn AnalysisProvider {
        self.provider.as_ref()
    }

    /// Cached results for `dependencies`. Never calls the provider; missing
    /// or expired entries are simply absent.
    pub fn get_reports(
        &self,
        file_path: &str,
        dependencies: &[Dependency],
    ) -> HashMap<Dependency, AnalysisResult> {
        self.cache
            .get(file_path)
            .map(|reports| reports.get_present(dependencies))
            .unwrap_or_default()
    }

    /// Forget everything cached for `file_path`.
    pub fn delete_reports(&self, file_path: &str) {
        self.cache.invalidate(file_path);
    }

    /// Fetch and cache results for `dependencies` unless all are cached.
    ///
    /// Returns `true` only when a provider response was merged into the
    /// cache. `false` means either nothing needed fetching or the provider
    /// gave nothing usable; in both cases the cache is untouched.
    pub async fn perform_analysis(
        &self,
        package_manager: &str,
        file_name: &str,
        file_path: &str,
        dependencies: &[Dependency],
    ) -> bool {
        let reports = self.cache.get_or_create(file_path);
        if reports.contains_all(dependencies) {
            tracing::debug!(
                "All {} dependencies of {} are cached",
                dependencies.len(),
                file_path
            );
            return false;
        }

        tracing::debug!(
            "Requesting {} analysis of {} from {}",
            package_manager,
            file_path,
            self.provider.name()
        );
        let report = match self
            .provider
            .analyze(package_manager, file_name, file_path)
            .await
        {
            Ok(Some(report)) => report,
            Ok(None) => {
                tracing::debug!("No analysis report for {}", file_path);
                return false;
            }
            Err(e) => {
                tracing::warn!("Analysis of {} failed: {:#}", file_path, e);
                return false;
            }
        };
        let Some(findings) = report.dependencies else {
            tracing::debug!("Analysis report for {} has no dependencies", file_path);
            return false;
        };

        let findings = index_findings(findings);
        let merged: HashMap<Dependency, AnalysisResult> = dependencies
            .iter()
            .map(|dep| {
                let result = findings
                    .get(&dep.version_insensitive())
                    .cloned()
                    .unwrap_or(NO_FINDINGS);
                (dep.clone(), result)
            })
            .collect();

        if !dependencies.iter().all(|dep| merged.contains_key(dep)) {
            tracing::warn!("Incomplete analysis merge for {}, not caching", file_path);
            return false;
        }

        tracing::debug!(
            "Caching {} results for {} ({} with findings)",
            merged.len(),
            file_path,
            merged.values().filter(|r| !r.is_no_findings()).count()
        );
        reports.put_all(merged);
        true
    }
}

/// Key findings by version-insensitive identity. Findings without a usable
/// reference are dropped; on collisions the first in response order wins.
fn index_findings(findings: Vec<DependencyReport>) -> HashMap<Dependency, AnalysisResult> {
    let mut indexed = HashMap::with_capacity(findings.len());
    let mut discarded = 0usize;

    for finding in findings {
        let Some(key) = finding.ref_dependency() else {
            discarded += 1;
            continue;
        };
        if let Entry::Vacant(slot) = indexed.entry(key) {
            slot.insert(AnalysisResult::from(finding));
        }
    }

    if discarded > 0 {
        tracing::debug!("Discarded {} findings without a reference", discarded);
    }
    indexed
}

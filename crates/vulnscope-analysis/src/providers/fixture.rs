//! Provider serving pre-recorded analysis reports

use super::super::provider::AnalysisProvider;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use vulnscope_core::AnalysisReport;

/// Serves reports from a JSON document mapping file paths to reports.
///
/// ```json
/// { "/repo/package.json": { "dependencies": [ { "ref": "pkg:npm/a@1.0.0", "issues": [] } ] } }
/// ```
///
/// A path mapped to `null`, or not listed at all, yields no report.
pub struct FixtureProvider {
    reports: HashMap<String, Option<AnalysisReport>>,
}

impl FixtureProvider {
    pub fn new(reports: HashMap<String, Option<AnalysisReport>>) -> Self {
        Self { reports }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let reports = serde_json::from_str(json).context("Invalid fixture report document")?;
        Ok(Self::new(reports))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read fixture reports from {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for FixtureProvider {
    async fn analyze(
        &self,
        package_manager: &str,
        file_name: &str,
        file_path: &str,
    ) -> Result<Option<AnalysisReport>> {
        tracing::debug!(
            "Fixture analysis of {} ({}, {})",
            file_path,
            file_name,
            package_manager
        );
        Ok(self.reports.get(file_path).cloned().flatten())
    }

    fn name(&self) -> &str {
        "Fixture"
    }
}

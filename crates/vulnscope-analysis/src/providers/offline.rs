//! Provider used when no analysis backend is configured

use super::super::provider::AnalysisProvider;
use anyhow::Result;
use vulnscope_core::AnalysisReport;

pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for OfflineProvider {
    async fn analyze(
        &self,
        _package_manager: &str,
        _file_name: &str,
        file_path: &str,
    ) -> Result<Option<AnalysisReport>> {
        tracing::debug!("Offline provider has no report for {}", file_path);
        Ok(None)
    }

    fn name(&self) -> &str {
        "Offline"
    }
}

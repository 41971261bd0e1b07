//! Seam to the external vulnerability analysis backend

use anyhow::Result;
use vulnscope_core::AnalysisReport;

/// Backend that analyzes a whole manifest file.
///
/// `Ok(None)` means the backend answered without a report. `Err` means it
/// could not be reached. Timeouts and cancellation are up to the
/// implementation.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Analyze every dependency declared in the file at `file_path`
    async fn analyze(
        &self,
        package_manager: &str,
        file_name: &str,
        file_path: &str,
    ) -> Result<Option<AnalysisReport>>;

    /// Get provider name
    fn name(&self) -> &str;
}

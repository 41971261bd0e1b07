//! Analysis provider implementations

pub mod fixture;
pub mod offline;

use super::provider::AnalysisProvider;
use anyhow::Result;
use std::path::Path;

/// Factory function to create analysis providers
pub fn create_provider(
    provider_name: &str,
    fixture_path: Option<&Path>,
) -> Result<Box<dyn AnalysisProvider>> {
    match provider_name {
        "fixture" => match fixture_path {
            Some(path) => Ok(Box::new(fixture::FixtureProvider::from_file(path)?)),
            None => anyhow::bail!("The fixture provider needs a report file"),
        },
        "offline" => Ok(Box::new(offline::OfflineProvider::new())),
        _ => anyhow::bail!("Unknown analysis provider: {}", provider_name),
    }
}

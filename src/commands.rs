//! CLI command implementations

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::{Value, json};
use vulnscope_analysis::ReportService;
use vulnscope_analysis::providers::create_provider;
use vulnscope_core::{AnalysisResult, CacheConfig, Dependency, FileCache, SystemClock};

pub fn load_config(path: Option<&Path>) -> anyhow::Result<CacheConfig> {
    match path {
        Some(path) => Ok(CacheConfig::load(path)?),
        None => Ok(CacheConfig::default()),
    }
}

pub async fn analyze(
    config: &CacheConfig,
    provider_name: &str,
    fixture: Option<&Path>,
    package_manager: &str,
    file: &str,
    dependencies: &[String],
) -> anyhow::Result<()> {
    let dependencies = dependencies
        .iter()
        .map(|purl| Dependency::parse(purl).with_context(|| format!("Invalid dependency {purl}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cache = FileCache::from_config(config, Arc::new(SystemClock))?;
    let provider = create_provider(provider_name, fixture)?;
    let service = ReportService::new(Arc::new(cache), Arc::from(provider));

    let file_name = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);

    tracing::info!(
        "Analyzing {} dependencies of {} with {}",
        dependencies.len(),
        file,
        service.provider().name()
    );
    let fetched = service
        .perform_analysis(package_manager, file_name, file, &dependencies)
        .await;
    if !fetched {
        tracing::warn!("No analysis results available for {}", file);
    }

    let reports = service.get_reports(file, &dependencies);
    let summary = summarize(file, fetched, &dependencies, &reports);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

pub fn show_config(config: &CacheConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Render per-dependency results in declaration order
fn summarize(
    file: &str,
    fetched: bool,
    dependencies: &[Dependency],
    reports: &HashMap<Dependency, AnalysisResult>,
) -> Value {
    let results: Vec<Value> = dependencies
        .iter()
        .map(|dep| match reports.get(dep) {
            None => json!({ "dependency": dep.to_string(), "status": "unknown" }),
            Some(AnalysisResult::NoFindings) => {
                json!({ "dependency": dep.to_string(), "status": "clean" })
            }
            Some(AnalysisResult::Finding(report)) => {
                let severity = report.highest_severity();
                let status = if severity.is_some() { "vulnerable" } else { "clean" };
                let issues: Vec<&str> = report.issues.iter().map(|i| i.id.as_str()).collect();
                let transitive_issues: Vec<&str> = report
                    .transitive
                    .iter()
                    .flat_map(|t| t.issues.iter())
                    .map(|i| i.id.as_str())
                    .collect();
                json!({
                    "dependency": dep.to_string(),
                    "status": status,
                    "severity": severity,
                    "issues": issues,
                    "transitive_issues": transitive_issues,
                    "recommendation": report.recommendation
                })
            }
        })
        .collect();

    json!({
        "file": file,
        "fetched": fetched,
        "dependencies": results
    })
}

//! Report loader.
//!
//! The advisory report is produced outside Raf Way and dropped into the data
//! directory as `report.json`. Without it the built-in sample is served.

use std::path::Path;

use rafway_types::report::ReportData;

/// Load `{data_dir}/report.json`, falling back to [`ReportData::sample()`].
pub async fn load_report(data_dir: &Path) -> ReportData {
    let path = data_dir.join("report.json");

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No report.json at {}, using sample report", path.display());
            return ReportData::sample();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using sample report", path.display());
            return ReportData::sample();
        }
    };

    match serde_json::from_str::<ReportData>(&content) {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using sample report", path.display());
            ReportData::sample()
        }
    }
}

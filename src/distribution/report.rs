use tracing::info;

use crate::error::StorageError;
use crate::storage::Store;

use super::models::DistributionReport;

/// Writes each distribution report to its own, never overwritten, document
#[derive(Debug, Clone)]
pub struct ReportWriter<S: Store> {
    store: S,
    prefix: String,
}

impl<S: Store> ReportWriter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: "distribution".to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Document name for `report`, unique per report id
    pub fn artifact_name(&self, report: &DistributionReport) -> String {
        format!(
            "{}_{}_{}",
            self.prefix,
            report.timestamp.timestamp_millis(),
            &report.id.simple().to_string()[..8]
        )
    }

    /// Store `report` and return the artifact name
    pub fn write(&self, report: &DistributionReport) -> Result<String, StorageError> {
        let name = self.artifact_name(report);
        self.store.save_new(&name, &serde_json::to_value(report)?)?;

        info!(
            "Distribution report saved as {} ({} ok, {} failed)",
            name, report.success_count, report.failed_count
        );
        Ok(name)
    }
}

pub mod config;
pub mod engine;
pub mod models;
pub mod report;

pub use config::{DistributionConfig, TransferMode};
pub use engine::{AUTO_DISTRIBUTION_PERCENT, DistributionEngine, resolve_amount};
pub use models::{DistributionReport, TransferOutcome, TransferStatus};
pub use report::ReportWriter;

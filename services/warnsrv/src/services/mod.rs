//! Application services: ingestion, warning generation and warning queries

pub mod generator;
pub mod ingest;
pub mod warnings;

pub use generator::{GenerationOutcome, WarningGenerator};
pub use ingest::{ReportOutcome, SignalIngest};
pub use warnings::WarningQueryService;

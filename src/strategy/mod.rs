//! Import strategy module for day-file processing
//!
//! This module defines the Strategy pattern for complete day-file import
//! pipelines, encompassing both CSV parsing and settlement against the
//! billing engine. This allows different import implementations
//! (synchronous, asynchronous batch) to be selected at runtime.

use crate::core::BillingEngine;
use crate::types::BillingError;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncImportStrategy, BatchConfig};
pub use sync::SyncImportStrategy;

/// Counts reported by an import run
///
/// `applied` counts events that settled and were recorded; `skipped`
/// counts events rejected by the engine (unknown student, non-positive
/// amount, missing destination). Rows that never parsed into an event
/// are logged to stderr by the readers and appear in neither count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Events settled and recorded
    pub applied: usize,
    /// Events rejected by the engine
    pub skipped: usize,
}

/// Import strategy trait for complete day-file pipelines
///
/// This trait defines the interface for different day-file import
/// implementations. Each strategy must be able to read payment events
/// from a day-file CSV and settle them against the billing engine.
pub trait ImportStrategy: Send + Sync {
    /// Apply a day-file's events to the engine
    ///
    /// Reads payment events from the day-file and settles them, leaving
    /// the engine's accounts and payment logs updated.
    ///
    /// # Arguments
    ///
    /// * `engine` - Billing engine holding the loaded school
    /// * `day_file` - Path to the day-file CSV
    ///
    /// # Returns
    ///
    /// * `Ok(ImportSummary)` if the run completed (possibly with
    ///   recoverable per-event errors)
    /// * `Err(BillingError)` if a fatal error occurred (file not found,
    ///   no active term, I/O error)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The day-file cannot be opened
    /// - A fatal I/O error occurs during reading
    /// - No term is active, so nothing could be recorded
    ///
    /// Individual event failures are logged to stderr and counted as
    /// skipped; they never abort the run.
    fn import(
        &self,
        engine: &mut BillingEngine,
        day_file: &Path,
    ) -> Result<ImportSummary, BillingError>;
}

/// Create an import strategy based on the specified strategy type
///
/// This factory function implements the Strategy pattern by selecting and
/// instantiating the appropriate import implementation at runtime based
/// on the provided strategy type and optional configuration.
///
/// # Arguments
///
/// * `strategy_type` - The type of import strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ImportStrategy trait
pub fn create_strategy(
    strategy_type: crate::cli::StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ImportStrategy> {
    match strategy_type {
        crate::cli::StrategyType::Sync => Box::new(SyncImportStrategy),
        crate::cli::StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncImportStrategy::new(config))
        }
    }
}

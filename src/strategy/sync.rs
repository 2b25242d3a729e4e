//! Synchronous import strategy
//!
//! This module provides a synchronous, single-threaded implementation of
//! the ImportStrategy trait. It orchestrates day-file import by
//! coordinating between the SyncReader (for CSV input) and the
//! BillingEngine (for settlement and audit records).
//!
//! # Design
//!
//! The SyncImportStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Settlement and record keeping to `BillingEngine::apply_event`
//!
//! # Memory Efficiency
//!
//! This strategy maintains constant memory usage:
//! - Processes day-file rows one at a time (streaming via iterator)
//! - Does not load the entire file into memory
//! - Memory usage is O(accounts + payment records), not O(events)

use crate::core::BillingEngine;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ImportStrategy, ImportSummary};
use crate::types::BillingError;
use std::path::Path;

/// Synchronous import strategy
///
/// Implements the ImportStrategy trait using single-threaded, sequential
/// settlement. Each event is applied (and its audit record appended) in
/// day-file order before the next row is read.
///
/// # Examples
///
/// ```no_run
/// use shule_ledger::core::BillingEngine;
/// use shule_ledger::strategy::{ImportStrategy, SyncImportStrategy};
/// use std::path::Path;
///
/// let mut engine = BillingEngine::new();
/// let strategy = SyncImportStrategy;
///
/// let summary = strategy
///     .import(&mut engine, Path::new("payments_day.csv"))
///     .expect("Import failed");
/// println!("Applied {} events", summary.applied);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncImportStrategy;

impl ImportStrategy for SyncImportStrategy {
    /// Apply a day-file's events to the engine, one at a time
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Creates a SyncReader to stream events from the day-file
    /// 2. Applies each event through [`BillingEngine::apply_event`]
    /// 3. Logs recoverable failures to stderr and counts them as skipped
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found) are returned immediately. Individual
    /// event errors are logged to stderr and the run continues.
    fn import(
        &self,
        engine: &mut BillingEngine,
        day_file: &Path,
    ) -> Result<ImportSummary, BillingError> {
        // Every record is stamped with the active term; without one the
        // whole run is pointless, so fail before reading anything.
        engine.active_term_id()?;

        let reader = SyncReader::new(day_file)?;
        let mut summary = ImportSummary::default();

        for result in reader {
            match result {
                Ok(event) => match engine.apply_event(&event) {
                    Ok(()) => summary.applied += 1,
                    Err(e) => {
                        eprintln!("Payment settlement error: {}", e);
                        summary.skipped += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Day-file parsing error: {}", e);
                }
            }
        }

        Ok(summary)
    }
}

//! Asynchronous batch import strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of
//! the ImportStrategy trait. It settles day-file events in batches using
//! thread-based parallelism with student-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncImportStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch day-file reading)
//!     ├── BatchProcessor (student partitioning + tasks)
//!     └── AsyncBillingEngine (thread-safe settlement)
//!         └── AsyncRoster (DashMap account state)
//! ```
//!
//! # Thread-Based Parallelism
//!
//! This strategy uses true thread-based parallelism:
//! - Processes batches sequentially to maintain per-student ordering across the file
//! - Within each batch, partitions by student id for parallel settlement
//! - Spawns worker tasks via a tokio multi-threaded runtime
//! - Uses Arc + DashMap for thread-safe shared account state
//!
//! Audit records are not written concurrently: settlements come back as
//! `AppliedPayment` values and are committed to the engine's logs in one
//! pass at the end, so record ids stay sequential.

use crate::core::r#async::{AsyncBillingEngine, AsyncRoster, BatchProcessor};
use crate::core::BillingEngine;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{ImportStrategy, ImportSummary};
use crate::types::{AppliedPayment, BillingError};
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how day-file events are batched and the number of worker
/// threads for parallel settlement within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of events per batch
    pub batch_size: usize,
    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            eprintln!(
                "Warning: Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            eprintln!(
                "Warning: Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch import strategy
///
/// Implements the ImportStrategy trait using multi-threaded, asynchronous
/// batch settlement. Events are read in batches and processed
/// sequentially (batch-by-batch) to maintain ordering guarantees. Within
/// each batch, events are partitioned by student id and settled in
/// parallel tasks.
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of events per batch (default: 1000)
/// - `max_concurrent_batches`: Number of worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncImportStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncImportStrategy {
    /// Create a new AsyncImportStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ImportStrategy for AsyncImportStrategy {
    /// Apply a day-file's events to the engine in parallel batches
    ///
    /// This method implements the complete asynchronous pipeline:
    /// 1. Seeds an AsyncRoster from the engine's current accounts
    /// 2. Creates a BatchProcessor over a shared AsyncBillingEngine
    /// 3. Creates a tokio multi-threaded runtime
    /// 4. Reads events in batches from the day-file using AsyncReader
    /// 5. Settles each batch before reading the next, so one student's
    ///    events never interleave across batches
    /// 6. Commits the settled accounts and audit records back to the
    ///    engine in one pass
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, runtime errors, no active term) are
    /// returned immediately. Individual event errors are logged to stderr
    /// and counted as skipped.
    fn import(
        &self,
        engine: &mut BillingEngine,
        day_file: &Path,
    ) -> Result<ImportSummary, BillingError> {
        // Every record is stamped with the active term; without one the
        // commit at the end would fail anyway, so fail before reading.
        engine.active_term_id()?;

        // Settlement is staged against a snapshot of the roster; nothing
        // is committed to the engine until the whole file has been read.
        let roster = Arc::new(AsyncRoster::from_accounts(
            engine.accounts().into_iter().cloned().collect(),
        ));
        let async_engine = Arc::new(AsyncBillingEngine::new(Arc::clone(&roster)));
        let processor = BatchProcessor::new(async_engine);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| BillingError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let (applied, skipped): (Vec<AppliedPayment>, usize) = runtime.block_on(async {
            let file = tokio::fs::File::open(day_file).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BillingError::FileNotFound {
                        path: day_file.display().to_string(),
                    }
                } else {
                    BillingError::IoError {
                        message: format!("Failed to open file '{}': {}", day_file.display(), e),
                    }
                }
            })?;

            // Wrap the tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = Vec::new();
            let mut skipped = 0;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Settle this batch fully before reading the next one, so
                // a student whose events span batches keeps day-file order.
                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(settlement) => applied.push(settlement),
                        Err(e) => {
                            eprintln!("Payment settlement error: {}", e);
                            skipped += 1;
                        }
                    }
                }
            }

            Ok::<_, BillingError>((applied, skipped))
        })?;

        let summary = ImportSummary {
            applied: applied.len(),
            skipped,
        };

        engine.commit_import(roster.all_accounts(), applied)?;

        Ok(summary)
    }
}

//! Batch processing with student-based partitioning for day-file import
//!
//! This module provides the `BatchProcessor` struct, which manages concurrent
//! batch processing with student-based partitioning to enable parallel
//! settlement while maintaining per-student event ordering.
//!
//! # Design
//!
//! The `BatchProcessor` partitions batches by student ID, allowing events for
//! different students to be settled concurrently while keeping each
//! individual student's events in day-file order. Order matters within a
//! student: with arrears-first settlement, the running balance after each
//! payment depends on the payments before it.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncBillingEngine>  (shared settlement engine)
//! ```
//!
//! # Thread Safety
//!
//! The processor is cloneable and can be safely shared across async tasks.
//! All internal state is behind Arc, and the underlying engine uses
//! thread-safe components.

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncBillingEngine;
use crate::types::{AppliedPayment, BillingError, PaymentEvent, StudentId};

/// Result of settling a single day-file event
///
/// Contains the original event and the outcome of applying it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The payment event that was applied
    pub event: PaymentEvent,

    /// The settlement outcome (an applied payment, or the error)
    pub result: Result<AppliedPayment, BillingError>,
}

/// Batch processor with student-based partitioning
///
/// `BatchProcessor` manages concurrent batch processing by partitioning
/// events by student ID. This enables parallel settlement of events for
/// different students while maintaining sequential ordering for each
/// student.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Thread-safe settlement engine
    ///
    /// Wrapped in Arc to enable sharing across async tasks.
    engine: Arc<AsyncBillingEngine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Arc-wrapped AsyncBillingEngine for event settlement
    ///
    /// # Returns
    ///
    /// A new `BatchProcessor` that can be cloned and shared across async
    /// tasks.
    pub fn new(engine: Arc<AsyncBillingEngine>) -> Self {
        Self { engine }
    }

    /// Partition a batch of events by student ID
    ///
    /// This method partitions a batch into sub-batches where each sub-batch
    /// contains only events for a single student. This enables parallel
    /// settlement for different students while maintaining day-file ordering
    /// for each student.
    ///
    /// # Arguments
    ///
    /// * `batch` - A vector of payment events to partition
    ///
    /// # Returns
    ///
    /// A HashMap where:
    /// - Keys are student IDs
    /// - Values are vectors of events for that student (in original order)
    ///
    /// # Guarantees
    ///
    /// - Each event appears in exactly one sub-batch
    /// - No events are lost or duplicated
    /// - Events for each student maintain their original order
    /// - Sub-batches contain only events for a single student
    ///
    pub fn partition_by_student(
        &self,
        batch: Vec<PaymentEvent>,
    ) -> HashMap<StudentId, Vec<PaymentEvent>> {
        let mut student_batches: HashMap<StudentId, Vec<PaymentEvent>> = HashMap::new();

        for event in batch {
            student_batches
                .entry(event.student())
                .or_default()
                .push(event);
        }

        student_batches
    }

    /// Settle all events for a single student sequentially
    ///
    /// This method applies all events for one student in the order they
    /// appear in the input vector. This keeps per-student settlement order
    /// intact even when multiple students are being processed concurrently.
    ///
    /// # Arguments
    ///
    /// * `events` - A vector of events for one student (in order)
    ///
    /// # Returns
    ///
    /// A vector of `ProcessingResult` containing the outcome of each event.
    /// Results are in the same order as the input events.
    ///
    /// # Guarantees
    ///
    /// - Events are applied in the order they appear in the input vector
    /// - All events are processed, even if some fail
    /// - Errors are captured in the result and don't stop processing
    /// - Results maintain the same order as input events
    pub async fn process_student_events(
        &self,
        events: Vec<PaymentEvent>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(events.len());

        for event in events {
            let result = self.engine.apply(event.clone());
            results.push(ProcessingResult { event, result });
        }

        results
    }

    /// Settle a batch of events with student-based partitioning
    ///
    /// This method processes a batch of events by:
    /// 1. Partitioning the batch by student ID
    /// 2. Spawning tokio tasks to settle each student's events concurrently
    /// 3. Waiting for all tasks to complete
    /// 4. Collecting and returning all results
    ///
    /// # Arguments
    ///
    /// * `batch` - A vector of payment events to settle
    ///
    /// # Returns
    ///
    /// A vector of `ProcessingResult` containing the outcome of each event.
    /// Results may be in a different order than the input due to concurrent
    /// processing; each student's results stay contiguous and in order.
    ///
    /// # Guarantees
    ///
    /// - Events for different students are settled concurrently
    /// - Events for the same student are settled sequentially in order
    /// - All events are processed, even if some fail
    /// - Errors are captured in results and don't stop processing
    pub async fn process_batch(&self, batch: Vec<PaymentEvent>) -> Vec<ProcessingResult> {
        // Partition batch by student ID
        let student_batches = self.partition_by_student(batch);

        // Spawn tokio tasks for each student's events
        let mut tasks = Vec::new();
        for (_student, events) in student_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move { processor.process_student_events(events).await });
            tasks.push(task);
        }

        // Wait for all tasks to complete and collect results
        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(student_results) => results.extend(student_results),
                Err(e) => {
                    eprintln!("Task panicked: {:?}", e);
                }
            }
        }

        results
    }
}

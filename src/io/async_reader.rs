//! Asynchronous day-file reader with batch interface
//!
//! Provides a streaming interface over payment events from a day-file
//! CSV. Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async runtime and concurrency primitives
//! - Batch reading for efficient processing
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of PaymentEvents
//!                  ↓
//!           csv_format module
//!           (EventRecord, convert_event_record)
//! ```

use crate::io::csv_format::{convert_event_record, EventRecord};
use crate::types::PaymentEvent;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous day-file reader
///
/// Provides batch reading interface over payment events.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing day-file CSV data
    ///
    /// # Returns
    ///
    /// A new AsyncReader instance
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of payment events
    ///
    /// This method reads up to `batch_size` rows from the day-file,
    /// converting them to PaymentEvents. Invalid rows are logged to
    /// stderr and skipped.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of events to read
    ///
    /// # Returns
    ///
    /// A vector of successfully converted payment events.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<PaymentEvent> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<EventRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match convert_event_record(record) {
                    Ok(event) => batch.push(event),
                    Err(e) => eprintln!("Event conversion error: {}", e),
                },
                Some(Err(e)) => eprintln!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}

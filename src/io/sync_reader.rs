//! Synchronous day-file reader with iterator interface
//!
//! Provides a streaming iterator over payment events from a day-file CSV.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize rows
//! sequentially, delegating parsing and conversion to the csv_format
//! module. It maintains streaming behavior by processing rows one at a
//! time without loading the entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<PaymentEvent, BillingError>` for each row:
//!
//! ```no_run
//! use shule_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("payments_day.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(event) => println!("Applying payment: {:?}", event),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Line numbers are included in errors for debugging
//!
//! # Memory Efficiency
//!
//! The reader maintains streaming behavior:
//! - Reads rows one at a time
//! - Does not load the entire file into memory
//! - Memory usage is O(1) per event, not O(file_size)

use crate::io::csv_format::{convert_event_record, EventRecord};
use crate::types::{BillingError, PaymentEvent};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous day-file reader
///
/// Provides an iterator interface over payment events.
/// Maintains streaming behavior with constant memory usage.
///
/// # Examples
///
/// ```no_run
/// use shule_ledger::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("payments_day.csv")).unwrap();
/// let events: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} events", events.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// Opens the day-file and prepares it for streaming iteration.
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (bus rows omit method/reference)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the day-file
    ///
    /// # Errors
    ///
    /// * `FileNotFound` if the path does not exist
    /// * `IoError` for any other open failure
    pub fn new(path: &Path) -> Result<Self, BillingError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                BillingError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                BillingError::IoError {
                    message: format!("Failed to open file '{}': {}", path.display(), e),
                }
            }
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<PaymentEvent, BillingError>;

    /// Get the next payment event from the day-file
    ///
    /// This method:
    /// 1. Reads the next row and deserializes it to an EventRecord
    /// 2. Converts the EventRecord to a PaymentEvent
    /// 3. Stamps any error with the line number
    ///
    /// # Returns
    ///
    /// * `Some(Ok(PaymentEvent))` - Successfully parsed event
    /// * `Some(Err(BillingError))` - Parse or conversion error with line
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<EventRecord>();

        match deserializer.next()? {
            Ok(record) => {
                self.line_num += 1;
                // Line numbers are one-based and the header is line 1.
                let line = self.line_num + 1;
                Some(convert_event_record(record).map_err(|e| BillingError::ParseError {
                    line: Some(line),
                    message: e.to_string(),
                }))
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(BillingError::ParseError {
                    line: Some(self.line_num + 1),
                    message: e.to_string(),
                }))
            }
        }
    }
}

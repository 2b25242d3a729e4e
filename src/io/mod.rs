//! I/O module
//!
//! Handles the CSV school directory and day-file parsing.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row types, conversions, statement output)
//! - `school_dir` - Loading and storing the school directory of CSV files
//! - `sync_reader` - Synchronous day-file reader with iterator interface
//! - `async_reader` - Asynchronous day-file reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod school_dir;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_event_record, write_statement_csv, EventRecord};
pub use school_dir::SchoolDir;
pub use sync_reader::SyncReader;

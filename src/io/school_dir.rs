//! School directory loading and storage
//!
//! A school's entire billing state lives in one directory of CSV files:
//! `students.csv`, `terms.csv`, `fees.csv`, `transport.csv`,
//! `destinations.csv`, `boarding.csv`, `payments.csv` and
//! `bus_payments.csv`. This module loads that directory into a
//! [`BillingEngine`] and writes the engine's state back out.
//!
//! Every file is optional: a file that does not exist loads as an empty
//! section, so a fresh directory bootstraps an empty school that
//! `new-term`, `set-fee` and `register` then populate. `boarding.csv` in
//! particular is frequently absent (no surcharge configured).
//!
//! Loading is fatal on the first malformed row: unlike day-file import,
//! the directory is this system's source of truth and a bad row means
//! the state on disk cannot be trusted. Callers store the directory only
//! after an operation fully succeeds, so a failed command never leaves a
//! half-written school behind.

use crate::core::BillingEngine;
use crate::io::csv_format::{
    self, BoardingRow, BusPaymentRow, DestinationRow, FeeRow, PaymentRow, StudentRow, TermRow,
    TransportFeeRow,
};
use crate::types::BillingError;
use csv::{ReaderBuilder, Trim, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const STUDENTS_FILE: &str = "students.csv";
const TERMS_FILE: &str = "terms.csv";
const FEES_FILE: &str = "fees.csv";
const TRANSPORT_FILE: &str = "transport.csv";
const DESTINATIONS_FILE: &str = "destinations.csv";
const BOARDING_FILE: &str = "boarding.csv";
const PAYMENTS_FILE: &str = "payments.csv";
const BUS_PAYMENTS_FILE: &str = "bus_payments.csv";

/// A school directory on disk
///
/// Thin handle around the directory path; [`SchoolDir::load`] and
/// [`SchoolDir::store`] do the work.
#[derive(Debug, Clone)]
pub struct SchoolDir {
    root: PathBuf,
}

impl SchoolDir {
    /// Create a handle for the given directory path
    ///
    /// The directory does not have to exist yet; `store` creates it.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        SchoolDir { root: root.into() }
    }

    /// The directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the whole directory into a billing engine
    ///
    /// Files are loaded in dependency order: terms, destinations and
    /// schedules first, then the roster, then the payment logs (so the
    /// logs' id counters end up ahead of every stored record). Missing
    /// files load as empty sections.
    ///
    /// # Errors
    ///
    /// * `ParseError` / `UnknownGrade` / `UnknownMethod` on the first
    ///   malformed row
    /// * `DuplicateStudent` / `DuplicateTerm` / `TermOverlap` /
    ///   `DuplicateFee` if the directory contradicts itself
    /// * `IoError` on any read failure other than a missing file
    pub fn load(&self) -> Result<BillingEngine, BillingError> {
        let mut engine = BillingEngine::new();

        for row in self.read_rows::<TermRow>(TERMS_FILE)? {
            engine.add_term(csv_format::term_from_row(row))?;
        }

        for row in self.read_rows::<DestinationRow>(DESTINATIONS_FILE)? {
            engine.add_destination(csv_format::destination_from_row(row));
        }

        for row in self.read_rows::<FeeRow>(FEES_FILE)? {
            let grade = row.grade.parse()?;
            engine.set_fee(row.term, grade, row.amount)?;
        }

        for row in self.read_rows::<TransportFeeRow>(TRANSPORT_FILE)? {
            engine.set_transport_fee(row.term, row.destination, row.amount)?;
        }

        if let Some(row) = self.read_rows::<BoardingRow>(BOARDING_FILE)?.into_iter().next() {
            engine.set_boarding_surcharge(row.surcharge)?;
        }

        for row in self.read_rows::<StudentRow>(STUDENTS_FILE)? {
            engine.insert_student(csv_format::student_from_row(row)?)?;
        }

        for row in self.read_rows::<PaymentRow>(PAYMENTS_FILE)? {
            engine.load_payment(csv_format::payment_from_row(row)?);
        }

        for row in self.read_rows::<BusPaymentRow>(BUS_PAYMENTS_FILE)? {
            engine.load_bus_payment(csv_format::bus_payment_from_row(row));
        }

        Ok(engine)
    }

    /// Write the engine's state back to the directory
    ///
    /// Rewrites every file from the engine's current state; `boarding.csv`
    /// is only written when a surcharge is configured. Rows are written in
    /// the engine's sorted view order, so repeated stores of the same
    /// state produce identical files.
    ///
    /// # Errors
    ///
    /// * `IoError` if the directory cannot be created or a file cannot
    ///   be written
    pub fn store(&self, engine: &BillingEngine) -> Result<(), BillingError> {
        fs::create_dir_all(&self.root)?;

        let students: Vec<StudentRow> = engine
            .accounts()
            .into_iter()
            .map(csv_format::student_to_row)
            .collect();
        self.write_rows(STUDENTS_FILE, &students)?;

        let terms: Vec<TermRow> = engine.terms().into_iter().map(csv_format::term_to_row).collect();
        self.write_rows(TERMS_FILE, &terms)?;

        let fees: Vec<FeeRow> = engine
            .fee_book()
            .all_fees()
            .into_iter()
            .map(|(term, grade, amount)| FeeRow {
                term,
                grade: grade.to_string(),
                amount,
            })
            .collect();
        self.write_rows(FEES_FILE, &fees)?;

        let transport: Vec<TransportFeeRow> = engine
            .fee_book()
            .all_transport_fees()
            .into_iter()
            .map(|(term, destination, amount)| TransportFeeRow {
                term,
                destination,
                amount,
            })
            .collect();
        self.write_rows(TRANSPORT_FILE, &transport)?;

        let destinations: Vec<DestinationRow> = engine
            .destinations()
            .into_iter()
            .map(|destination| DestinationRow {
                id: destination.id,
                name: destination.name.clone(),
            })
            .collect();
        self.write_rows(DESTINATIONS_FILE, &destinations)?;

        if let Some(surcharge) = engine.fee_book().boarding_surcharge() {
            self.write_rows(BOARDING_FILE, &[BoardingRow { surcharge }])?;
        }

        let payments: Vec<PaymentRow> = engine
            .payments()
            .get_all()
            .into_iter()
            .map(csv_format::payment_to_row)
            .collect();
        self.write_rows(PAYMENTS_FILE, &payments)?;

        let bus_payments: Vec<BusPaymentRow> = engine
            .bus_payments()
            .get_all()
            .into_iter()
            .map(csv_format::bus_payment_to_row)
            .collect();
        self.write_rows(BUS_PAYMENTS_FILE, &bus_payments)?;

        Ok(())
    }

    /// Read every row of one file, or nothing if the file is absent
    fn read_rows<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, BillingError> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(&path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Write one file from serializable rows (header always included)
    fn write_rows<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<(), BillingError> {
        let path = self.root.join(name);
        let mut writer = Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

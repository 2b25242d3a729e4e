//! CSV format handling for the school directory and day-file events
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for every school-directory file
//! - Conversion between rows and domain types
//! - Day-file event record conversion
//! - Statement output serialization
//!
//! All functions are pure (no I/O) for easy testing. Grades and payment
//! methods travel as their short string forms and are parsed at this
//! boundary, so unknown values fail loudly instead of slipping into the
//! roster.

use crate::types::{
    BillingError, BusDestination, BusPaymentRecord, DestinationId, Ledger, PaymentEvent,
    PaymentId, PaymentMethod, PaymentRecord, StudentAccount, StudentId, Term, TermId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// One row of `students.csv`
///
/// Carries the full billing state: identity fields plus both ledger
/// triples. The grade travels as its short string form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StudentRow {
    pub id: StudentId,
    pub name: String,
    pub admission_no: String,
    pub phone: String,
    pub grade: String,
    pub boarding: bool,
    pub destination: Option<DestinationId>,
    pub balance: Decimal,
    pub arrears: Decimal,
    pub prepayment: Decimal,
    pub bus_balance: Decimal,
    pub bus_arrears: Decimal,
    pub bus_prepayment: Decimal,
}

/// One row of `terms.csv`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TermRow {
    pub id: TermId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One row of `fees.csv`: the tuition fee for a grade in a term
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeeRow {
    pub term: TermId,
    pub grade: String,
    pub amount: Decimal,
}

/// One row of `transport.csv`: the bus charge for a destination in a term
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TransportFeeRow {
    pub term: TermId,
    pub destination: DestinationId,
    pub amount: Decimal,
}

/// One row of `destinations.csv`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DestinationRow {
    pub id: DestinationId,
    pub name: String,
}

/// The single row of `boarding.csv`: the flat boarding surcharge
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BoardingRow {
    pub surcharge: Decimal,
}

/// One row of `payments.csv`: an immutable tuition payment record
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PaymentRow {
    pub id: PaymentId,
    pub student: StudentId,
    pub term: TermId,
    pub amount: Decimal,
    pub method: String,
    pub date: NaiveDate,
    pub description: String,
    pub balance_after: Decimal,
}

/// One row of `bus_payments.csv`: an immutable transport payment record
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BusPaymentRow {
    pub id: PaymentId,
    pub student: StudentId,
    pub term: TermId,
    pub destination: DestinationId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub balance_after: Decimal,
}

/// One row of a payments day-file
///
/// Matches the day-file format with columns: kind, student, amount,
/// method, reference. The method and reference fields are optional
/// because bus events don't carry them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventRecord {
    pub kind: String,
    pub student: StudentId,
    pub amount: String,
    pub method: Option<String>,
    pub reference: Option<String>,
}

/// Convert an EventRecord to a PaymentEvent
///
/// This function:
/// - Parses the event kind string (`fee` or `bus`, case-insensitively)
/// - Parses the amount string into a Decimal
/// - Validates that fee events carry a payment method
/// - Ignores any method or reference on bus events
///
/// Amount positivity is NOT checked here; the engine rejects non-positive
/// amounts at settlement time so the audit trail sees the rejection.
///
/// # Errors
///
/// * `ParseError` for an unknown kind or unparseable amount
/// * `ParseError` for a fee event with no method
/// * `UnknownMethod` for a method outside the accepted set
pub fn convert_event_record(record: EventRecord) -> Result<PaymentEvent, BillingError> {
    let amount = Decimal::from_str(record.amount.trim()).map_err(|_| BillingError::ParseError {
        line: None,
        message: format!(
            "Invalid amount '{}' for student {}",
            record.amount, record.student
        ),
    })?;

    match record.kind.trim().to_lowercase().as_str() {
        "fee" => {
            let method = record
                .method
                .as_deref()
                .map(str::trim)
                .filter(|method| !method.is_empty())
                .ok_or_else(|| BillingError::ParseError {
                    line: None,
                    message: format!("Fee event for student {} requires a method", record.student),
                })?
                .parse::<PaymentMethod>()?;

            Ok(PaymentEvent::Fee {
                student: record.student,
                amount,
                method,
                reference: record.reference.unwrap_or_default(),
            })
        }
        "bus" => Ok(PaymentEvent::Bus {
            student: record.student,
            amount,
        }),
        other => Err(BillingError::ParseError {
            line: None,
            message: format!(
                "Invalid event kind '{}' for student {}",
                other, record.student
            ),
        }),
    }
}

/// Convert a students.csv row to a StudentAccount
///
/// # Errors
///
/// * `UnknownGrade` if the grade string is outside the ladder
pub fn student_from_row(row: StudentRow) -> Result<StudentAccount, BillingError> {
    let grade = row.grade.parse()?;
    Ok(StudentAccount {
        id: row.id,
        name: row.name,
        admission_no: row.admission_no,
        phone: row.phone,
        grade,
        boarding: row.boarding,
        destination: row.destination,
        tuition: Ledger {
            balance: row.balance,
            arrears: row.arrears,
            prepayment: row.prepayment,
        },
        transport: Ledger {
            balance: row.bus_balance,
            arrears: row.bus_arrears,
            prepayment: row.bus_prepayment,
        },
    })
}

/// Convert a StudentAccount to a students.csv row
pub fn student_to_row(account: &StudentAccount) -> StudentRow {
    StudentRow {
        id: account.id,
        name: account.name.clone(),
        admission_no: account.admission_no.clone(),
        phone: account.phone.clone(),
        grade: account.grade.to_string(),
        boarding: account.boarding,
        destination: account.destination,
        balance: account.tuition.balance,
        arrears: account.tuition.arrears,
        prepayment: account.tuition.prepayment,
        bus_balance: account.transport.balance,
        bus_arrears: account.transport.arrears,
        bus_prepayment: account.transport.prepayment,
    }
}

/// Convert a terms.csv row to a Term
pub fn term_from_row(row: TermRow) -> Term {
    Term::new(row.id, &row.name, row.start, row.end)
}

/// Convert a Term to a terms.csv row
pub fn term_to_row(term: &Term) -> TermRow {
    TermRow {
        id: term.id,
        name: term.name.clone(),
        start: term.start,
        end: term.end,
    }
}

/// Convert a destinations.csv row to a BusDestination
pub fn destination_from_row(row: DestinationRow) -> BusDestination {
    BusDestination {
        id: row.id,
        name: row.name,
    }
}

/// Convert a payments.csv row to a PaymentRecord
///
/// # Errors
///
/// * `UnknownMethod` if the method string is outside the accepted set
pub fn payment_from_row(row: PaymentRow) -> Result<PaymentRecord, BillingError> {
    let method = row.method.parse()?;
    Ok(PaymentRecord {
        id: row.id,
        student: row.student,
        term: row.term,
        amount: row.amount,
        method,
        date: row.date,
        description: row.description,
        balance_after: row.balance_after,
    })
}

/// Convert a PaymentRecord to a payments.csv row
pub fn payment_to_row(record: &PaymentRecord) -> PaymentRow {
    PaymentRow {
        id: record.id,
        student: record.student,
        term: record.term,
        amount: record.amount,
        method: record.method.to_string(),
        date: record.date,
        description: record.description.clone(),
        balance_after: record.balance_after,
    }
}

/// Convert a bus_payments.csv row to a BusPaymentRecord
pub fn bus_payment_from_row(row: BusPaymentRow) -> BusPaymentRecord {
    BusPaymentRecord {
        id: row.id,
        student: row.student,
        term: row.term,
        destination: row.destination,
        amount: row.amount,
        date: row.date,
        balance_after: row.balance_after,
    }
}

/// Convert a BusPaymentRecord to a bus_payments.csv row
pub fn bus_payment_to_row(record: &BusPaymentRecord) -> BusPaymentRow {
    BusPaymentRow {
        id: record.id,
        student: record.student,
        term: record.term,
        destination: record.destination,
        amount: record.amount,
        date: record.date,
        balance_after: record.balance_after,
    }
}

/// Write the account statement to CSV format
///
/// Writes one row per student with columns: student, name, admission_no,
/// grade, balance, arrears, prepayment, bus_balance, bus_arrears,
/// bus_prepayment. Money is printed with two decimal places and accounts
/// are sorted by student ID for deterministic output.
///
/// # Errors
///
/// * `IoError` / `ParseError` if writing to the output fails
pub fn write_statement_csv(
    accounts: &[StudentAccount],
    output: &mut dyn Write,
) -> Result<(), BillingError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record([
        "student",
        "name",
        "admission_no",
        "grade",
        "balance",
        "arrears",
        "prepayment",
        "bus_balance",
        "bus_arrears",
        "bus_prepayment",
    ])?;

    // Sort accounts by student ID for deterministic output
    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.name.clone(),
            account.admission_no.clone(),
            account.grade.to_string(),
            format!("{:.2}", account.tuition.balance),
            format!("{:.2}", account.tuition.arrears),
            format!("{:.2}", account.tuition.prepayment),
            format!("{:.2}", account.transport.balance),
            format!("{:.2}", account.transport.arrears),
            format!("{:.2}", account.transport.prepayment),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

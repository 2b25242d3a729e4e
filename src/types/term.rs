//! School term types for the billing engine
//!
//! A term is a dated billing period. Terms are ordered by their date
//! ranges and never overlap; at most one term contains any given date,
//! and that term is the "active" one.

use chrono::NaiveDate;

/// Term identifier
///
/// Supports term IDs from 0 to 4,294,967,295
pub type TermId = u32;

/// A school term with an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// The term ID (u32)
    pub id: TermId,

    /// Display name, e.g. "Term 1 2026"
    pub name: String,

    /// First day of the term
    pub start: NaiveDate,

    /// Last day of the term (inclusive)
    pub end: NaiveDate,
}

impl Term {
    /// Create a new term
    pub fn new(id: TermId, name: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Term {
            id,
            name: name.to_string(),
            start,
            end,
        }
    }

    /// Whether the given date falls inside this term (inclusive bounds)
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether this term has fully ended by the given date
    pub fn ended_by(&self, day: NaiveDate) -> bool {
        self.end < day
    }

    /// Whether two terms share any day
    pub fn overlaps(&self, other: &Term) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

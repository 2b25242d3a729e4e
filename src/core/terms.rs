//! Term calendar module
//!
//! This module provides the `TermCalendar` struct which maintains the
//! school's dated terms and answers the three questions billing asks:
//! which term is active today, which term has most recently ended, and
//! which term follows an ended one.
//!
//! Terms never overlap, so "active" is unique whenever it exists.

use crate::types::{BillingError, Term, TermId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Holds every configured term, keyed by id
pub struct TermCalendar {
    terms: HashMap<TermId, Term>,
}

impl TermCalendar {
    /// Create an empty TermCalendar
    pub fn new() -> Self {
        TermCalendar {
            terms: HashMap::new(),
        }
    }

    /// Add a term to the calendar
    ///
    /// # Errors
    ///
    /// * `InvalidTermRange` if the term starts after it ends
    /// * `DuplicateTerm` if a term with this id already exists
    /// * `TermOverlap` if the date range shares a day with an existing
    ///   term; the calendar is unchanged
    pub fn add(&mut self, term: Term) -> Result<(), BillingError> {
        if term.start > term.end {
            return Err(BillingError::InvalidTermRange { term: term.id });
        }
        if self.terms.contains_key(&term.id) {
            return Err(BillingError::DuplicateTerm { term: term.id });
        }
        if let Some(existing) = self.terms.values().find(|t| t.overlaps(&term)) {
            return Err(BillingError::TermOverlap {
                term: term.id,
                other: existing.id,
            });
        }
        self.terms.insert(term.id, term);
        Ok(())
    }

    /// Look up a term by id
    ///
    /// # Errors
    ///
    /// Returns `TermNotFound` if no term exists for the id.
    pub fn get(&self, term: TermId) -> Result<&Term, BillingError> {
        self.terms
            .get(&term)
            .ok_or_else(|| BillingError::term_not_found(term))
    }

    /// The term whose date range contains `today`
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTerm` if no term covers the date.
    pub fn active_term(&self, today: NaiveDate) -> Result<&Term, BillingError> {
        self.terms
            .values()
            .find(|term| term.contains(today))
            .ok_or_else(|| BillingError::no_active_term(today))
    }

    /// The most recently ended term as of `today`
    ///
    /// This is the term rollover closes: the one with the latest end date
    /// strictly before today.
    ///
    /// # Errors
    ///
    /// Returns `NoTermToRollover` if no term has ended yet.
    pub fn ended_term(&self, today: NaiveDate) -> Result<&Term, BillingError> {
        self.terms
            .values()
            .filter(|term| term.ended_by(today))
            .max_by_key(|term| term.end)
            .ok_or_else(|| BillingError::no_term_to_rollover(today))
    }

    /// The earliest term starting after the given term ends
    ///
    /// # Errors
    ///
    /// Returns `NoFollowingTerm` if no later term is configured.
    pub fn following_term(&self, term: &Term) -> Result<&Term, BillingError> {
        self.terms
            .values()
            .filter(|t| t.start > term.end)
            .min_by_key(|t| t.start)
            .ok_or_else(|| BillingError::no_following_term(term.id))
    }

    /// All terms sorted by start date
    pub fn get_all(&self) -> Vec<&Term> {
        let mut terms: Vec<&Term> = self.terms.values().collect();
        terms.sort_by_key(|term| term.start);
        terms
    }

    /// Number of configured terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the calendar has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for TermCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn school_year() -> TermCalendar {
        let mut calendar = TermCalendar::new();
        calendar
            .add(Term::new(1, "Term 1 2026", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();
        calendar
            .add(Term::new(2, "Term 2 2026", date(2026, 5, 4), date(2026, 8, 7)))
            .unwrap();
        calendar
            .add(Term::new(3, "Term 3 2026", date(2026, 9, 1), date(2026, 11, 20)))
            .unwrap();
        calendar
    }

    #[test]
    fn test_active_term_found_inside_range() {
        let calendar = school_year();

        assert_eq!(calendar.active_term(date(2026, 2, 14)).unwrap().id, 1);
        assert_eq!(calendar.active_term(date(2026, 5, 4)).unwrap().id, 2);
    }

    #[test]
    fn test_no_active_term_during_holidays() {
        let calendar = school_year();

        let err = calendar.active_term(date(2026, 4, 20)).unwrap_err();
        assert_eq!(err, BillingError::no_active_term(date(2026, 4, 20)));
    }

    #[test]
    fn test_ended_term_picks_latest_finished() {
        let calendar = school_year();

        // During term 2, only term 1 has ended.
        assert_eq!(calendar.ended_term(date(2026, 6, 1)).unwrap().id, 1);
        // During term 3, term 2 is the most recent to finish.
        assert_eq!(calendar.ended_term(date(2026, 9, 15)).unwrap().id, 2);
    }

    #[test]
    fn test_ended_term_before_anything_finished() {
        let calendar = school_year();

        let err = calendar.ended_term(date(2026, 2, 1)).unwrap_err();
        assert_eq!(err, BillingError::no_term_to_rollover(date(2026, 2, 1)));
    }

    #[test]
    fn test_following_term() {
        let calendar = school_year();
        let first = calendar.get(1).unwrap();

        assert_eq!(calendar.following_term(first).unwrap().id, 2);
    }

    #[test]
    fn test_no_following_term_after_last() {
        let calendar = school_year();
        let last = calendar.get(3).unwrap();

        let err = calendar.following_term(last).unwrap_err();
        assert_eq!(err, BillingError::no_following_term(3));
    }

    #[test]
    fn test_add_rejects_overlap() {
        let mut calendar = school_year();

        let result = calendar.add(Term::new(
            4,
            "Clashing",
            date(2026, 3, 1),
            date(2026, 5, 30),
        ));

        assert!(matches!(
            result.unwrap_err(),
            BillingError::TermOverlap { term: 4, .. }
        ));
        assert_eq!(calendar.len(), 3);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut calendar = school_year();

        let result = calendar.add(Term::new(
            1,
            "Repeat",
            date(2027, 1, 4),
            date(2027, 4, 2),
        ));

        assert_eq!(result.unwrap_err(), BillingError::DuplicateTerm { term: 1 });
    }

    #[test]
    fn test_add_rejects_inverted_range() {
        let mut calendar = TermCalendar::new();

        let result = calendar.add(Term::new(
            1,
            "Backwards",
            date(2026, 4, 3),
            date(2026, 1, 5),
        ));

        assert_eq!(
            result.unwrap_err(),
            BillingError::InvalidTermRange { term: 1 }
        );
    }

    #[test]
    fn test_get_all_sorted_by_start() {
        let mut calendar = TermCalendar::new();
        calendar
            .add(Term::new(9, "Later", date(2026, 9, 1), date(2026, 11, 20)))
            .unwrap();
        calendar
            .add(Term::new(4, "Earlier", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();

        let ids: Vec<TermId> = calendar.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }
}

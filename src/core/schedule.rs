//! Fee schedule module
//!
//! This module provides the `FeeBook` struct holding every configured
//! charge: tuition fees keyed by (term, grade), transport charges keyed
//! by (term, destination), and the flat boarding surcharge.
//!
//! Lookups fail with typed errors when no row is configured; billing
//! operations surface those rather than inventing a zero fee.

use crate::types::{BillingError, DestinationId, Grade, TermId};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// All configured charges for the school
///
/// One tuition row per (term, grade) and one transport row per
/// (term, destination); inserting a second row for the same key is
/// rejected. The boarding surcharge is a single optional amount added at
/// balance initialization for boarders — absent means no surcharge.
pub struct FeeBook {
    /// Tuition fee per (term, grade)
    fees: HashMap<(TermId, Grade), Decimal>,

    /// Transport charge per (term, destination)
    transport: HashMap<(TermId, DestinationId), Decimal>,

    /// Flat addition for boarders, if configured
    boarding_surcharge: Option<Decimal>,
}

impl FeeBook {
    /// Create an empty FeeBook
    pub fn new() -> Self {
        FeeBook {
            fees: HashMap::new(),
            transport: HashMap::new(),
            boarding_surcharge: None,
        }
    }

    /// Configure the tuition fee for a grade in a term
    ///
    /// # Errors
    ///
    /// * `InvalidFee` if the amount is negative
    /// * `DuplicateFee` if a row for this (term, grade) already exists
    pub fn set_fee(
        &mut self,
        term: TermId,
        grade: Grade,
        amount: Decimal,
    ) -> Result<(), BillingError> {
        if amount < Decimal::ZERO {
            return Err(BillingError::invalid_fee(amount));
        }
        if self.fees.contains_key(&(term, grade)) {
            return Err(BillingError::DuplicateFee { term, grade });
        }
        self.fees.insert((term, grade), amount);
        Ok(())
    }

    /// Look up the tuition fee for a grade in a term
    ///
    /// # Errors
    ///
    /// Returns `ScheduleMissing` if no row is configured.
    pub fn fee(&self, term: TermId, grade: Grade) -> Result<Decimal, BillingError> {
        self.fees
            .get(&(term, grade))
            .copied()
            .ok_or_else(|| BillingError::schedule_missing(term, grade))
    }

    /// Configure the transport charge for a destination in a term
    ///
    /// # Errors
    ///
    /// * `InvalidFee` if the amount is negative
    /// * `DuplicateTransportFee` if a row for this (term, destination)
    ///   already exists
    pub fn set_transport_fee(
        &mut self,
        term: TermId,
        destination: DestinationId,
        amount: Decimal,
    ) -> Result<(), BillingError> {
        if amount < Decimal::ZERO {
            return Err(BillingError::invalid_fee(amount));
        }
        if self.transport.contains_key(&(term, destination)) {
            return Err(BillingError::DuplicateTransportFee { term, destination });
        }
        self.transport.insert((term, destination), amount);
        Ok(())
    }

    /// Look up the transport charge for a destination in a term
    ///
    /// # Errors
    ///
    /// Returns `TransportScheduleMissing` if no row is configured.
    pub fn transport_fee(
        &self,
        term: TermId,
        destination: DestinationId,
    ) -> Result<Decimal, BillingError> {
        self.transport
            .get(&(term, destination))
            .copied()
            .ok_or_else(|| BillingError::transport_schedule_missing(term, destination))
    }

    /// Configure the flat boarding surcharge
    ///
    /// # Errors
    ///
    /// Returns `InvalidFee` if the amount is negative.
    pub fn set_boarding_surcharge(&mut self, amount: Decimal) -> Result<(), BillingError> {
        if amount < Decimal::ZERO {
            return Err(BillingError::invalid_fee(amount));
        }
        self.boarding_surcharge = Some(amount);
        Ok(())
    }

    /// The boarding surcharge, or `None` when not configured
    ///
    /// Balance initialization treats `None` as zero: no surcharge row
    /// means boarders pay the plain fee.
    pub fn boarding_surcharge(&self) -> Option<Decimal> {
        self.boarding_surcharge
    }

    /// All configured tuition rows, sorted by (term, grade)
    pub fn all_fees(&self) -> Vec<(TermId, Grade, Decimal)> {
        let mut rows: Vec<(TermId, Grade, Decimal)> = self
            .fees
            .iter()
            .map(|(&(term, grade), &amount)| (term, grade, amount))
            .collect();
        rows.sort_by_key(|&(term, grade, _)| (term, grade));
        rows
    }

    /// All configured transport rows, sorted by (term, destination)
    pub fn all_transport_fees(&self) -> Vec<(TermId, DestinationId, Decimal)> {
        let mut rows: Vec<(TermId, DestinationId, Decimal)> = self
            .transport
            .iter()
            .map(|(&(term, destination), &amount)| (term, destination, amount))
            .collect();
        rows.sort_by_key(|&(term, destination, _)| (term, destination));
        rows
    }
}

impl Default for FeeBook {
    fn default() -> Self {
        Self::new()
    }
}

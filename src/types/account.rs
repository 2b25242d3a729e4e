//! Student account and ledger types for the school billing engine
//!
//! This module defines the StudentAccount structure and the Ledger value
//! type holding the (balance, arrears, prepayment) triple. Every student
//! carries two independent ledgers: tuition and transport. The ledger
//! mutation rules live here so the synchronous engine and the concurrent
//! import path share one implementation.

use super::error::BillingError;
use super::grade::Grade;
use rust_decimal::Decimal;

/// Student identifier
///
/// Supports student IDs from 0 to 4,294,967,295
pub type StudentId = u32;

/// Bus destination identifier
pub type DestinationId = u32;

/// A bus route destination students can be assigned to
///
/// Transport charges are configured per (term, destination) in the
/// transport fee schedule; the destination itself is just identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusDestination {
    /// The destination ID (u32)
    pub id: DestinationId,

    /// Display name, e.g. a stage or estate name
    pub name: String,
}

/// One side of a student's billing state
///
/// Holds the running triple for either tuition or transport:
/// - `balance`: amount currently owed for the present term
/// - `arrears`: unpaid debt carried over from previously closed terms
/// - `prepayment`: credit held after paying more than was owed
///
/// Invariant maintained by every mutation: all three fields stay `>= 0`,
/// and `arrears` and `prepayment` are never both positive at once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ledger {
    /// Amount owed for the current term
    pub balance: Decimal,

    /// Unpaid debt rolled over from earlier terms
    ///
    /// Increased only by term rollover; decreased only by payments,
    /// which always settle arrears before the current balance.
    pub arrears: Decimal,

    /// Credit from overpayment
    ///
    /// Consumed exactly once, when the next term's balance is
    /// initialized. Discarded unconditionally at term rollover.
    pub prepayment: Decimal,
}

impl Ledger {
    /// Apply a payment to this ledger, oldest debt first
    ///
    /// The amount settles `arrears` before it touches `balance`; anything
    /// left after both are cleared accumulates in `prepayment`. The triple
    /// is updated all-or-nothing: on any error the ledger is unchanged.
    ///
    /// # Arguments
    ///
    /// * `student` - Student id, used only for error context
    /// * `amount` - Payment amount, must be strictly positive
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount <= 0`
    /// * `ArithmeticOverflow` / `ArithmeticUnderflow` if a checked
    ///   operation fails
    pub fn credit(&mut self, student: StudentId, amount: Decimal) -> Result<(), BillingError> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::invalid_amount(student, amount));
        }

        let mut remaining = amount;
        let mut arrears = self.arrears;
        let mut balance = self.balance;
        let mut prepayment = self.prepayment;

        if arrears > Decimal::ZERO {
            if remaining >= arrears {
                remaining = remaining
                    .checked_sub(arrears)
                    .ok_or_else(|| BillingError::arithmetic_underflow("payment", student))?;
                arrears = Decimal::ZERO;
            } else {
                arrears = arrears
                    .checked_sub(remaining)
                    .ok_or_else(|| BillingError::arithmetic_underflow("payment", student))?;
                remaining = Decimal::ZERO;
            }
        }

        if remaining > balance {
            let excess = remaining
                .checked_sub(balance)
                .ok_or_else(|| BillingError::arithmetic_underflow("payment", student))?;
            prepayment = prepayment
                .checked_add(excess)
                .ok_or_else(|| BillingError::arithmetic_overflow("payment", student))?;
            balance = Decimal::ZERO;
        } else {
            balance = balance
                .checked_sub(remaining)
                .ok_or_else(|| BillingError::arithmetic_underflow("payment", student))?;
        }

        self.arrears = arrears;
        self.balance = balance;
        self.prepayment = prepayment;
        Ok(())
    }

    /// Set the balance owed for a freshly started term, netting prepayment
    ///
    /// The held credit is consumed here and only here: the new balance is
    /// `amount_due - prepayment`, clamped at zero with any remainder of the
    /// credit kept as prepayment. Arrears are untouched.
    ///
    /// NOT idempotent: a second call overwrites the balance with the full
    /// amount due again (the prepayment was already spent). Callers invoke
    /// this exactly once per term transition.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticUnderflow` if a checked subtraction fails.
    pub fn initialize(&mut self, student: StudentId, amount_due: Decimal) -> Result<(), BillingError> {
        let credit = self.prepayment;
        if credit > amount_due {
            self.prepayment = credit.checked_sub(amount_due).ok_or_else(|| {
                BillingError::arithmetic_underflow("balance initialization", student)
            })?;
            self.balance = Decimal::ZERO;
        } else {
            self.balance = amount_due.checked_sub(credit).ok_or_else(|| {
                BillingError::arithmetic_underflow("balance initialization", student)
            })?;
            self.prepayment = Decimal::ZERO;
        }
        Ok(())
    }

    /// Roll the current balance into arrears and bill the next term
    ///
    /// Arrears stack: debt from a still-earlier uncollected term is
    /// preserved and added to. The new balance is the next term's nominal
    /// amount, not netted against prepayment (netting happens only via
    /// [`Ledger::initialize`]).
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the arrears addition fails; the
    /// ledger is left unchanged in that case.
    pub fn close_into(&mut self, student: StudentId, next_due: Decimal) -> Result<(), BillingError> {
        self.arrears = self
            .arrears
            .checked_add(self.balance)
            .ok_or_else(|| BillingError::arithmetic_overflow("term rollover", student))?;
        self.balance = next_due;
        Ok(())
    }

    /// Discard any held credit
    ///
    /// Term rollover calls this for every student after the new balances
    /// are in place: unspent prepayment does not survive the term boundary.
    pub fn forfeit_prepayment(&mut self) {
        self.prepayment = Decimal::ZERO;
    }

    /// Total currently owed on this ledger (balance plus arrears)
    pub fn outstanding(&self) -> Decimal {
        self.balance + self.arrears
    }
}

/// A student's roster entry and billing state
///
/// One row per student: identity fields plus the two independent ledgers.
/// The tuition and transport ledgers share nothing but the student id; a
/// tuition payment never touches the transport triple and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentAccount {
    /// The student ID (u32)
    pub id: StudentId,

    /// Full name
    pub name: String,

    /// Admission number, unique across the roster
    pub admission_no: String,

    /// Guardian phone number (may be empty)
    pub phone: String,

    /// Current grade tier
    pub grade: Grade,

    /// Whether the student boards (attracts the boarding surcharge)
    pub boarding: bool,

    /// Assigned bus destination, if any
    ///
    /// Bus payments are rejected while this is `None`; transport billing
    /// for a newly assigned destination starts at the next rollover.
    pub destination: Option<DestinationId>,

    /// Tuition billing state
    pub tuition: Ledger,

    /// Transport billing state
    pub transport: Ledger,
}

impl StudentAccount {
    /// Create a new account with zeroed ledgers
    ///
    /// # Arguments
    ///
    /// * `id` - The student ID for this account
    /// * `name` - Full name
    /// * `admission_no` - Admission number
    /// * `grade` - Starting grade tier
    ///
    /// # Returns
    ///
    /// A day-scholar account with no phone number, no bus destination and
    /// both ledgers at zero.
    pub fn new(id: StudentId, name: &str, admission_no: &str, grade: Grade) -> Self {
        StudentAccount {
            id,
            name: name.to_string(),
            admission_no: admission_no.to_string(),
            phone: String::new(),
            grade,
            boarding: false,
            destination: None,
            tuition: Ledger::default(),
            transport: Ledger::default(),
        }
    }

    /// Apply a tuition payment to this account
    ///
    /// See [`Ledger::credit`] for the settlement order.
    pub fn receive_payment(&mut self, amount: Decimal) -> Result<(), BillingError> {
        self.tuition.credit(self.id, amount)
    }

    /// Apply a transport payment to this account
    ///
    /// The caller is responsible for checking that a destination is
    /// assigned; this method only moves money on the transport ledger.
    pub fn receive_bus_payment(&mut self, amount: Decimal) -> Result<(), BillingError> {
        self.transport.credit(self.id, amount)
    }
}

//! Billing engine
//!
//! This module provides the central orchestration for student billing,
//! tying the roster, term calendar, fee book, destination directory and
//! payment logs together behind one API. Every mutation validates its
//! inputs before touching an account, so a failed operation leaves the
//! ledgers exactly as they were.
//!
//! Date-dependent decisions (which term is active, which term has
//! ended) go through the injected [`Clock`], never the wall clock
//! directly.

use crate::clock::{Clock, SystemClock};
use crate::core::payment_log::{BusPaymentLog, PaymentLog};
use crate::core::rollover::{self, RolloverOutcome};
use crate::core::roster::Roster;
use crate::core::schedule::FeeBook;
use crate::core::terms::TermCalendar;
use crate::types::{
    AppliedPayment, BillingError, BusDestination, BusPaymentRecord, DestinationId, Grade,
    PaymentEvent, PaymentId, PaymentMethod, PaymentRecord, StudentAccount, StudentId, Term,
    TermId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Central billing engine for a school
///
/// Owns all billing state and exposes the operations the CLI and the
/// bulk import strategies run. Payments settle arrears first, term
/// rollover is all-or-nothing, and every audit record is appended to
/// the logs at the moment its payment settles.
pub struct BillingEngine {
    /// Student accounts keyed by id
    roster: Roster,

    /// School terms and their date ranges
    calendar: TermCalendar,

    /// Tuition fees, transport charges and the boarding surcharge
    fee_book: FeeBook,

    /// Bus destinations keyed by id
    destinations: HashMap<DestinationId, BusDestination>,

    /// Append-only tuition payment records
    payments: PaymentLog,

    /// Append-only transport payment records
    bus_payments: BusPaymentLog,

    /// Source of "today" for active-term and rollover decisions
    clock: Box<dyn Clock>,
}

impl BillingEngine {
    /// Create an empty engine reading the system clock
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Create an empty engine with an explicit clock
    ///
    /// Used by tests and by the CLI's `--today` override.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        BillingEngine {
            roster: Roster::new(),
            calendar: TermCalendar::new(),
            fee_book: FeeBook::new(),
            destinations: HashMap::new(),
            payments: PaymentLog::new(),
            bus_payments: BusPaymentLog::new(),
            clock,
        }
    }

    /// Replace the clock
    ///
    /// The engine keeps its state; only "today" changes. Lets one engine
    /// be driven across a term boundary.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Today's date as the engine sees it
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ===== School directory loading =====

    /// Insert a student account loaded from storage
    ///
    /// # Errors
    ///
    /// * `DuplicateStudent` or `DuplicateAdmission` on collision
    pub fn insert_student(&mut self, account: StudentAccount) -> Result<(), BillingError> {
        self.roster.insert(account)
    }

    /// Add a term to the calendar
    ///
    /// # Errors
    ///
    /// * `InvalidTermRange` if the term starts after it ends
    /// * `DuplicateTerm` if the id is taken
    /// * `TermOverlap` if the dates collide with an existing term
    pub fn add_term(&mut self, term: Term) -> Result<(), BillingError> {
        self.calendar.add(term)
    }

    /// Set the tuition fee for a grade in a term
    ///
    /// # Errors
    ///
    /// * `InvalidFee` if the amount is negative
    /// * `DuplicateFee` if the (term, grade) row already exists
    pub fn set_fee(
        &mut self,
        term: TermId,
        grade: Grade,
        amount: Decimal,
    ) -> Result<(), BillingError> {
        self.fee_book.set_fee(term, grade, amount)
    }

    /// Set the transport charge for a destination in a term
    ///
    /// # Errors
    ///
    /// * `InvalidFee` if the amount is negative
    /// * `DuplicateTransportFee` if the (term, destination) row exists
    pub fn set_transport_fee(
        &mut self,
        term: TermId,
        destination: DestinationId,
        amount: Decimal,
    ) -> Result<(), BillingError> {
        self.fee_book.set_transport_fee(term, destination, amount)
    }

    /// Set the per-term boarding surcharge
    ///
    /// # Errors
    ///
    /// * `InvalidFee` if the amount is negative
    pub fn set_boarding_surcharge(&mut self, amount: Decimal) -> Result<(), BillingError> {
        self.fee_book.set_boarding_surcharge(amount)
    }

    /// Add a bus destination
    ///
    /// If the id is already present the first destination wins and the
    /// duplicate is ignored.
    pub fn add_destination(&mut self, destination: BusDestination) {
        self.destinations.entry(destination.id).or_insert(destination);
    }

    /// Append a tuition payment record loaded from storage
    pub fn load_payment(&mut self, record: PaymentRecord) {
        self.payments.append(record);
    }

    /// Append a transport payment record loaded from storage
    pub fn load_bus_payment(&mut self, record: BusPaymentRecord) {
        self.bus_payments.append(record);
    }

    // ===== Registration and setup =====

    /// Register a new student and bill them for the active term
    ///
    /// The tuition balance opens at the active term's fee for the
    /// student's grade, plus the boarding surcharge for boarders.
    /// `opening_arrears` seeds debt carried in from a previous school.
    /// The transport ledger stays zeroed until the student is assigned a
    /// destination and a term rolls over.
    ///
    /// All lookups happen before the roster is touched, so a failure
    /// registers nobody.
    ///
    /// # Arguments
    ///
    /// * `name` - Full name
    /// * `admission_no` - Admission number, unique across the roster
    /// * `grade` - Starting grade tier
    /// * `phone` - Guardian phone number (may be empty)
    /// * `boarding` - Whether the student boards
    /// * `opening_arrears` - Debt carried in, zero for most students
    ///
    /// # Returns
    ///
    /// The created account, already billed.
    ///
    /// # Errors
    ///
    /// * `NoActiveTerm` if today falls outside every term
    /// * `ScheduleMissing` if the grade has no fee row for the term
    /// * `InvalidFee` if `opening_arrears` is negative
    /// * `DuplicateAdmission` if the admission number is taken
    pub fn register_student(
        &mut self,
        name: &str,
        admission_no: &str,
        grade: Grade,
        phone: &str,
        boarding: bool,
        opening_arrears: Decimal,
    ) -> Result<StudentAccount, BillingError> {
        if opening_arrears < Decimal::ZERO {
            return Err(BillingError::invalid_fee(opening_arrears));
        }

        let today = self.clock.today();
        let term = self.calendar.active_term(today)?.id;
        let amount_due = self.billed_amount(term, self.roster.next_id(), grade, boarding)?;

        let id = self
            .roster
            .register(name, admission_no, grade, phone, boarding, opening_arrears)?
            .id;
        let account = self.roster.get_mut(id)?;
        account.tuition.initialize(id, amount_due)?;

        Ok(account.clone())
    }

    /// Assign a student to a bus destination
    ///
    /// Transport billing starts at the next rollover; assigning a
    /// destination mid-term does not charge anything immediately.
    ///
    /// # Errors
    ///
    /// * `DestinationNotFound` if the destination is unknown
    /// * `StudentNotFound` if the student is unknown
    pub fn assign_destination(
        &mut self,
        student: StudentId,
        destination: DestinationId,
    ) -> Result<(), BillingError> {
        if !self.destinations.contains_key(&destination) {
            return Err(BillingError::destination_not_found(destination));
        }
        self.roster.get_mut(student)?.destination = Some(destination);
        Ok(())
    }

    // ===== Balance initialization =====

    /// Bill one student for a term, netting any prepayment once
    ///
    /// Looks up the fee for the student's grade (plus the boarding
    /// surcharge for boarders), consumes the prepayment against it, and
    /// sets the remainder as the new balance. Arrears are not touched.
    ///
    /// Not idempotent: calling it again re-bills the term and consumes
    /// whatever prepayment has accumulated since.
    ///
    /// # Errors
    ///
    /// * `TermNotFound` if the term is unknown
    /// * `StudentNotFound` if the student is unknown
    /// * `ScheduleMissing` if the grade has no fee row for the term
    pub fn initialize_balance(
        &mut self,
        student: StudentId,
        term: TermId,
    ) -> Result<(), BillingError> {
        self.calendar.get(term)?;
        let account = self.roster.get(student)?;
        let amount_due = self.billed_amount(term, student, account.grade, account.boarding)?;

        self.roster
            .get_mut(student)?
            .tuition
            .initialize(student, amount_due)
    }

    /// Bill every student for a term
    ///
    /// Runs [`BillingEngine::initialize_balance`] over the whole roster
    /// in two phases: every billed amount is computed first, then all
    /// ledgers are written, so one missing fee row aborts with no
    /// account modified.
    ///
    /// # Returns
    ///
    /// The number of students billed.
    ///
    /// # Errors
    ///
    /// * `TermNotFound` if the term is unknown
    /// * `ScheduleMissing` naming the first student (by id) whose grade
    ///   has no fee row
    pub fn initialize_balances(&mut self, term: TermId) -> Result<usize, BillingError> {
        self.calendar.get(term)?;

        let mut staged = Vec::with_capacity(self.roster.len());
        for account in self.roster.get_all() {
            let amount_due =
                self.billed_amount(term, account.id, account.grade, account.boarding)?;
            let mut tuition = account.tuition;
            tuition.initialize(account.id, amount_due)?;
            staged.push((account.id, tuition));
        }

        let billed = staged.len();
        for (id, tuition) in staged {
            self.roster.get_mut(id)?.tuition = tuition;
        }
        Ok(billed)
    }

    /// The amount a student owes for a term: grade fee plus boarding
    /// surcharge where one is configured
    fn billed_amount(
        &self,
        term: TermId,
        student: StudentId,
        grade: Grade,
        boarding: bool,
    ) -> Result<Decimal, BillingError> {
        let fee = self.fee_book.fee(term, grade)?;
        if !boarding {
            return Ok(fee);
        }
        match self.fee_book.boarding_surcharge() {
            Some(surcharge) => fee
                .checked_add(surcharge)
                .ok_or_else(|| BillingError::arithmetic_overflow("billing", student)),
            None => Ok(fee),
        }
    }

    // ===== Payments =====

    /// Apply a tuition payment and append its audit record
    ///
    /// Settlement is arrears-first: the amount pays down arrears, then
    /// the balance, and anything left over becomes prepayment. The
    /// record is stamped with `term` (the term the payer is settling,
    /// which may be a past term carrying arrears) while the mutation
    /// itself requires a term to be active today.
    ///
    /// # Arguments
    ///
    /// * `student` - Student to credit
    /// * `amount` - Amount paid; must be positive
    /// * `term` - Term the payment is recorded against
    /// * `method` - How the payment was made
    /// * `description` - Receipt or transaction reference
    ///
    /// # Returns
    ///
    /// The appended record, `balance_after` holding the tuition balance
    /// once settlement finished.
    ///
    /// # Errors
    ///
    /// * `TermNotFound` if `term` is unknown
    /// * `NoActiveTerm` if today falls outside every term
    /// * `StudentNotFound` if the student is unknown
    /// * `InvalidAmount` if the amount is zero or negative; the account
    ///   is unchanged
    pub fn apply_payment(
        &mut self,
        student: StudentId,
        amount: Decimal,
        term: TermId,
        method: PaymentMethod,
        description: &str,
    ) -> Result<PaymentRecord, BillingError> {
        self.calendar.get(term)?;
        let today = self.clock.today();
        self.calendar.active_term(today)?;

        let account = self.roster.get_mut(student)?;
        account.receive_payment(amount)?;
        let balance_after = account.tuition.balance;

        let record = PaymentRecord {
            id: self.payments.next_id(),
            student,
            term,
            amount,
            method,
            date: today,
            description: description.to_string(),
            balance_after,
        };
        self.payments.append(record.clone());
        Ok(record)
    }

    /// Apply a transport payment and append its audit record
    ///
    /// Settles against the transport ledger with the same arrears-first
    /// rule as tuition. The record is stamped with the active term and
    /// the student's current destination.
    ///
    /// # Errors
    ///
    /// * `NoActiveTerm` if today falls outside every term
    /// * `StudentNotFound` if the student is unknown
    /// * `NoDestinationAssigned` if the student has no destination
    /// * `InvalidAmount` if the amount is zero or negative; the account
    ///   is unchanged
    pub fn apply_bus_payment(
        &mut self,
        student: StudentId,
        amount: Decimal,
    ) -> Result<BusPaymentRecord, BillingError> {
        let today = self.clock.today();
        let term = self.calendar.active_term(today)?.id;

        let account = self.roster.get_mut(student)?;
        let destination = account
            .destination
            .ok_or_else(|| BillingError::no_destination_assigned(student))?;
        account.receive_bus_payment(amount)?;
        let balance_after = account.transport.balance;

        let record = BusPaymentRecord {
            id: self.bus_payments.next_id(),
            student,
            term,
            destination,
            amount,
            date: today,
            balance_after,
        };
        self.bus_payments.append(record.clone());
        Ok(record)
    }

    /// Apply one day-file event
    ///
    /// Fee events are recorded against the active term; day-files carry
    /// no term column. Used by the sequential import strategy.
    ///
    /// # Errors
    ///
    /// Same as [`BillingEngine::apply_payment`] and
    /// [`BillingEngine::apply_bus_payment`].
    pub fn apply_event(&mut self, event: &PaymentEvent) -> Result<(), BillingError> {
        match event {
            PaymentEvent::Fee {
                student,
                amount,
                method,
                reference,
            } => {
                let term = self.calendar.active_term(self.clock.today())?.id;
                self.apply_payment(*student, *amount, term, *method, reference)?;
            }
            PaymentEvent::Bus { student, amount } => {
                self.apply_bus_payment(*student, *amount)?;
            }
        }
        Ok(())
    }

    /// Write back the results of a concurrent import run
    ///
    /// Replaces each account with its post-import state and appends one
    /// audit record per applied event, stamped with the active term and
    /// today's date. The accounts must have been seeded from this
    /// engine's roster; per-student record order follows the order of
    /// `applied`.
    ///
    /// # Errors
    ///
    /// * `NoActiveTerm` if today falls outside every term
    /// * `StudentNotFound` if an account was never in the roster
    pub fn commit_import(
        &mut self,
        accounts: Vec<StudentAccount>,
        applied: Vec<AppliedPayment>,
    ) -> Result<(), BillingError> {
        let today = self.clock.today();
        let term = self.calendar.active_term(today)?.id;

        for account in accounts {
            let slot = self.roster.get_mut(account.id)?;
            *slot = account;
        }

        for outcome in applied {
            match outcome {
                AppliedPayment::Fee {
                    student,
                    amount,
                    method,
                    reference,
                    balance_after,
                } => {
                    let record = PaymentRecord {
                        id: self.payments.next_id(),
                        student,
                        term,
                        amount,
                        method,
                        date: today,
                        description: reference,
                        balance_after,
                    };
                    self.payments.append(record);
                }
                AppliedPayment::Bus {
                    student,
                    amount,
                    destination,
                    balance_after,
                } => {
                    let record = BusPaymentRecord {
                        id: self.bus_payments.next_id(),
                        student,
                        term,
                        destination,
                        amount,
                        date: today,
                        balance_after,
                    };
                    self.bus_payments.append(record);
                }
            }
        }
        Ok(())
    }

    // ===== Batch term operations =====

    /// Close the most recently ended term and bill the following one
    ///
    /// See [`rollover::close_term`]. All-or-nothing across the roster.
    ///
    /// # Errors
    ///
    /// * `NoTermToRollover` if no term has ended yet
    /// * `NoFollowingTerm` if the ended term has no successor
    /// * `ScheduleMissing` / `TransportScheduleMissing` if the next
    ///   term's schedule is incomplete; no account is modified
    pub fn close_term(&mut self) -> Result<RolloverOutcome, BillingError> {
        let today = self.clock.today();
        rollover::close_term(&mut self.roster, &self.calendar, &self.fee_book, today)
    }

    /// Advance every student one grade up the ladder
    ///
    /// # Returns
    ///
    /// The number of students promoted. Students at the terminal grade
    /// stay put and are not counted.
    pub fn promote_all(&mut self) -> usize {
        rollover::promote_all(&mut self.roster)
    }

    // ===== Corrections =====

    /// Overwrite a student's tuition balance
    ///
    /// Manual correction for data-entry mistakes. Arrears, prepayment
    /// and the payment log are untouched.
    ///
    /// # Errors
    ///
    /// * `StudentNotFound` if the student is unknown
    /// * `InvalidFee` if the new balance is negative
    pub fn adjust_balance(
        &mut self,
        student: StudentId,
        new_balance: Decimal,
    ) -> Result<(), BillingError> {
        if new_balance < Decimal::ZERO {
            return Err(BillingError::invalid_fee(new_balance));
        }
        self.roster.get_mut(student)?.tuition.balance = new_balance;
        Ok(())
    }

    /// Amend a payment record's amount, method or description
    ///
    /// Edits the audit trail only: the student's ledger is NOT
    /// recomputed and the record's `balance_after` keeps its original
    /// snapshot. Fields passed as `None` are left unchanged.
    ///
    /// # Errors
    ///
    /// * `PaymentNotFound` if the id is unknown
    /// * `InvalidAmount` if a new amount is zero or negative
    pub fn amend_payment(
        &mut self,
        payment: PaymentId,
        amount: Option<Decimal>,
        method: Option<PaymentMethod>,
        description: Option<&str>,
    ) -> Result<PaymentRecord, BillingError> {
        self.payments
            .amend(payment, amount, method, description)
            .map(|record| record.clone())
    }

    // ===== Views =====

    /// One student's account
    ///
    /// # Errors
    ///
    /// * `StudentNotFound` if the student is unknown
    pub fn account(&self, student: StudentId) -> Result<&StudentAccount, BillingError> {
        self.roster.get(student)
    }

    /// All student accounts, sorted by id
    pub fn accounts(&self) -> Vec<&StudentAccount> {
        self.roster.get_all()
    }

    /// One term
    ///
    /// # Errors
    ///
    /// * `TermNotFound` if the term is unknown
    pub fn term(&self, term: TermId) -> Result<&Term, BillingError> {
        self.calendar.get(term)
    }

    /// All terms, sorted by start date
    pub fn terms(&self) -> Vec<&Term> {
        self.calendar.get_all()
    }

    /// The id of the term containing today's date
    ///
    /// # Errors
    ///
    /// * `NoActiveTerm` if today falls outside every term
    pub fn active_term_id(&self) -> Result<TermId, BillingError> {
        Ok(self.calendar.active_term(self.clock.today())?.id)
    }

    /// The fee schedule
    pub fn fee_book(&self) -> &FeeBook {
        &self.fee_book
    }

    /// One bus destination
    ///
    /// # Errors
    ///
    /// * `DestinationNotFound` if the destination is unknown
    pub fn destination(
        &self,
        destination: DestinationId,
    ) -> Result<&BusDestination, BillingError> {
        self.destinations
            .get(&destination)
            .ok_or_else(|| BillingError::destination_not_found(destination))
    }

    /// All bus destinations, sorted by id
    pub fn destinations(&self) -> Vec<&BusDestination> {
        let mut destinations: Vec<&BusDestination> = self.destinations.values().collect();
        destinations.sort_by_key(|destination| destination.id);
        destinations
    }

    /// The tuition payment log
    pub fn payments(&self) -> &PaymentLog {
        &self.payments
    }

    /// The transport payment log
    pub fn bus_payments(&self) -> &BusPaymentLog {
        &self.bus_payments
    }

    /// A student's tuition payment history, oldest first
    ///
    /// # Errors
    ///
    /// * `StudentNotFound` if the student is unknown
    pub fn payments_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<&PaymentRecord>, BillingError> {
        self.roster.get(student)?;
        Ok(self.payments.for_student(student))
    }

    /// A student's tuition payments recorded against one term, oldest
    /// first
    ///
    /// # Errors
    ///
    /// * `StudentNotFound` if the student is unknown
    /// * `TermNotFound` if the term is unknown
    pub fn payments_for_student_in_term(
        &self,
        student: StudentId,
        term: TermId,
    ) -> Result<Vec<&PaymentRecord>, BillingError> {
        self.roster.get(student)?;
        self.calendar.get(term)?;
        Ok(self.payments.for_student_in_term(student, term))
    }
}

impl std::fmt::Debug for BillingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingEngine").finish_non_exhaustive()
    }
}

impl Default for BillingEngine {
    fn default() -> Self {
        Self::new()
    }
}

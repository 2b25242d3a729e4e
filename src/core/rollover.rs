//! Batch term transition operations
//!
//! This module implements the two whole-population operations: closing a
//! term (roll unpaid balances into arrears and bill the next term) and
//! promoting every student one grade up the ladder.
//!
//! Both run against every student. Rollover is all-or-nothing: new
//! ledgers are staged for the whole roster first, so a missing fee row
//! aborts with no account modified and names the student it failed on.

use crate::core::roster::Roster;
use crate::core::schedule::FeeBook;
use crate::core::terms::TermCalendar;
use crate::types::{BillingError, Ledger, StudentId, TermId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// What a completed rollover did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// The term that was closed (latest one ended before today)
    pub closed_term: TermId,

    /// The term whose fees are now billed
    pub next_term: TermId,

    /// Number of students rolled over
    pub students: usize,
}

/// Close the most recently ended term and bill the following one
///
/// For every student: current balance moves into arrears (stacking on any
/// debt already there), the new balance becomes the next term's fee for
/// the student's grade, and the transport ledger does the same against
/// the destination charge. Students without an assigned destination roll
/// their transport balance into arrears and get a zero new transport
/// balance. Finally every prepayment (tuition and transport) is
/// discarded: unspent credit does not cross a term boundary.
///
/// Runs in two phases: all new ledgers are computed first, then written
/// back, so a failure leaves every account exactly as it was. Students
/// are staged in id order, making the reported failure deterministic.
///
/// # Errors
///
/// * `NoTermToRollover` if no term has ended by `today`
/// * `NoFollowingTerm` if the ended term has no configured successor
/// * `ScheduleMissing` / `TransportScheduleMissing` naming the first
///   student (by id) whose grade or destination has no fee row
pub fn close_term(
    roster: &mut Roster,
    calendar: &TermCalendar,
    fees: &FeeBook,
    today: NaiveDate,
) -> Result<RolloverOutcome, BillingError> {
    let ended = calendar.ended_term(today)?;
    let next = calendar.following_term(ended)?;

    let mut staged: Vec<(StudentId, Ledger, Ledger)> = Vec::with_capacity(roster.len());
    for account in roster.get_all() {
        let fee = fees.fee(next.id, account.grade)?;
        let mut tuition = account.tuition;
        tuition.close_into(account.id, fee)?;
        tuition.forfeit_prepayment();

        let charge = match account.destination {
            Some(destination) => fees.transport_fee(next.id, destination)?,
            None => Decimal::ZERO,
        };
        let mut transport = account.transport;
        transport.close_into(account.id, charge)?;
        transport.forfeit_prepayment();

        staged.push((account.id, tuition, transport));
    }

    let students = staged.len();
    for (id, tuition, transport) in staged {
        let account = roster.get_mut(id)?;
        account.tuition = tuition;
        account.transport = transport;
    }

    Ok(RolloverOutcome {
        closed_term: ended.id,
        next_term: next.id,
        students,
    })
}

/// Advance every student one step up the grade ladder
///
/// Students already at the terminal grade stay where they are; that is
/// not an error. Balances are untouched. Returns the number of students
/// actually advanced.
pub fn promote_all(roster: &mut Roster) -> usize {
    let mut promoted = 0;
    for account in roster.iter_mut() {
        if let Some(next) = account.grade.successor() {
            account.grade = next;
            promoted += 1;
        }
    }
    promoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Grade, Term};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> TermCalendar {
        let mut calendar = TermCalendar::new();
        calendar
            .add(Term::new(1, "Term 1", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();
        calendar
            .add(Term::new(2, "Term 2", date(2026, 5, 4), date(2026, 8, 7)))
            .unwrap();
        calendar
    }

    fn roster_with(grade: Grade, balance: i64, arrears: i64, prepayment: i64) -> Roster {
        let mut roster = Roster::new();
        let id = roster
            .register("Student", "ADM-001", grade, "", false, Decimal::ZERO)
            .unwrap()
            .id;
        let account = roster.get_mut(id).unwrap();
        account.tuition.balance = Decimal::new(balance, 0);
        account.tuition.arrears = Decimal::new(arrears, 0);
        account.tuition.prepayment = Decimal::new(prepayment, 0);
        roster
    }

    #[test]
    fn test_close_term_rolls_balance_and_bills_next_fee() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 300, 100, 0);

        // Term 1 ended on 2026-04-03; rolling over during the holidays.
        let outcome = close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();

        assert_eq!(
            outcome,
            RolloverOutcome {
                closed_term: 1,
                next_term: 2,
                students: 1
            }
        );
        let account = roster.get(1).unwrap();
        assert_eq!(account.tuition.arrears, Decimal::new(400, 0));
        assert_eq!(account.tuition.balance, Decimal::new(2000, 0));
    }

    #[test]
    fn test_close_term_discards_prepayment() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 0, 0, 650);

        close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();

        let account = roster.get(1).unwrap();
        // The credit is gone and the new balance is the full fee.
        assert_eq!(account.tuition.prepayment, Decimal::ZERO);
        assert_eq!(account.tuition.balance, Decimal::new(2000, 0));
    }

    #[test]
    fn test_close_term_bills_transport_for_assigned_students() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        fees.set_transport_fee(2, 7, Decimal::new(900, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 0, 0, 0);
        {
            let account = roster.get_mut(1).unwrap();
            account.destination = Some(7);
            account.transport.balance = Decimal::new(250, 0);
            account.transport.prepayment = Decimal::new(40, 0);
        }

        close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();

        let account = roster.get(1).unwrap();
        assert_eq!(account.transport.arrears, Decimal::new(250, 0));
        assert_eq!(account.transport.balance, Decimal::new(900, 0));
        assert_eq!(account.transport.prepayment, Decimal::ZERO);
    }

    #[test]
    fn test_close_term_without_destination_carries_transport_debt() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 0, 0, 0);
        roster.get_mut(1).unwrap().transport.balance = Decimal::new(250, 0);

        close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();

        let account = roster.get(1).unwrap();
        assert_eq!(account.transport.arrears, Decimal::new(250, 0));
        assert_eq!(account.transport.balance, Decimal::ZERO);
    }

    #[test]
    fn test_close_term_aborts_atomically_on_missing_fee() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        // Grade 4 is configured for term 2, grade 5 is not.
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 300, 0, 0);
        roster
            .register("Second", "ADM-002", Grade::Grade5, "", false, Decimal::ZERO)
            .unwrap();
        roster.get_mut(2).unwrap().tuition.balance = Decimal::new(500, 0);

        let err = close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap_err();

        assert_eq!(err, BillingError::schedule_missing(2, Grade::Grade5));
        // Nobody was touched, including the student whose fee existed.
        assert_eq!(roster.get(1).unwrap().tuition.balance, Decimal::new(300, 0));
        assert_eq!(roster.get(1).unwrap().tuition.arrears, Decimal::ZERO);
        assert_eq!(roster.get(2).unwrap().tuition.balance, Decimal::new(500, 0));
    }

    #[test]
    fn test_close_term_aborts_on_missing_transport_fee() {
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 300, 0, 0);
        roster.get_mut(1).unwrap().destination = Some(9);

        let err = close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap_err();

        assert_eq!(err, BillingError::transport_schedule_missing(2, 9));
        assert_eq!(roster.get(1).unwrap().tuition.balance, Decimal::new(300, 0));
    }

    #[test]
    fn test_close_term_requires_an_ended_term() {
        let calendar = calendar();
        let fees = FeeBook::new();
        let mut roster = roster_with(Grade::Grade4, 300, 0, 0);

        // Mid-term 1: nothing has ended yet.
        let err = close_term(&mut roster, &calendar, &fees, date(2026, 2, 1)).unwrap_err();

        assert_eq!(err, BillingError::no_term_to_rollover(date(2026, 2, 1)));
    }

    #[test]
    fn test_close_term_requires_a_following_term() {
        let mut calendar = TermCalendar::new();
        calendar
            .add(Term::new(1, "Term 1", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();
        let fees = FeeBook::new();
        let mut roster = roster_with(Grade::Grade4, 300, 0, 0);

        let err = close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap_err();

        assert_eq!(err, BillingError::no_following_term(1));
        assert_eq!(roster.get(1).unwrap().tuition.balance, Decimal::new(300, 0));
    }

    #[test]
    fn test_close_term_twice_stacks_arrears() {
        // Calling rollover a second time is a caller error, not a no-op:
        // the freshly billed balance rolls into arrears again.
        let calendar = calendar();
        let mut fees = FeeBook::new();
        fees.set_fee(2, Grade::Grade4, Decimal::new(2000, 0)).unwrap();
        let mut roster = roster_with(Grade::Grade4, 300, 0, 0);

        close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();
        close_term(&mut roster, &calendar, &fees, date(2026, 4, 10)).unwrap();

        let account = roster.get(1).unwrap();
        assert_eq!(account.tuition.arrears, Decimal::new(2300, 0));
        assert_eq!(account.tuition.balance, Decimal::new(2000, 0));
    }

    #[test]
    fn test_promote_all_advances_each_grade_once() {
        let mut roster = Roster::new();
        roster
            .register("A", "ADM-001", Grade::Baby, "", false, Decimal::ZERO)
            .unwrap();
        roster
            .register("B", "ADM-002", Grade::Pp2, "", false, Decimal::ZERO)
            .unwrap();
        roster
            .register("C", "ADM-003", Grade::Grade8, "", false, Decimal::ZERO)
            .unwrap();

        let promoted = promote_all(&mut roster);

        assert_eq!(promoted, 3);
        assert_eq!(roster.get(1).unwrap().grade, Grade::Pp1);
        assert_eq!(roster.get(2).unwrap().grade, Grade::Grade1);
        assert_eq!(roster.get(3).unwrap().grade, Grade::Grade9);
    }

    #[test]
    fn test_promote_all_leaves_terminal_grade_alone() {
        let mut roster = Roster::new();
        roster
            .register("A", "ADM-001", Grade::Grade9, "", false, Decimal::ZERO)
            .unwrap();
        roster
            .register("B", "ADM-002", Grade::Grade3, "", false, Decimal::ZERO)
            .unwrap();

        let promoted = promote_all(&mut roster);

        assert_eq!(promoted, 1);
        assert_eq!(roster.get(1).unwrap().grade, Grade::Grade9);
        assert_eq!(roster.get(2).unwrap().grade, Grade::Grade4);
    }

    #[test]
    fn test_promote_all_ignores_balances() {
        let mut roster = roster_with(Grade::Grade4, 300, 100, 50);

        promote_all(&mut roster);

        let account = roster.get(1).unwrap();
        assert_eq!(account.grade, Grade::Grade5);
        assert_eq!(account.tuition.balance, Decimal::new(300, 0));
        assert_eq!(account.tuition.arrears, Decimal::new(100, 0));
        assert_eq!(account.tuition.prepayment, Decimal::new(50, 0));
    }
}

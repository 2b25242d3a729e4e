//! End-to-end integration tests
//!
//! These tests validate the complete billing pipeline against a school
//! directory on disk. Each test:
//! 1. Builds a school directory in a temporary location
//! 2. Runs operations through the engine and import strategies
//! 3. Stores the directory and reloads it
//! 4. Asserts on the final ledgers, audit records and statement output
//!
//! Scenarios cover:
//! - Day-file import (both strategies, with equivalence between them)
//! - The full term lifecycle (billing, payment, close, promotion)
//! - Statement output exactness
//! - Persistence round trips through the school directory
//!
//! Import scenarios run twice: once with the synchronous strategy and
//! once with the async strategy.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use shule_ledger::cli::StrategyType;
    use shule_ledger::clock::FixedClock;
    use shule_ledger::core::BillingEngine;
    use shule_ledger::io::{write_statement_csv, SchoolDir};
    use shule_ledger::strategy::{create_strategy, BatchConfig};
    use shule_ledger::types::{BillingError, BusDestination, Grade, PaymentMethod, Term};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn day_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write day-file");
        file.flush().expect("Failed to flush day-file");
        file
    }

    /// A school mid-way through term 1: two terms configured, three
    /// students registered, one of them on the bus route.
    fn school() -> BillingEngine {
        let mut engine = BillingEngine::with_clock(Box::new(FixedClock::new(date(2026, 2, 2))));
        engine
            .add_term(Term::new(1, "Term 1", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();
        engine
            .add_term(Term::new(2, "Term 2", date(2026, 5, 4), date(2026, 8, 7)))
            .unwrap();
        engine.set_fee(1, Grade::Pp2, dec(1200)).unwrap();
        engine.set_fee(1, Grade::Grade4, dec(1500)).unwrap();
        engine.set_fee(2, Grade::Pp2, dec(1300)).unwrap();
        engine.set_fee(2, Grade::Grade4, dec(1800)).unwrap();
        // Promotion between terms moves students up a grade.
        engine.set_fee(2, Grade::Grade1, dec(1400)).unwrap();
        engine.set_fee(2, Grade::Grade5, dec(1900)).unwrap();
        engine.add_destination(BusDestination {
            id: 7,
            name: "Hilltop".to_string(),
        });
        engine.set_transport_fee(1, 7, dec(700)).unwrap();
        engine.set_transport_fee(2, 7, dec(750)).unwrap();
        engine
            .register_student(
                "Amina Odhiambo",
                "ADM-001",
                Grade::Grade4,
                "0712000111",
                false,
                Decimal::ZERO,
            )
            .unwrap();
        engine
            .register_student("Brian Mwangi", "ADM-002", Grade::Grade4, "", false, dec(400))
            .unwrap();
        engine
            .register_student("Carol Njeri", "ADM-003", Grade::Pp2, "", false, Decimal::ZERO)
            .unwrap();
        engine.assign_destination(2, 7).unwrap();
        engine
    }

    fn strategy_config(strategy_type: &StrategyType) -> Option<BatchConfig> {
        match strategy_type {
            StrategyType::Sync => None,
            StrategyType::Async => Some(BatchConfig::default()),
        }
    }

    /// Day-file import through either strategy lands the same ledgers and
    /// survives a store/load round trip.
    #[rstest]
    #[case::sync(StrategyType::Sync)]
    #[case::async_batch(StrategyType::Async)]
    fn test_import_day_file_end_to_end(#[case] strategy_type: StrategyType) {
        let dir = TempDir::new().unwrap();
        let school_dir = SchoolDir::new(dir.path());
        school_dir.store(&school()).unwrap();

        let file = day_file(
            "kind,student,amount,method,reference\n\
             fee,1,500,mpesa,QX12ABC\n\
             fee,2,2000,bank,slip 17\n\
             bus,2,300,,\n\
             fee,3,1200,cash,\n\
             fee,9,100,cash,\n",
        );

        let mut engine = school_dir.load().unwrap();
        engine.set_clock(Box::new(FixedClock::new(date(2026, 2, 2))));
        let config = strategy_config(&strategy_type);
        let strategy = create_strategy(strategy_type, config);

        let summary = strategy.import(&mut engine, file.path()).unwrap();
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.skipped, 1); // unknown student 9

        school_dir.store(&engine).unwrap();
        let reloaded = school_dir.load().unwrap();

        // Amina: 1500 billed, 500 paid.
        assert_eq!(reloaded.account(1).unwrap().tuition.balance, dec(1000));
        // Brian: 400 arrears + 1500 billed, 2000 clears both with 100 over.
        let brian = reloaded.account(2).unwrap();
        assert_eq!(brian.tuition.arrears, Decimal::ZERO);
        assert_eq!(brian.tuition.balance, Decimal::ZERO);
        assert_eq!(brian.tuition.prepayment, dec(100));
        // Bus fare was not billed mid-term, so 300 sits as credit.
        assert_eq!(brian.transport.prepayment, dec(300));
        // Carol paid her term in full.
        assert_eq!(reloaded.account(3).unwrap().tuition.balance, Decimal::ZERO);

        assert_eq!(reloaded.payments().len(), 3);
        assert_eq!(reloaded.bus_payments().len(), 1);
        let record = reloaded.payments().get(1).unwrap();
        assert_eq!(record.student, 1);
        assert_eq!(record.term, 1);
        assert_eq!(record.method, PaymentMethod::Mpesa);
        assert_eq!(record.date, date(2026, 2, 2));
    }

    /// Both strategies produce identical final state for the same day-file.
    #[test]
    fn test_sync_and_async_imports_are_equivalent() {
        let content = "kind,student,amount,method,reference\n\
             fee,1,700,mpesa,QX1\n\
             bus,2,400,,\n\
             fee,2,1600,bank,slip 3\n\
             fee,1,900,cash,\n\
             fee,3,50,cash,\n\
             fee,3,75,mpesa,QX2\n";
        let sync_file = day_file(content);
        let async_file = day_file(content);

        let mut sync_engine = school();
        let mut async_engine = school();

        create_strategy(StrategyType::Sync, None)
            .import(&mut sync_engine, sync_file.path())
            .unwrap();
        create_strategy(StrategyType::Async, Some(BatchConfig::new(2, 4)))
            .import(&mut async_engine, async_file.path())
            .unwrap();

        for id in 1..=3 {
            assert_eq!(
                sync_engine.account(id).unwrap(),
                async_engine.account(id).unwrap(),
                "account {} diverged between strategies",
                id
            );
        }
        assert_eq!(sync_engine.payments().len(), async_engine.payments().len());
        assert_eq!(
            sync_engine.bus_payments().len(),
            async_engine.bus_payments().len()
        );
    }

    /// The full lifecycle: pay during term 1, close it, promote, then
    /// verify term 2's bills and the carried arrears.
    #[test]
    fn test_term_lifecycle_close_and_promote() {
        let dir = TempDir::new().unwrap();
        let school_dir = SchoolDir::new(dir.path());

        let mut engine = school();
        // Amina pays in full and then some; the excess will be forfeited.
        engine
            .apply_payment(1, dec(1600), 1, PaymentMethod::Mpesa, "QX12ABC")
            .unwrap();
        // Carol pays half.
        engine
            .apply_payment(3, dec(600), 1, PaymentMethod::Cash, "")
            .unwrap();
        school_dir.store(&engine).unwrap();

        // The holidays: term 1 ended 2026-04-03.
        let mut engine = school_dir.load().unwrap();
        engine.set_clock(Box::new(FixedClock::new(date(2026, 4, 10))));

        let promoted = engine.promote_all();
        assert_eq!(promoted, 3);
        assert_eq!(engine.account(1).unwrap().grade, Grade::Grade5);
        assert_eq!(engine.account(3).unwrap().grade, Grade::Grade1);

        let outcome = engine.close_term().unwrap();
        assert_eq!(outcome.closed_term, 1);
        assert_eq!(outcome.next_term, 2);
        assert_eq!(outcome.students, 3);
        school_dir.store(&engine).unwrap();

        let reloaded = school_dir.load().unwrap();
        // Amina: overpayment of 100 forfeited, fresh grade 5 bill.
        let amina = reloaded.account(1).unwrap();
        assert_eq!(amina.tuition.prepayment, Decimal::ZERO);
        assert_eq!(amina.tuition.balance, dec(1900));
        assert_eq!(amina.tuition.arrears, Decimal::ZERO);
        // Brian: nothing paid, 400 opening arrears plus 1500 unpaid.
        let brian = reloaded.account(2).unwrap();
        assert_eq!(brian.tuition.arrears, dec(1900));
        assert_eq!(brian.tuition.balance, dec(1900));
        // Brian rides the bus, so term 2's fare is now billed.
        assert_eq!(brian.transport.balance, dec(750));
        // Carol: 600 unpaid rolls into arrears, grade 1 bill lands.
        let carol = reloaded.account(3).unwrap();
        assert_eq!(carol.tuition.arrears, dec(600));
        assert_eq!(carol.tuition.balance, dec(1400));
    }

    /// Arrears-first settlement after a rollover: one payment clears the
    /// old debt before touching the new bill.
    #[test]
    fn test_payment_after_rollover_settles_arrears_first() {
        let mut engine = school();
        engine.set_clock(Box::new(FixedClock::new(date(2026, 4, 10))));
        engine.promote_all();
        engine.close_term().unwrap();

        engine.set_clock(Box::new(FixedClock::new(date(2026, 5, 10))));
        // Carol owes 600 arrears and 1400 for term 2.
        let record = engine
            .apply_payment(3, dec(800), 2, PaymentMethod::Mpesa, "QX99XYZ")
            .unwrap();

        let carol = engine.account(3).unwrap();
        assert_eq!(carol.tuition.arrears, Decimal::ZERO);
        assert_eq!(carol.tuition.balance, dec(1200));
        assert_eq!(record.balance_after, dec(1200));
    }

    /// Statement output is exact and sorted by student id.
    #[test]
    fn test_statement_output() {
        let mut engine = school();
        engine
            .apply_payment(1, dec(500), 1, PaymentMethod::Mpesa, "QX12ABC")
            .unwrap();
        engine.apply_bus_payment(2, dec(300)).unwrap();

        let accounts: Vec<_> = engine.accounts().into_iter().cloned().collect();
        let mut output = Vec::new();
        write_statement_csv(&accounts, &mut output).unwrap();

        let expected = "\
student,name,admission_no,grade,balance,arrears,prepayment,bus_balance,bus_arrears,bus_prepayment\n\
1,Amina Odhiambo,ADM-001,4,1000.00,0.00,0.00,0.00,0.00,0.00\n\
2,Brian Mwangi,ADM-002,4,1500.00,400.00,0.00,0.00,0.00,300.00\n\
3,Carol Njeri,ADM-003,pp2,1200.00,0.00,0.00,0.00,0.00,0.00\n";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    /// A fresh directory bootstraps an empty school that fills up through
    /// the same operations the CLI exposes.
    #[test]
    fn test_bootstrap_empty_directory() {
        let dir = TempDir::new().unwrap();
        let school_dir = SchoolDir::new(dir.path().join("school"));

        let mut engine = school_dir.load().unwrap();
        assert!(engine.accounts().is_empty());

        engine.set_clock(Box::new(FixedClock::new(date(2026, 1, 10))));
        engine
            .add_term(Term::new(1, "Term 1", date(2026, 1, 5), date(2026, 4, 3)))
            .unwrap();
        engine.set_fee(1, Grade::Baby, dec(800)).unwrap();
        engine
            .register_student("Wanjiku Kamau", "ADM-010", Grade::Baby, "", false, Decimal::ZERO)
            .unwrap();
        school_dir.store(&engine).unwrap();

        let reloaded = school_dir.load().unwrap();
        assert_eq!(reloaded.accounts().len(), 1);
        assert_eq!(reloaded.account(1).unwrap().tuition.balance, dec(800));
        assert!(dir.path().join("school").join("students.csv").exists());
    }

    /// Importing a day-file against a school with no active term is
    /// fatal: every record needs a term stamp, so nothing is applied.
    #[rstest]
    #[case::sync(StrategyType::Sync)]
    #[case::async_batch(StrategyType::Async)]
    fn test_import_without_active_term_is_fatal(#[case] strategy_type: StrategyType) {
        let mut engine = school();
        // Between terms: nothing is active.
        engine.set_clock(Box::new(FixedClock::new(date(2026, 4, 20))));

        let file = day_file("kind,student,amount,method,reference\nfee,1,500,cash,\n");
        let config = strategy_config(&strategy_type);
        let strategy = create_strategy(strategy_type, config);

        let err = strategy.import(&mut engine, file.path()).unwrap_err();

        assert!(matches!(err, BillingError::NoActiveTerm { .. }));
        assert_eq!(engine.account(1).unwrap().tuition.balance, dec(1500));
        assert!(engine.payments().is_empty());
    }
}

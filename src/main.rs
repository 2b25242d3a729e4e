//! Shule Ledger CLI
//!
//! Command-line interface for the school fee and transport ledgers. All
//! state lives in a directory of CSV files (the school directory); every
//! command loads it, acts, and writes it back.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --dir school import payments_day.csv
//! cargo run -- --dir school import --strategy sync payments_day.csv
//! cargo run -- --dir school pay 7 1500.50 2 --method mpesa --description QX12ABC
//! cargo run -- --dir school init-balances 2
//! cargo run -- --dir school --today 2026-04-04 close-term
//! cargo run -- --dir school statement > statement.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing directory, unknown student, no active term, etc.)

use shule_ledger::cli::{self, CliArgs, Command};
use shule_ledger::clock::FixedClock;
use shule_ledger::io::{write_statement_csv, SchoolDir};
use shule_ledger::strategy;
use shule_ledger::types::BillingError;
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), BillingError> {
    let dir = SchoolDir::new(&args.dir);
    let mut engine = dir.load()?;

    if let Some(today) = args.today {
        engine.set_clock(Box::new(FixedClock::new(today)));
    }

    match args.command {
        Command::Import(import) => {
            let config = if matches!(import.strategy, cli::StrategyType::Async) {
                Some(import.to_batch_config())
            } else {
                None
            };
            let strategy = strategy::create_strategy(import.strategy, config);

            let summary = strategy.import(&mut engine, &import.file)?;
            println!(
                "Imported {} events ({} skipped)",
                summary.applied, summary.skipped
            );
        }

        Command::CloseTerm => {
            let outcome = engine.close_term()?;
            println!(
                "Closed term {}, billed term {} for {} students",
                outcome.closed_term, outcome.next_term, outcome.students
            );
        }

        Command::Promote => {
            let promoted = engine.promote_all();
            println!("Promoted {} students", promoted);
        }

        Command::InitBalances { term } => {
            let billed = engine.initialize_balances(term)?;
            println!("Billed term {} fees for {} students", term, billed);
        }

        Command::Statement => {
            // Read-only: write to stdout and leave the directory alone.
            let accounts: Vec<_> = engine.accounts().into_iter().cloned().collect();
            let mut stdout = std::io::stdout();
            return write_statement_csv(&accounts, &mut stdout);
        }

        Command::Pay {
            student,
            amount,
            term,
            method,
            description,
        } => {
            let record = engine.apply_payment(student, amount, term, method, &description)?;
            println!(
                "Receipt {}: {} paid {:.2} ({}) toward term {}, balance now {:.2}",
                record.id, student, record.amount, record.method, record.term, record.balance_after
            );
        }

        Command::PayBus { student, amount } => {
            let record = engine.apply_bus_payment(student, amount)?;
            println!(
                "Bus receipt {}: {} paid {:.2} for destination {}, balance now {:.2}",
                record.id, student, record.amount, record.destination, record.balance_after
            );
        }

        Command::Register {
            name,
            admission_no,
            grade,
            phone,
            boarding,
            arrears,
        } => {
            let account =
                engine.register_student(&name, &admission_no, grade, &phone, boarding, arrears)?;
            println!(
                "Registered {} ({}) as student {}",
                name, admission_no, account.id
            );
        }

        Command::AssignBus {
            student,
            destination,
        } => {
            engine.assign_destination(student, destination)?;
            println!("Assigned student {} to destination {}", student, destination);
        }

        Command::SetFee {
            term,
            grade,
            amount,
        } => {
            engine.set_fee(term, grade, amount)?;
            println!("Set term {} fee for grade {} to {:.2}", term, grade, amount);
        }

        Command::NewTerm {
            id,
            name,
            start,
            end,
        } => {
            engine.add_term(shule_ledger::types::Term::new(id, &name, start, end))?;
            println!("Added term {} ({} to {})", id, start, end);
        }
    }

    dir.store(&engine)
}

use crate::strategy::BatchConfig;
use crate::types::{DestinationId, Grade, PaymentMethod, StudentId, TermId};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Manage school fee and transport ledgers
#[derive(Parser, Debug)]
#[command(name = "shule-ledger")]
#[command(about = "Manage school fee and transport ledgers", long_about = None)]
pub struct CliArgs {
    /// School directory holding the CSV files
    #[arg(
        long = "dir",
        value_name = "DIR",
        default_value = "school",
        global = true,
        help = "Path to the school directory"
    )]
    pub dir: PathBuf,

    /// Override today's date (YYYY-MM-DD)
    #[arg(
        long = "today",
        value_name = "DATE",
        global = true,
        help = "Override today's date, e.g. for a backdated term close"
    )]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available import strategies for day-file processing
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a day-file of payment events
    Import(ImportArgs),

    /// Close the active term and roll every ledger forward
    CloseTerm,

    /// Promote every student one grade up the ladder
    Promote,

    /// Charge term fees to every student's ledgers
    InitBalances {
        /// Term to initialize balances for
        #[arg(value_name = "TERM")]
        term: TermId,
    },

    /// Write a balance statement for the whole roster to stdout
    Statement,

    /// Record a single fee payment
    Pay {
        /// Student id
        #[arg(value_name = "STUDENT")]
        student: StudentId,

        /// Amount paid
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,

        /// Term the payment settles against
        #[arg(value_name = "TERM")]
        term: TermId,

        /// Payment method (cash, mpesa, bank, cheque)
        #[arg(long = "method", value_name = "METHOD", default_value = "cash")]
        method: PaymentMethod,

        /// Receipt reference or note
        #[arg(long = "description", value_name = "TEXT", default_value = "")]
        description: String,
    },

    /// Record a single bus fare payment
    PayBus {
        /// Student id
        #[arg(value_name = "STUDENT")]
        student: StudentId,

        /// Amount paid
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },

    /// Register a new student
    Register {
        /// Full name
        #[arg(value_name = "NAME")]
        name: String,

        /// Admission number
        #[arg(value_name = "ADMISSION_NO")]
        admission_no: String,

        /// Grade (baby, pp1, pp2, 1-9)
        #[arg(value_name = "GRADE")]
        grade: Grade,

        /// Guardian phone number
        #[arg(long = "phone", value_name = "PHONE", default_value = "")]
        phone: String,

        /// Register as a boarder
        #[arg(long = "boarding")]
        boarding: bool,

        /// Opening arrears carried in from outside the system
        #[arg(long = "arrears", value_name = "AMOUNT", default_value = "0")]
        arrears: Decimal,
    },

    /// Assign a student to a bus destination
    AssignBus {
        /// Student id
        #[arg(value_name = "STUDENT")]
        student: StudentId,

        /// Destination id
        #[arg(value_name = "DESTINATION")]
        destination: DestinationId,
    },

    /// Set the tuition fee for a grade in a term
    SetFee {
        /// Term id
        #[arg(value_name = "TERM")]
        term: TermId,

        /// Grade (baby, pp1, pp2, 1-9)
        #[arg(value_name = "GRADE")]
        grade: Grade,

        /// Fee amount
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },

    /// Add a term to the calendar
    NewTerm {
        /// Term id
        #[arg(value_name = "ID")]
        id: TermId,

        /// Display name, e.g. "Term 1 2026"
        #[arg(value_name = "NAME")]
        name: String,

        /// First day of the term (YYYY-MM-DD)
        #[arg(value_name = "START")]
        start: NaiveDate,

        /// Last day of the term (YYYY-MM-DD)
        #[arg(value_name = "END")]
        end: NaiveDate,
    },
}

/// Arguments for the `import` subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Day-file CSV of payment events
    #[arg(value_name = "FILE", help = "Path to the day-file CSV")]
    pub file: PathBuf,

    /// Import strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Import strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of events per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of events per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent batches (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of batches processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

impl ImportArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Constructs a BatchConfig using the CLI arguments if provided, or
    /// falls back to default values. Validation warnings for zero values
    /// are printed to stderr by BatchConfig itself.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}

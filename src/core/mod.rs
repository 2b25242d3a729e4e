//! Core business logic module
//!
//! This module contains the billing components:
//! - `engine` - Billing orchestration over all stores
//! - `roster` - Student account storage
//! - `terms` - The term calendar
//! - `schedule` - Tuition fees, transport charges and the boarding surcharge
//! - `payment_log` - Append-only payment audit logs
//! - `rollover` - Whole-roster term close and grade promotion
//! - `async` - Concurrent account map and applier for bulk import

pub mod r#async;
pub mod engine;
pub mod payment_log;
pub mod rollover;
pub mod roster;
pub mod schedule;
pub mod terms;

pub use engine::BillingEngine;
pub use payment_log::{BusPaymentLog, PaymentLog};
pub use r#async::{AsyncBillingEngine, AsyncRoster};
pub use rollover::RolloverOutcome;
pub use roster::Roster;
pub use schedule::FeeBook;
pub use terms::TermCalendar;

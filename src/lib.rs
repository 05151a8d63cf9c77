//! # Card Gate
//!
//! A card validation and authorization decision engine for two purchase
//! flows: immediate payment and purchase on credit.
//!
//! ## Design Principles
//!
//! - **Per-field reporting**: every offending form field gets its own outcome
//! - **Injected policy**: card pools, reference clock and store are passed in
//! - **Exactly-once recording**: a record is written only for settled purchases
//! - **Last write wins**: the store keeps the latest outcome per purchase kind
//!
//! ## Example
//!
//! ```
//! use card_gate::{AuthStatus, CardPools, CardSubmission, DecisionEngine, FixedClock, MemoryStore, PurchaseKind};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//! let engine = DecisionEngine::new(
//!     CardPools::demo(),
//!     Box::new(FixedClock::at_date(today)),
//!     Box::new(MemoryStore::new()),
//! );
//!
//! let card = CardSubmission::new("4444444444444441", "12", "27", "Ivan Petrov", "123");
//! let decision = engine.submit(PurchaseKind::Payment, &card).unwrap();
//!
//! assert_eq!(decision.status(), Some(AuthStatus::Approved));
//! assert_eq!(engine.status(PurchaseKind::Payment).unwrap(), Some(AuthStatus::Approved));
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod money;
pub mod recorder;
pub mod submission;
pub mod validation;

pub use classifier::{AuthStatus, Authorization, CardPools};
pub use config::GateConfig;
pub use engine::{Decision, DecisionEngine, RejectReason, Rejection};
pub use error::{ConfigError, GateError, Result, StoreError};
pub use expiry::{Clock, FixedClock, SystemClock};
pub use money::Money;
pub use recorder::{CsvFileStore, MemoryStore, StatusStore, TransactionRecord};
pub use submission::{CardSubmission, PurchaseKind};
pub use validation::{Field, FieldReport, ValidCard, ValidationError, ValidationOutcome};

//! Card decision engine.
//!
//! Runs a submission through the field validators, the expiry check and the
//! simulated card network, then records settled outcomes. Each submission is
//! evaluated exactly once; a record is written only when the submission
//! settles as APPROVED or DECLINED.

use crate::classifier::{AuthStatus, CardPools};
use crate::config::GateConfig;
use crate::error::{GateError, Result};
use crate::expiry::{evaluate_expiry, Clock};
use crate::money::Money;
use crate::recorder::{StatusStore, TransactionRecord};
use crate::submission::{CardSubmission, PurchaseKind, SubmissionRecord};
use crate::validation::{
    validate_submission, Field, FieldReport, ValidationOutcome, DEFAULT_MAX_YEARS_AHEAD,
};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::io::{Read, Write};

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// At least one field failed its own checks.
    InvalidFields,
    /// Every field passed, but the card expired before the reference date.
    CardExpired,
    /// The card number is well formed but unknown to the card network.
    UnknownCard,
}

/// A submission that never reached authorization, or was not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub report: FieldReport,
    /// Set when every field was left empty.
    pub all_required: bool,
    pub reason: RejectReason,
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Rejected(Rejection),
    Settled { status: AuthStatus },
}

impl Decision {
    pub fn is_settled(&self) -> bool {
        matches!(self, Decision::Settled { .. })
    }

    pub fn status(&self) -> Option<AuthStatus> {
        match self {
            Decision::Settled { status } => Some(*status),
            Decision::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Rejected(rejection) => Some(rejection),
            Decision::Settled { .. } => None,
        }
    }

    /// Short machine-readable summary used in CSV output.
    pub fn code(&self) -> &'static str {
        match self {
            Decision::Settled { .. } => "settled",
            Decision::Rejected(r) if r.all_required => "all_required",
            Decision::Rejected(r) => match r.reason {
                RejectReason::InvalidFields => "rejected",
                RejectReason::CardExpired => "expired",
                RejectReason::UnknownCard => "unknown_card",
            },
        }
    }
}

/// The card decision engine.
///
/// Holds the card pools, the clock and the status store. Everything except
/// the store is immutable, so the engine can be shared across threads.
pub struct DecisionEngine {
    pools: CardPools,
    clock: Box<dyn Clock>,
    store: Box<dyn StatusStore>,
    price: Money,
    max_years_ahead: u8,
}

impl DecisionEngine {
    /// Creates an engine with the default price and expiry horizon.
    pub fn new(pools: CardPools, clock: Box<dyn Clock>, store: Box<dyn StatusStore>) -> Self {
        DecisionEngine {
            pools,
            clock,
            store,
            price: GateConfig::default().price,
            max_years_ahead: DEFAULT_MAX_YEARS_AHEAD,
        }
    }

    /// Creates an engine wired as described by `config`.
    pub fn from_config(pools: CardPools, config: &GateConfig) -> Self {
        DecisionEngine {
            pools,
            clock: config.clock(),
            store: config.store(),
            price: config.price,
            max_years_ahead: config.max_years_ahead,
        }
    }

    /// Evaluates one submission and records it if it settles.
    ///
    /// Only a store failure is returned as an error; in that case the
    /// submission did not settle.
    pub fn submit(&self, kind: PurchaseKind, submission: &CardSubmission) -> Result<Decision> {
        let decision = self.decide(submission);

        match &decision {
            Decision::Settled { status } => {
                let record = TransactionRecord {
                    kind,
                    status: *status,
                    amount: self.price,
                    timestamp: self.clock.now(),
                };
                self.store.record(record)?;
                info!(
                    "{} with card {} settled as {}",
                    kind,
                    submission.masked_number(),
                    status
                );
            }
            Decision::Rejected(rejection) => {
                debug!(
                    "{} with card {} rejected: {}",
                    kind,
                    submission.masked_number(),
                    decision.code()
                );
                for error in rejection.report.errors() {
                    debug!("  {}", error);
                }
            }
        }

        Ok(decision)
    }

    /// Pure decision for one submission; never touches the store.
    fn decide(&self, submission: &CardSubmission) -> Decision {
        let today = self.clock.today();
        let card = match validate_submission(submission, today, self.max_years_ahead) {
            Ok(card) => card,
            Err(report) => {
                return Decision::Rejected(Rejection {
                    all_required: all_fields_required(&report),
                    report,
                    reason: RejectReason::InvalidFields,
                })
            }
        };

        let expiry = evaluate_expiry(card.expiry_month, card.expiry_year, today);
        if !expiry.is_valid() {
            return Decision::Rejected(Rejection {
                report: FieldReport {
                    month: expiry,
                    ..FieldReport::all_valid()
                },
                all_required: false,
                reason: RejectReason::CardExpired,
            });
        }

        match self.pools.classify(card.number).status() {
            Some(status) => Decision::Settled { status },
            None => {
                warn!(
                    "Card {} is not known to the card network",
                    submission.masked_number()
                );
                Decision::Rejected(Rejection {
                    report: FieldReport::all_valid(),
                    all_required: false,
                    reason: RejectReason::UnknownCard,
                })
            }
        }
    }

    /// Status of the latest settled purchase of `kind`, or `None`.
    pub fn status(&self, kind: PurchaseKind) -> Result<Option<AuthStatus>> {
        Ok(self.record(kind)?.map(|record| record.status))
    }

    /// The latest settled record of `kind`, or `None`.
    pub fn record(&self, kind: PurchaseKind) -> Result<Option<TransactionRecord>> {
        Ok(self.store.read(kind)?)
    }

    /// Clears every stored record.
    pub fn reset(&self) -> Result<()> {
        self.store.reset().map_err(GateError::from)
    }

    /// Processes submissions from a CSV reader in streaming fashion and
    /// writes one decision row per submission.
    ///
    /// Rows that cannot be parsed are logged at warn level and skipped.
    /// A store failure aborts the batch.
    pub fn process_csv<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "row", "kind", "decision", "status", "number", "month", "year", "holder", "cvc",
        ])?;

        for (row_idx, result) in csv_reader.deserialize::<SubmissionRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let (kind, submission) = match result {
                Ok(record) => match record.parse() {
                    Some(parsed) => parsed,
                    None => {
                        warn!("Row {}: Unknown purchase kind, skipping", row_num);
                        continue;
                    }
                },
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                    continue;
                }
            };

            let decision = self.submit(kind, &submission)?;
            let report = decision
                .rejection()
                .map(|r| r.report)
                .unwrap_or_else(FieldReport::all_valid);

            let mut row = vec![
                row_num.to_string(),
                kind.to_string(),
                decision.code().to_string(),
                decision.status().map(|s| s.to_string()).unwrap_or_default(),
            ];
            row.extend(
                Field::ALL
                    .iter()
                    .map(|field| report.get(*field).code().to_string()),
            );
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Every field came back Required, i.e. the form was submitted empty.
fn all_fields_required(report: &FieldReport) -> bool {
    Field::ALL
        .iter()
        .all(|field| report.get(*field) == ValidationOutcome::Required)
}

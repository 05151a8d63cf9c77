//! Card submission models for CSV parsing and engine input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The purchase flow a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseKind {
    /// Immediate payment by card.
    Payment,

    /// Purchase on credit, with the card used as the credit account.
    Credit,
}

impl PurchaseKind {
    /// Every kind, in store order.
    pub const ALL: [PurchaseKind; 2] = [PurchaseKind::Payment, PurchaseKind::Credit];

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseKind::Payment => "PAYMENT",
            PurchaseKind::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for PurchaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payment" => Ok(PurchaseKind::Payment),
            "credit" => Ok(PurchaseKind::Credit),
            other => Err(format!("unknown purchase kind '{}'", other)),
        }
    }
}

/// One purchase attempt as typed into the card form.
///
/// Every field is untrusted text. `None` means the field was never set;
/// `Some("")` means it was set but left blank. Both count as missing for
/// required-field checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSubmission {
    pub number: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    pub holder: Option<String>,
    pub cvc: Option<String>,
}

impl CardSubmission {
    /// Creates a submission with every field set.
    pub fn new(
        number: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
        holder: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        CardSubmission {
            number: Some(number.into()),
            expiry_month: Some(expiry_month.into()),
            expiry_year: Some(expiry_year.into()),
            holder: Some(holder.into()),
            cvc: Some(cvc.into()),
        }
    }

    /// Creates a submission with no field set.
    pub fn empty() -> Self {
        CardSubmission::default()
    }

    pub fn with_number(self, number: Option<&str>) -> Self {
        CardSubmission {
            number: number.map(str::to_string),
            ..self
        }
    }

    pub fn with_month(self, month: Option<&str>) -> Self {
        CardSubmission {
            expiry_month: month.map(str::to_string),
            ..self
        }
    }

    pub fn with_year(self, year: Option<&str>) -> Self {
        CardSubmission {
            expiry_year: year.map(str::to_string),
            ..self
        }
    }

    pub fn with_holder(self, holder: Option<&str>) -> Self {
        CardSubmission {
            holder: holder.map(str::to_string),
            ..self
        }
    }

    pub fn with_cvc(self, cvc: Option<&str>) -> Self {
        CardSubmission {
            cvc: cvc.map(str::to_string),
            ..self
        }
    }

    /// Returns the card number with all but the last four digits masked.
    ///
    /// Used for logging; the full number never reaches the logs.
    pub fn masked_number(&self) -> String {
        match self.number.as_deref() {
            Some(number) if number.chars().count() > 4 => {
                let tail: String = number
                    .chars()
                    .skip(number.chars().count() - 4)
                    .collect();
                format!("****{}", tail)
            }
            Some(number) => number.to_string(),
            None => "<none>".to_string(),
        }
    }
}

/// Raw submission row as read from CSV.
#[derive(Debug, Deserialize)]
pub struct SubmissionRecord {
    /// Purchase kind: payment or credit
    pub kind: String,

    pub number: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub holder: Option<String>,
    pub cvc: Option<String>,
}

impl SubmissionRecord {
    /// Parses the raw CSV row into a purchase kind and card submission.
    ///
    /// Returns `None` if the purchase kind is not recognized. Field values
    /// are passed through untouched; validating them is the engine's job.
    pub fn parse(self) -> Option<(PurchaseKind, CardSubmission)> {
        let kind = PurchaseKind::from_str(&self.kind).ok()?;
        Some((
            kind,
            CardSubmission {
                number: self.number,
                expiry_month: self.month,
                expiry_year: self.year,
                holder: self.holder,
                cvc: self.cvc,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_row() {
        let record = SubmissionRecord {
            kind: "payment".to_string(),
            number: Some("4444444444444441".to_string()),
            month: Some("08".to_string()),
            year: Some("27".to_string()),
            holder: Some("Ivan Petrov".to_string()),
            cvc: Some("123".to_string()),
        };

        let (kind, submission) = record.parse().unwrap();
        assert_eq!(kind, PurchaseKind::Payment);
        assert_eq!(submission.expiry_month.as_deref(), Some("08"));
        assert_eq!(submission.holder.as_deref(), Some("Ivan Petrov"));
    }

    #[test]
    fn test_parse_handles_case_and_whitespace_in_kind() {
        let record = SubmissionRecord {
            kind: "  CREDIT ".to_string(),
            number: None,
            month: None,
            year: None,
            holder: None,
            cvc: None,
        };

        let (kind, submission) = record.parse().unwrap();
        assert_eq!(kind, PurchaseKind::Credit);
        assert_eq!(submission, CardSubmission::empty());
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let record = SubmissionRecord {
            kind: "refund".to_string(),
            number: None,
            month: None,
            year: None,
            holder: None,
            cvc: None,
        };

        assert!(record.parse().is_none());
    }

    #[test]
    fn test_builders_distinguish_unset_and_blank() {
        let base = CardSubmission::new("4444444444444441", "08", "27", "Ivan Petrov", "123");

        assert_eq!(base.clone().with_cvc(None).cvc, None);
        assert_eq!(base.with_cvc(Some("")).cvc.as_deref(), Some(""));
    }

    #[test]
    fn test_masked_number() {
        let submission = CardSubmission::empty().with_number(Some("4444444444444441"));
        assert_eq!(submission.masked_number(), "****4441");
        assert_eq!(CardSubmission::empty().masked_number(), "<none>");
        assert_eq!(
            CardSubmission::empty().with_number(Some("12")).masked_number(),
            "12"
        );
    }
}

//! Per-field checks for the card form.
//!
//! Each validator looks at one optional field value and returns exactly one
//! [`ValidationOutcome`]. Validators never look at other fields, so every
//! offending field of a submission is reported on its own.

use crate::submission::CardSubmission;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Holder names longer than this are rejected.
pub const MAX_HOLDER_LEN: usize = 100;

/// Default number of years ahead of today an expiry year may lie.
pub const DEFAULT_MAX_YEARS_AHEAD: u8 = 5;

/// Result of checking a single form field.
///
/// Variants are declared in priority order: when a value breaks several
/// rules of one field, the earliest variant is the one reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    Valid,
    Required,
    InvalidFormat,
    InvalidName,
    InvalidValue,
    TooLong,
    TooShort,
    Expired,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Short machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "valid",
            ValidationOutcome::Required => "required",
            ValidationOutcome::InvalidFormat => "invalid_format",
            ValidationOutcome::InvalidName => "invalid_name",
            ValidationOutcome::InvalidValue => "invalid_value",
            ValidationOutcome::TooLong => "too_long",
            ValidationOutcome::TooShort => "too_short",
            ValidationOutcome::Expired => "expired",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Identifies one field of the card form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Number,
    Month,
    Year,
    Holder,
    Cvc,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 5] = [
        Field::Number,
        Field::Month,
        Field::Year,
        Field::Holder,
        Field::Cvc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Number => "number",
            Field::Month => "month",
            Field::Year => "year",
            Field::Holder => "holder",
            Field::Cvc => "cvc",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed check on one field, with the message shown under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub outcome: ValidationOutcome,
}

impl ValidationError {
    /// The message the form shows under the offending field.
    pub fn message(&self) -> &'static str {
        match (self.field, self.outcome) {
            (_, ValidationOutcome::Valid) => "",
            (_, ValidationOutcome::Required) => "Field is required",
            (Field::Month | Field::Year, ValidationOutcome::InvalidFormat)
            | (Field::Month | Field::Year, ValidationOutcome::InvalidValue) => {
                "Card expiry date is invalid"
            }
            (_, ValidationOutcome::InvalidFormat) => "Invalid format",
            (_, ValidationOutcome::InvalidName) => "Enter both given name and family name",
            (Field::Cvc, ValidationOutcome::InvalidValue) => "Value must be exactly 3 digits",
            (_, ValidationOutcome::InvalidValue) => "Value may contain only letters and hyphens",
            (_, ValidationOutcome::TooLong) => "Value may not exceed 100 characters",
            (_, ValidationOutcome::TooShort) => "Value must contain more than one letter",
            (_, ValidationOutcome::Expired) => "Card has expired",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of every field of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReport {
    pub number: ValidationOutcome,
    pub month: ValidationOutcome,
    pub year: ValidationOutcome,
    pub holder: ValidationOutcome,
    pub cvc: ValidationOutcome,
}

impl FieldReport {
    /// A report with every field valid.
    pub fn all_valid() -> Self {
        FieldReport {
            number: ValidationOutcome::Valid,
            month: ValidationOutcome::Valid,
            year: ValidationOutcome::Valid,
            holder: ValidationOutcome::Valid,
            cvc: ValidationOutcome::Valid,
        }
    }

    pub fn get(&self, field: Field) -> ValidationOutcome {
        match field {
            Field::Number => self.number,
            Field::Month => self.month,
            Field::Year => self.year,
            Field::Holder => self.holder,
            Field::Cvc => self.cvc,
        }
    }

    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_valid())
    }

    /// Failed fields in form order.
    pub fn errors(&self) -> Vec<ValidationError> {
        Field::ALL
            .iter()
            .map(|field| ValidationError {
                field: *field,
                outcome: self.get(*field),
            })
            .filter(|error| !error.outcome.is_valid())
            .collect()
    }
}

/// The fields of a submission that passed every validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidCard<'a> {
    pub number: &'a str,
    pub expiry_month: &'a str,
    pub expiry_year: &'a str,
}

/// Runs every field validator against a submission.
///
/// Returns the validated card fields, or the report of every field when
/// at least one of them failed.
pub fn validate_submission(
    submission: &CardSubmission,
    today: NaiveDate,
    max_years_ahead: u8,
) -> std::result::Result<ValidCard<'_>, FieldReport> {
    let number = submission.number.as_deref();
    let month = submission.expiry_month.as_deref();
    let year = submission.expiry_year.as_deref();

    let report = FieldReport {
        number: validate_number(number),
        month: validate_month(month),
        year: validate_year(year, today, max_years_ahead),
        holder: validate_holder(submission.holder.as_deref()),
        cvc: validate_cvc(submission.cvc.as_deref()),
    };

    match (number, month, year) {
        (Some(number), Some(expiry_month), Some(expiry_year)) if report.is_valid() => {
            Ok(ValidCard {
                number,
                expiry_month,
                expiry_year,
            })
        }
        _ => Err(report),
    }
}

/// Returns `true` if the value is unset or blank.
pub fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Card number: exactly 16 digits, no separators.
pub fn validate_number(value: Option<&str>) -> ValidationOutcome {
    match value {
        _ if is_missing(value) => ValidationOutcome::Required,
        Some(number) if is_digits(number, 16) => ValidationOutcome::Valid,
        _ => ValidationOutcome::InvalidFormat,
    }
}

/// Expiry month: two digits in `01..=12`.
pub fn validate_month(value: Option<&str>) -> ValidationOutcome {
    let month = match value {
        _ if is_missing(value) => return ValidationOutcome::Required,
        Some(month) if is_digits(month, 2) => month,
        _ => return ValidationOutcome::InvalidFormat,
    };

    match month.parse::<u32>() {
        Ok(1..=12) => ValidationOutcome::Valid,
        _ => ValidationOutcome::InvalidValue,
    }
}

/// Expiry year: two digits of a 21st century year, no earlier than the
/// reference year and at most `max_years_ahead` after it.
pub fn validate_year(
    value: Option<&str>,
    today: NaiveDate,
    max_years_ahead: u8,
) -> ValidationOutcome {
    let year = match value {
        _ if is_missing(value) => return ValidationOutcome::Required,
        Some(year) if is_digits(year, 2) => year,
        _ => return ValidationOutcome::InvalidFormat,
    };

    let year = match year.parse::<i32>() {
        Ok(short) => 2000 + short,
        Err(_) => return ValidationOutcome::InvalidFormat,
    };

    if year < today.year() {
        ValidationOutcome::Expired
    } else if year > today.year() + i32::from(max_years_ahead) {
        ValidationOutcome::InvalidValue
    } else {
        ValidationOutcome::Valid
    }
}

fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (c.is_alphabetic() && matches!(c, '\u{0400}'..='\u{04FF}'))
}

/// Cardholder name: given name and family name in Latin or Cyrillic letters.
///
/// Latin means ASCII `A-Z`/`a-z`; accented Latin letters are rejected.
pub fn validate_holder(value: Option<&str>) -> ValidationOutcome {
    let name = match value {
        None | Some("") => return ValidationOutcome::Required,
        Some(name) => name.trim(),
    };

    if name.is_empty() {
        return ValidationOutcome::InvalidValue;
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    let has_empty_part = tokens
        .iter()
        .any(|token| token.split('-').any(|part| part.is_empty()));

    if has_empty_part || (tokens.len() == 1 && tokens[0].contains('-')) {
        return ValidationOutcome::InvalidFormat;
    }
    if tokens.len() == 1 {
        return ValidationOutcome::InvalidName;
    }
    if !name
        .chars()
        .all(|c| is_name_letter(c) || c == '-' || c.is_whitespace())
    {
        return ValidationOutcome::InvalidValue;
    }
    if name.chars().count() > MAX_HOLDER_LEN {
        return ValidationOutcome::TooLong;
    }

    let has_single_letter = tokens
        .iter()
        .flat_map(|token| token.split('-'))
        .any(|part| part.chars().count() == 1);

    if has_single_letter {
        ValidationOutcome::TooShort
    } else {
        ValidationOutcome::Valid
    }
}

/// CVC: exactly three digits.
pub fn validate_cvc(value: Option<&str>) -> ValidationOutcome {
    match value {
        _ if is_missing(value) => ValidationOutcome::Required,
        Some(cvc) if !cvc.bytes().all(|b| b.is_ascii_digit()) => ValidationOutcome::InvalidFormat,
        Some(cvc) if cvc.len() == 3 => ValidationOutcome::Valid,
        _ => ValidationOutcome::InvalidValue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 15).unwrap()
    }

    #[test]
    fn test_number_rules() {
        assert_eq!(validate_number(Some("4444444444444441")), ValidationOutcome::Valid);
        assert_eq!(validate_number(None), ValidationOutcome::Required);
        assert_eq!(validate_number(Some("   ")), ValidationOutcome::Required);
        assert_eq!(validate_number(Some("444444444444444")), ValidationOutcome::InvalidFormat);
        assert_eq!(
            validate_number(Some("4444 4444 4444 4441")),
            ValidationOutcome::InvalidFormat
        );
        assert_eq!(
            validate_number(Some("44444444444444412")),
            ValidationOutcome::InvalidFormat
        );
    }

    #[test]
    fn test_month_rules() {
        assert_eq!(validate_month(Some("01")), ValidationOutcome::Valid);
        assert_eq!(validate_month(Some("12")), ValidationOutcome::Valid);
        assert_eq!(validate_month(Some("00")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_month(Some("13")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_month(Some("1")), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_month(Some("ab")), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_month(Some("")), ValidationOutcome::Required);
        assert_eq!(validate_month(None), ValidationOutcome::Required);
    }

    #[test]
    fn test_year_rules() {
        assert_eq!(validate_year(Some("26"), today(), 5), ValidationOutcome::Valid);
        assert_eq!(validate_year(Some("31"), today(), 5), ValidationOutcome::Valid);
        assert_eq!(validate_year(Some("25"), today(), 5), ValidationOutcome::Expired);
        assert_eq!(validate_year(Some("32"), today(), 5), ValidationOutcome::InvalidValue);
        assert_eq!(validate_year(Some("2027"), today(), 5), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_year(None, today(), 5), ValidationOutcome::Required);
    }

    #[test]
    fn test_holder_accepts_latin_and_cyrillic() {
        assert_eq!(validate_holder(Some("Ivan Petrov")), ValidationOutcome::Valid);
        assert_eq!(validate_holder(Some("Иван Петров")), ValidationOutcome::Valid);
        assert_eq!(
            validate_holder(Some("Anna Rimsky-Korsakova")),
            ValidationOutcome::Valid
        );
    }

    #[test]
    fn test_holder_rules() {
        assert_eq!(validate_holder(None), ValidationOutcome::Required);
        assert_eq!(validate_holder(Some("")), ValidationOutcome::Required);
        assert_eq!(validate_holder(Some(" ")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_holder(Some("Ivan")), ValidationOutcome::InvalidName);
        assert_eq!(validate_holder(Some("Иван-Иванов")), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_holder(Some("Ivan- Petrov")), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_holder(Some("Ivan2 Petrov")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_holder(Some("I Petrov")), ValidationOutcome::TooShort);

        let long = format!("Ivan {}", "P".repeat(100));
        assert_eq!(validate_holder(Some(&long)), ValidationOutcome::TooLong);
    }

    #[test]
    fn test_holder_length_boundary() {
        let at_limit = format!("Ivan {}", "P".repeat(95));
        assert_eq!(at_limit.chars().count(), MAX_HOLDER_LEN);
        assert_eq!(validate_holder(Some(&at_limit)), ValidationOutcome::Valid);

        let over_limit = format!("Ivan {}", "P".repeat(96));
        assert_eq!(validate_holder(Some(&over_limit)), ValidationOutcome::TooLong);

        let cyrillic_at_limit = format!("Иван {}", "П".repeat(95));
        assert_eq!(
            validate_holder(Some(&cyrillic_at_limit)),
            ValidationOutcome::Valid
        );
    }

    #[test]
    fn test_holder_rejects_cyrillic_block_symbols() {
        assert_eq!(validate_holder(Some("Иван Пет\u{482}ров")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_holder(Some("Иван Пет\u{483}ров")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_holder(Some("Ivan Petrov\u{488}")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_holder(Some("Алёна Ёлкина")), ValidationOutcome::Valid);
        assert_eq!(validate_holder(Some("José García")), ValidationOutcome::InvalidValue);
    }

    #[test]
    fn test_cvc_rules() {
        assert_eq!(validate_cvc(Some("123")), ValidationOutcome::Valid);
        assert_eq!(validate_cvc(Some("1")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_cvc(Some("12")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_cvc(Some("1234")), ValidationOutcome::InvalidValue);
        assert_eq!(validate_cvc(Some("1a3")), ValidationOutcome::InvalidFormat);
        assert_eq!(validate_cvc(None), ValidationOutcome::Required);
    }

    #[test]
    fn test_report_lists_every_failed_field() {
        let submission = CardSubmission::new("123", "13", "26", "Ivan", "12");
        let report = validate_submission(&submission, today(), 5).unwrap_err();

        let failed: Vec<Field> = report.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            failed,
            vec![Field::Number, Field::Month, Field::Holder, Field::Cvc]
        );
        assert!(!report.is_valid());
        assert!(FieldReport::all_valid().is_valid());
    }

    #[test]
    fn test_valid_submission_hands_back_card_fields() {
        let submission = CardSubmission::new("4444444444444441", "08", "27", "Ivan Petrov", "123");
        let card = validate_submission(&submission, today(), 5).unwrap();

        assert_eq!(card.number, "4444444444444441");
        assert_eq!(card.expiry_month, "08");
        assert_eq!(card.expiry_year, "27");
    }

    #[test]
    fn test_error_messages() {
        let error = ValidationError {
            field: Field::Month,
            outcome: ValidationOutcome::InvalidValue,
        };
        assert_eq!(error.message(), "Card expiry date is invalid");
        assert_eq!(error.to_string(), "month: Card expiry date is invalid");

        let error = ValidationError {
            field: Field::Cvc,
            outcome: ValidationOutcome::InvalidValue,
        };
        assert_eq!(error.message(), "Value must be exactly 3 digits");
    }
}

//! Card expiry evaluation against an injected reference date.

use crate::validation::ValidationOutcome;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

/// Source of the reference date and record timestamps.
///
/// The engine never reads the system clock directly, so date-dependent
/// decisions can be replayed with a [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Current instant, used to timestamp transaction records.
    fn now(&self) -> DateTime<Utc>;

    /// Reference date for expiry checks.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock(now)
    }

    /// A clock frozen at midnight UTC of the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        FixedClock(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Last calendar day on which a card expiring in `month`/`year` is usable.
///
/// Returns `None` for a month outside `1..=12`.
pub fn last_valid_day(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Decides whether a card with the given two-digit expiry has expired.
///
/// Both values must already have passed the month and year validators.
/// Anything that still fails to parse is reported as `InvalidValue`.
pub fn evaluate_expiry(month: &str, year: &str, today: NaiveDate) -> ValidationOutcome {
    let (Ok(month), Ok(short_year)) = (month.parse::<u32>(), year.parse::<i32>()) else {
        return ValidationOutcome::InvalidValue;
    };

    match last_valid_day(2000 + short_year, month) {
        Some(last_day) if last_day < today => ValidationOutcome::Expired,
        Some(_) => ValidationOutcome::Valid,
        None => ValidationOutcome::InvalidValue,
    }
}

/// Returns the two-digit month and year of a date, as typed into the form.
pub fn form_month_year(date: NaiveDate) -> (String, String) {
    (
        format!("{:02}", date.month()),
        format!("{:02}", date.year() % 100),
    )
}

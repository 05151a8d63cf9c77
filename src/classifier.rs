//! Simulated card network: decides APPROVED / DECLINED from card pools.

use crate::error::{GateError, Result};
use crate::validation::{validate_number, ValidationOutcome};
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Sandbox card that the network always approves.
pub const DEMO_APPROVED_NUMBER: &str = "4444444444444441";

/// Sandbox card that the network always declines.
pub const DEMO_DECLINED_NUMBER: &str = "4444444444444442";

/// Final authorization status of a settled purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthStatus {
    Approved,
    Declined,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Approved => "APPROVED",
            AuthStatus::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APPROVED" => Ok(AuthStatus::Approved),
            "DECLINED" => Ok(AuthStatus::Declined),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Answer of the simulated network for one card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Approved,
    Declined,
    /// The number is well formed but belongs to neither pool.
    Unknown,
}

impl Authorization {
    /// The settled status, or `None` for an unknown card.
    pub fn status(&self) -> Option<AuthStatus> {
        match self {
            Authorization::Approved => Some(AuthStatus::Approved),
            Authorization::Declined => Some(AuthStatus::Declined),
            Authorization::Unknown => None,
        }
    }
}

/// Card pool row as read from CSV.
#[derive(Debug, Deserialize)]
struct PoolRecord {
    number: String,
    status: String,
}

/// The approved and declined card number pools.
///
/// Pools are disjoint and immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CardPools {
    approved: HashSet<String>,
    declined: HashSet<String>,
}

impl CardPools {
    /// Builds pools from explicit number lists.
    ///
    /// Fails if a number is malformed or appears in both pools.
    pub fn new<A, D>(approved: A, declined: D) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut pools = CardPools::default();
        for (idx, number) in approved.into_iter().enumerate() {
            pools.insert(number.into(), AuthStatus::Approved, idx + 1)?;
        }
        for (idx, number) in declined.into_iter().enumerate() {
            pools.insert(number.into(), AuthStatus::Declined, idx + 1)?;
        }
        Ok(pools)
    }

    /// Pools holding only the two sandbox numbers.
    pub fn demo() -> Self {
        CardPools {
            approved: HashSet::from([DEMO_APPROVED_NUMBER.to_string()]),
            declined: HashSet::from([DEMO_DECLINED_NUMBER.to_string()]),
        }
    }

    /// Loads pools from CSV with a `number,status` header.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut pools = CardPools::default();

        for (row_idx, result) in csv_reader.deserialize::<PoolRecord>().enumerate() {
            let row = row_idx + 2; // 1-indexed, accounting for header row
            let record = result?;
            let status = AuthStatus::from_str(&record.status)
                .map_err(|message| GateError::InvalidPoolEntry { row, message })?;
            pools.insert(record.number, status, row)?;
        }

        debug!(
            "Loaded card pools: {} approved, {} declined",
            pools.approved.len(),
            pools.declined.len()
        );
        Ok(pools)
    }

    fn insert(&mut self, number: String, status: AuthStatus, row: usize) -> Result<()> {
        if validate_number(Some(&number)) != ValidationOutcome::Valid {
            return Err(GateError::InvalidPoolEntry {
                row,
                message: format!("'{}' is not a 16-digit card number", number),
            });
        }

        let (own, other) = match status {
            AuthStatus::Approved => (&mut self.approved, &self.declined),
            AuthStatus::Declined => (&mut self.declined, &self.approved),
        };
        if other.contains(&number) {
            return Err(GateError::InvalidPoolEntry {
                row,
                message: format!("card {} is listed as both approved and declined", number),
            });
        }
        own.insert(number);
        Ok(())
    }

    pub fn approved_count(&self) -> usize {
        self.approved.len()
    }

    pub fn declined_count(&self) -> usize {
        self.declined.len()
    }

    /// Classifies a shape-valid card number.
    pub fn classify(&self, number: &str) -> Authorization {
        if self.approved.contains(number) {
            Authorization::Approved
        } else if self.declined.contains(number) {
            Authorization::Declined
        } else {
            Authorization::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_demo_pools() {
        let pools = CardPools::demo();
        assert_eq!(pools.classify(DEMO_APPROVED_NUMBER), Authorization::Approved);
        assert_eq!(pools.classify(DEMO_DECLINED_NUMBER), Authorization::Declined);
        assert_eq!(pools.classify("4444444444444443"), Authorization::Unknown);
    }

    #[test]
    fn test_from_csv() {
        let csv = r#"number,status
4444444444444441, APPROVED
5555555555555551,approved
4444444444444442,DECLINED"#;

        let pools = CardPools::from_csv(Cursor::new(csv)).unwrap();
        assert_eq!(pools.approved_count(), 2);
        assert_eq!(pools.declined_count(), 1);
        assert_eq!(pools.classify("5555555555555551"), Authorization::Approved);
    }

    #[test]
    fn test_from_csv_rejects_unknown_status() {
        let csv = "number,status\n4444444444444441,PENDING\n";
        let err = CardPools::from_csv(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, GateError::InvalidPoolEntry { row: 2, .. }));
    }

    #[test]
    fn test_rejects_malformed_number() {
        let err = CardPools::new(["4444"], Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("16-digit"));
    }

    #[test]
    fn test_rejects_overlapping_pools() {
        let err = CardPools::new([DEMO_APPROVED_NUMBER], [DEMO_APPROVED_NUMBER]).unwrap_err();
        assert!(err.to_string().contains("both approved and declined"));
    }

    #[test]
    fn test_authorization_status() {
        assert_eq!(Authorization::Approved.status(), Some(AuthStatus::Approved));
        assert_eq!(Authorization::Declined.status(), Some(AuthStatus::Declined));
        assert_eq!(Authorization::Unknown.status(), None);
    }
}

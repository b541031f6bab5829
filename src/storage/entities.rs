use std::fmt::Display;

use chrono::{DateTime, Utc};

/// One logged drink. Created by [IntakeStore::save](super::intake_store::IntakeStore::save) and
/// never modified afterwards.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct IntakeRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Milliliters, always positive.
    pub amount: i64,
}

/// Aggregate over a range of records.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct IntakeStats {
    pub count: i64,
    pub total_ml: i64,
}

impl Display for IntakeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} records, {} ml today", self.count, self.total_ml)
    }
}

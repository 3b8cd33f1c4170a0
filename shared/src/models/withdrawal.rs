//! Supply withdrawal models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a record is a computed ration plan or a physical issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalKind {
    /// Derived from menu planning; never touches the ledger
    Planned,
    /// Physically issued; created together with its ledger decrement
    Actual,
}

impl WithdrawalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalKind::Planned => "planned",
            WithdrawalKind::Actual => "actual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planned" => Some(WithdrawalKind::Planned),
            "actual" => Some(WithdrawalKind::Actual),
            _ => None,
        }
    }
}

/// Lifecycle status of a withdrawal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Active,
    /// The record's ledger decrement has been restored (failed edit);
    /// the quantity on the record no longer maps to stock movement
    Reversed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Active => "active",
            WithdrawalStatus::Reversed => "reversed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(WithdrawalStatus::Active),
            "reversed" => Some(WithdrawalStatus::Reversed),
            _ => None,
        }
    }
}

/// A planned or actual movement of product out of the station to a
/// receiving unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub kind: WithdrawalKind,
    pub unit_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub withdrawal_date: NaiveDate,
    pub status: WithdrawalStatus,
    /// Planning linkage, set when kind = planned
    pub plan_week: Option<i32>,
    pub plan_year: Option<i32>,
    /// Person who physically signed for an actual issue
    pub receiver: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Planned-vs-actual comparison for one (date, unit, product) triple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRow {
    pub withdrawal_date: NaiveDate,
    pub unit_id: Uuid,
    pub unit_code: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub planned: Decimal,
    pub actual: Decimal,
    /// actual - planned
    pub variance: Decimal,
    /// variance / planned * 100; None when nothing was planned
    pub variance_percent: Option<Decimal>,
}

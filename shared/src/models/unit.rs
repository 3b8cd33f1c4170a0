//! Receiving unit models
//!
//! Units are owned by an external registry; headcount is read here purely
//! as an allocation weight.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A receiving unit (company, battalion detachment, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilitaryUnit {
    pub id: Uuid,
    /// Stable unit code, used as the deterministic ordering key for
    /// ration allocation tie-breaks
    pub code: String,
    pub name: String,
    /// Nominal personnel count
    pub personnel: i32,
    pub created_at: DateTime<Utc>,
}

/// Per-day headcount override, distinct from the nominal personnel count
/// (leave, field exercises, attached personnel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonnelOverride {
    pub unit_id: Uuid,
    pub effective_date: NaiveDate,
    pub personnel: i32,
}

/// A unit's weight in a ration allocation, resolved for a specific date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitShare {
    pub unit_id: Uuid,
    pub code: String,
    pub headcount: i32,
}

//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// ISO week reference used to address a planned menu week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWeek {
    pub week: u32,
    pub year: i32,
}

impl PlanWeek {
    pub fn new(week: u32, year: i32) -> Self {
        Self { week, year }
    }
}

//! Ration planning models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregated daily requirement for one product, derived from the menu.
/// Not persisted; becomes planned withdrawal records once allocated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub category: super::ProductCategory,
    pub total_quantity: Decimal,
    /// Every dish that referenced the product, de-duplicated, for
    /// operator visibility
    pub contributing_dishes: Vec<String>,
}

/// An ingredient that could not be resolved to a catalog product.
/// Reported as a warning and excluded from planned generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedIngredient {
    pub menu_date: NaiveDate,
    pub dish_name: String,
    pub ingredient_name: String,
}

/// One unit's share of an allocated requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub unit_id: Uuid,
    pub quantity: Decimal,
}

/// Outcome of a planned-withdrawal generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedGeneration {
    pub created: u32,
    pub skipped: u32,
    pub replaced: u32,
    pub unmatched: Vec<UnmatchedIngredient>,
}

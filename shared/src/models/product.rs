//! Product catalog models
//!
//! The catalog is owned by an external CRUD service; this crate only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provision item (luong thuc, thuc pham) tracked through intake,
/// processing and rationing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit of measure the product is stocked and issued in (kg, l, ...)
    pub unit: String,
    pub category: ProductCategory,
    pub created_at: DateTime<Utc>,
}

/// Supply categories used by the quartermaster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Staple,
    Meat,
    Fish,
    Vegetable,
    Fruit,
    Seasoning,
    Fuel,
    Other,
}

impl ProductCategory {
    /// Parse a stored category value; the catalog is externally owned,
    /// so unknown values degrade to `Other` rather than failing reads
    pub fn parse(value: &str) -> Self {
        match value {
            "staple" => ProductCategory::Staple,
            "meat" => ProductCategory::Meat,
            "fish" => ProductCategory::Fish,
            "vegetable" => ProductCategory::Vegetable,
            "fruit" => ProductCategory::Fruit,
            "seasoning" => ProductCategory::Seasoning,
            "fuel" => ProductCategory::Fuel,
            _ => ProductCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Staple => "staple",
            ProductCategory::Meat => "meat",
            ProductCategory::Fish => "fish",
            ProductCategory::Vegetable => "vegetable",
            ProductCategory::Fruit => "fruit",
            ProductCategory::Seasoning => "seasoning",
            ProductCategory::Fuel => "fuel",
            ProductCategory::Other => "other",
        }
    }
}

//! Weekly menu read model
//!
//! The menu is edited by the brigade assistant in an external workflow;
//! this crate consumes the day -> meal -> dish -> ingredient structure
//! read-only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One calendar day of a planned menu week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDay {
    pub id: Uuid,
    pub menu_date: NaiveDate,
    pub plan_week: i32,
    pub plan_year: i32,
    pub meals: Vec<MenuMeal>,
}

/// A scheduled meal with its own audience headcount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuMeal {
    pub id: Uuid,
    pub name: String,
    /// Number of people this meal is cooked for
    pub headcount: i32,
    pub dishes: Vec<MenuDish>,
}

/// A dish on a meal's menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDish {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<DishIngredient>,
}

/// One ingredient line of a dish recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishIngredient {
    pub id: Uuid,
    /// Catalog reference when the menu editor linked one; otherwise the
    /// free-text name below is matched against the catalog
    pub product_id: Option<Uuid>,
    pub ingredient_name: String,
    /// Quantity needed per `serving_basis` servings
    pub quantity_per_serving: Decimal,
    pub unit: String,
    /// Number of servings the per-serving quantity is expressed for
    /// (recipes are often written per 10 or per 100 servings)
    pub serving_basis: i32,
}

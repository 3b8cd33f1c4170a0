//! Ingredient aggregator
//!
//! Turns one menu day into per-product ration requirements. Pure and
//! side-effect free: the menu structure and a catalog index go in, a
//! list of requirements plus unmatched-ingredient warnings comes out.
//! Planned withdrawal generation calls this directly in-process.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::catalog::ProductIndex;
use shared::models::{IngredientRequirement, MenuDay, UnmatchedIngredient};

/// Result of aggregating one menu day
#[derive(Debug, Clone)]
pub struct DayAggregation {
    /// One requirement per distinct product touched that day
    pub requirements: Vec<IngredientRequirement>,
    /// Ingredients that resolved to no catalog product; excluded from
    /// the requirements, surfaced for the operator
    pub unmatched: Vec<UnmatchedIngredient>,
}

/// Aggregate a day's scheduled meals into per-product requirements.
///
/// For every (meal, dish, ingredient) the contribution is
/// `quantity_per_serving x meal headcount / serving_basis`. A meal with
/// zero headcount still produces its products' requirement rows (at
/// quantity zero) so downstream reconciliation can show "0 planned,
/// 0 needed". Malformed structure fails the whole day with
/// `InvalidMenuData` naming the offending dish.
pub fn aggregate_day(day: &MenuDay, catalog: &ProductIndex) -> AppResult<DayAggregation> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut totals: HashMap<Uuid, IngredientRequirement> = HashMap::new();
    let mut unmatched: Vec<UnmatchedIngredient> = Vec::new();

    for meal in &day.meals {
        if meal.headcount < 0 {
            return Err(AppError::InvalidMenuData {
                date: day.menu_date,
                detail: format!("meal '{}' has a negative headcount", meal.name),
            });
        }
        let headcount = Decimal::from(meal.headcount);

        for dish in &meal.dishes {
            for ingredient in &dish.ingredients {
                if ingredient.quantity_per_serving < Decimal::ZERO {
                    return Err(AppError::InvalidMenuData {
                        date: day.menu_date,
                        detail: format!(
                            "dish '{}' has a negative quantity for '{}'",
                            dish.name, ingredient.ingredient_name
                        ),
                    });
                }
                if ingredient.serving_basis < 1 {
                    return Err(AppError::InvalidMenuData {
                        date: day.menu_date,
                        detail: format!(
                            "dish '{}' has an invalid serving basis for '{}'",
                            dish.name, ingredient.ingredient_name
                        ),
                    });
                }

                let product =
                    match catalog.resolve(ingredient.product_id, &ingredient.ingredient_name) {
                        Some(product) => product,
                        None => {
                            tracing::warn!(
                                date = %day.menu_date,
                                dish = %dish.name,
                                ingredient = %ingredient.ingredient_name,
                                "ingredient does not match any catalog product; skipping"
                            );
                            unmatched.push(UnmatchedIngredient {
                                menu_date: day.menu_date,
                                dish_name: dish.name.clone(),
                                ingredient_name: ingredient.ingredient_name.clone(),
                            });
                            continue;
                        }
                    };

                let contribution = ingredient.quantity_per_serving * headcount
                    / Decimal::from(ingredient.serving_basis);

                let entry = totals.entry(product.id).or_insert_with(|| {
                    order.push(product.id);
                    IngredientRequirement {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        unit: product.unit.clone(),
                        category: product.category,
                        total_quantity: Decimal::ZERO,
                        contributing_dishes: Vec::new(),
                    }
                });
                entry.total_quantity += contribution;
                if !entry.contributing_dishes.contains(&dish.name) {
                    entry.contributing_dishes.push(dish.name.clone());
                }
            }
        }
    }

    let requirements = order
        .into_iter()
        .filter_map(|id| totals.remove(&id))
        .collect();

    Ok(DayAggregation {
        requirements,
        unmatched,
    })
}

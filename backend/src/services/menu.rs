//! Weekly menu read model
//!
//! Assembles the day -> meal -> dish -> ingredient structure edited by
//! the brigade assistant in the external menu workflow. The original
//! system fetched this over a loopback HTTP call to its own API; here it
//! is a plain in-process read.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::{DishIngredient, MenuDay, MenuDish, MenuMeal};

/// Read-only access to the planned menu structure
#[derive(Clone)]
pub struct MenuService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct DayRow {
    id: Uuid,
    menu_date: NaiveDate,
    plan_week: i32,
    plan_year: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct MealRow {
    id: Uuid,
    menu_day_id: Uuid,
    name: String,
    headcount: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    meal_id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: Uuid,
    dish_id: Uuid,
    product_id: Option<Uuid>,
    ingredient_name: String,
    quantity_per_serving: Decimal,
    unit: String,
    serving_basis: i32,
}

impl MenuService {
    /// Create a new MenuService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch every planned day of an ISO week, dates ascending, with the
    /// full nested meal/dish/ingredient structure. Days without a menu
    /// are simply absent.
    pub async fn week_days(&self, week: u32, year: i32) -> AppResult<Vec<MenuDay>> {
        let day_rows = sqlx::query_as::<_, DayRow>(
            r#"
            SELECT id, menu_date, plan_week, plan_year
            FROM menu_days
            WHERE plan_week = $1 AND plan_year = $2
            ORDER BY menu_date ASC
            "#,
        )
        .bind(week as i32)
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        if day_rows.is_empty() {
            return Ok(Vec::new());
        }

        let day_ids: Vec<Uuid> = day_rows.iter().map(|d| d.id).collect();
        let meal_rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, menu_day_id, name, headcount
            FROM menu_meals
            WHERE menu_day_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&day_ids)
        .fetch_all(&self.db)
        .await?;

        let meal_ids: Vec<Uuid> = meal_rows.iter().map(|m| m.id).collect();
        let dish_rows = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, meal_id, name
            FROM menu_dishes
            WHERE meal_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&meal_ids)
        .fetch_all(&self.db)
        .await?;

        let dish_ids: Vec<Uuid> = dish_rows.iter().map(|d| d.id).collect();
        let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, dish_id, product_id, ingredient_name,
                   quantity_per_serving, unit, serving_basis
            FROM menu_dish_ingredients
            WHERE dish_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&dish_ids)
        .fetch_all(&self.db)
        .await?;

        // Assemble bottom-up
        let mut ingredients_by_dish: HashMap<Uuid, Vec<DishIngredient>> = HashMap::new();
        for row in ingredient_rows {
            ingredients_by_dish
                .entry(row.dish_id)
                .or_default()
                .push(DishIngredient {
                    id: row.id,
                    product_id: row.product_id,
                    ingredient_name: row.ingredient_name,
                    quantity_per_serving: row.quantity_per_serving,
                    unit: row.unit,
                    serving_basis: row.serving_basis,
                });
        }

        let mut dishes_by_meal: HashMap<Uuid, Vec<MenuDish>> = HashMap::new();
        for row in dish_rows {
            let ingredients = ingredients_by_dish.remove(&row.id).unwrap_or_default();
            dishes_by_meal.entry(row.meal_id).or_default().push(MenuDish {
                id: row.id,
                name: row.name,
                ingredients,
            });
        }

        let mut meals_by_day: HashMap<Uuid, Vec<MenuMeal>> = HashMap::new();
        for row in meal_rows {
            let dishes = dishes_by_meal.remove(&row.id).unwrap_or_default();
            meals_by_day.entry(row.menu_day_id).or_default().push(MenuMeal {
                id: row.id,
                name: row.name,
                headcount: row.headcount,
                dishes,
            });
        }

        Ok(day_rows
            .into_iter()
            .map(|day| MenuDay {
                meals: meals_by_day.remove(&day.id).unwrap_or_default(),
                id: day.id,
                menu_date: day.menu_date,
                plan_week: day.plan_week,
                plan_year: day.plan_year,
            })
            .collect())
    }
}

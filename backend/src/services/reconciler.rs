//! Planned vs actual reconciler
//!
//! Generates planned withdrawal records from the weekly menu (aggregator
//! and allocator run in-process) and compares them against actual issues
//! per (date, unit, product).

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::aggregator::aggregate_day;
use crate::services::allocator::allocate;
use crate::services::catalog::ProductCatalogService;
use crate::services::menu::MenuService;
use crate::services::units::UnitRegistryService;
use shared::models::{PlannedGeneration, VarianceRow};
use shared::types::PlanWeek;
use shared::validation::resolve_iso_week;

/// Reconciliation service for ration planning
#[derive(Clone)]
pub struct ReconciliationService {
    db: PgPool,
    catalog: ProductCatalogService,
    units: UnitRegistryService,
    menu: MenuService,
}

/// Filters for the variance comparison
#[derive(Debug, Default, Deserialize)]
pub struct VarianceFilter {
    pub unit_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

/// Database row for one grouped (date, unit, product) sum pair
#[derive(Debug, sqlx::FromRow)]
struct ComparisonRow {
    withdrawal_date: NaiveDate,
    unit_id: Uuid,
    unit_code: String,
    product_id: Uuid,
    product_name: String,
    planned: Decimal,
    actual: Decimal,
}

impl ReconciliationService {
    /// Create a new ReconciliationService instance
    pub fn new(db: PgPool) -> Self {
        let catalog = ProductCatalogService::new(db.clone());
        let units = UnitRegistryService::new(db.clone());
        let menu = MenuService::new(db.clone());
        Self {
            db,
            catalog,
            units,
            menu,
        }
    }

    /// Generate planned withdrawal records for an ISO week.
    ///
    /// Walks every planned menu day of the week, re-fetching unit
    /// headcounts fresh per day (overrides change daily), aggregating
    /// ingredient requirements and allocating them across units. One
    /// planned record per (date, unit, product); existing keys are
    /// skipped when `overwrite` is false and replaced in place when
    /// true, so repeated runs with `overwrite = false` never duplicate.
    /// The ledger is never touched.
    pub async fn generate_planned(
        &self,
        week: PlanWeek,
        overwrite: bool,
    ) -> AppResult<PlannedGeneration> {
        let monday = self.resolve_week(week)?;

        let days = self.menu.week_days(week.week, week.year).await?;
        if days.is_empty() {
            tracing::info!(
                week = week.week,
                year = week.year,
                "no menu days planned for week, nothing to generate"
            );
        }
        // Catalog fetched fresh per invocation, shared across the week
        let catalog = self.catalog.index().await?;

        let mut outcome = PlannedGeneration {
            created: 0,
            skipped: 0,
            replaced: 0,
            unmatched: Vec::new(),
        };

        for day in &days {
            if day.menu_date < monday || day.menu_date > monday + Duration::days(6) {
                return Err(AppError::InvalidMenuData {
                    date: day.menu_date,
                    detail: format!("menu day is outside week {}/{}", week.week, week.year),
                });
            }

            let shares = self.units.shares_for_date(day.menu_date).await?;
            let aggregation = aggregate_day(day, &catalog)?;
            outcome.unmatched.extend(aggregation.unmatched);

            for requirement in &aggregation.requirements {
                // Round to the ledger's storage scale before splitting so
                // the persisted allocations still sum to the requirement
                let total = requirement.total_quantity.round_dp(3);
                let allocations = allocate(total, &shares);
                for allocation in allocations {
                    let existed = self
                        .upsert_planned(
                            day.menu_date,
                            allocation.unit_id,
                            requirement.product_id,
                            allocation.quantity,
                            week,
                            overwrite,
                        )
                        .await?;
                    match (existed, overwrite) {
                        (false, _) => outcome.created += 1,
                        (true, false) => outcome.skipped += 1,
                        (true, true) => outcome.replaced += 1,
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Compare planned against actual withdrawals for an ISO week
    pub async fn compare(
        &self,
        week: PlanWeek,
        filter: VarianceFilter,
    ) -> AppResult<Vec<VarianceRow>> {
        let monday = self.resolve_week(week)?;
        let sunday = monday + Duration::days(6);

        let rows = sqlx::query_as::<_, ComparisonRow>(
            r#"
            SELECT w.withdrawal_date, w.unit_id, u.code AS unit_code,
                   w.product_id, p.name AS product_name,
                   COALESCE(SUM(CASE WHEN w.kind = 'planned' THEN w.quantity ELSE 0 END), 0) AS planned,
                   COALESCE(SUM(CASE WHEN w.kind = 'actual' THEN w.quantity ELSE 0 END), 0) AS actual
            FROM withdrawal_records w
            JOIN units u ON u.id = w.unit_id
            JOIN products p ON p.id = w.product_id
            WHERE w.status = 'active'
              AND w.withdrawal_date BETWEEN $1 AND $2
              AND ($3::uuid IS NULL OR w.unit_id = $3)
              AND ($4::uuid IS NULL OR w.product_id = $4)
            GROUP BY w.withdrawal_date, w.unit_id, u.code, w.product_id, p.name
            ORDER BY w.withdrawal_date ASC, u.code ASC, p.name ASC
            "#,
        )
        .bind(monday)
        .bind(sunday)
        .bind(filter.unit_id)
        .bind(filter.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let (variance, variance_percent) = variance_of(r.planned, r.actual);
                VarianceRow {
                    withdrawal_date: r.withdrawal_date,
                    unit_id: r.unit_id,
                    unit_code: r.unit_code,
                    product_id: r.product_id,
                    product_name: r.product_name,
                    planned: r.planned,
                    actual: r.actual,
                    variance,
                    variance_percent,
                }
            })
            .collect())
    }

    fn resolve_week(&self, week: PlanWeek) -> AppResult<NaiveDate> {
        resolve_iso_week(week.week, week.year).map_err(|message| AppError::Validation {
            field: "week".to_string(),
            message: message.to_string(),
            message_vi: "Tuần kế hoạch không hợp lệ".to_string(),
        })
    }

    /// Insert or update one planned record. Returns whether the key
    /// already existed.
    #[allow(clippy::too_many_arguments)]
    async fn upsert_planned(
        &self,
        date: NaiveDate,
        unit_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        week: PlanWeek,
        overwrite: bool,
    ) -> AppResult<bool> {
        if overwrite {
            let inserted = sqlx::query_scalar::<_, bool>(
                r#"
                INSERT INTO withdrawal_records
                    (kind, unit_id, product_id, quantity, withdrawal_date, status, plan_week, plan_year)
                VALUES ('planned', $1, $2, $3, $4, 'active', $5, $6)
                ON CONFLICT (withdrawal_date, unit_id, product_id) WHERE kind = 'planned'
                DO UPDATE SET quantity = EXCLUDED.quantity,
                              plan_week = EXCLUDED.plan_week,
                              plan_year = EXCLUDED.plan_year,
                              updated_at = NOW()
                RETURNING (created_at = updated_at) AS inserted
                "#,
            )
            .bind(unit_id)
            .bind(product_id)
            .bind(quantity)
            .bind(date)
            .bind(week.week as i32)
            .bind(week.year)
            .fetch_one(&self.db)
            .await?;
            Ok(!inserted)
        } else {
            let result = sqlx::query(
                r#"
                INSERT INTO withdrawal_records
                    (kind, unit_id, product_id, quantity, withdrawal_date, status, plan_week, plan_year)
                VALUES ('planned', $1, $2, $3, $4, 'active', $5, $6)
                ON CONFLICT (withdrawal_date, unit_id, product_id) WHERE kind = 'planned'
                DO NOTHING
                "#,
            )
            .bind(unit_id)
            .bind(product_id)
            .bind(quantity)
            .bind(date)
            .bind(week.week as i32)
            .bind(week.year)
            .execute(&self.db)
            .await?;
            Ok(result.rows_affected() == 0)
        }
    }
}

/// Variance of one (planned, actual) pair.
///
/// The percentage is undefined when nothing was planned; that is a
/// `None`, not a division error.
pub fn variance_of(planned: Decimal, actual: Decimal) -> (Decimal, Option<Decimal>) {
    let variance = actual - planned;
    let percent = if planned.is_zero() {
        None
    } else {
        Some((variance / planned * Decimal::from(100)).round_dp(2))
    };
    (variance, percent)
}

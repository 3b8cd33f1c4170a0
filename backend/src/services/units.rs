//! Receiving unit registry read model
//!
//! Units and their headcounts are maintained externally; this module
//! resolves the headcount that applies on a given date (per-day override
//! first, nominal personnel otherwise).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{MilitaryUnit, UnitShare};

/// Read-only access to the unit registry
#[derive(Clone)]
pub struct UnitRegistryService {
    db: PgPool,
}

/// Database row for a unit
#[derive(Debug, sqlx::FromRow)]
struct UnitRow {
    id: Uuid,
    code: String,
    name: String,
    personnel: i32,
    created_at: DateTime<Utc>,
}

impl From<UnitRow> for MilitaryUnit {
    fn from(row: UnitRow) -> Self {
        MilitaryUnit {
            id: row.id,
            code: row.code,
            name: row.name,
            personnel: row.personnel,
            created_at: row.created_at,
        }
    }
}

/// Database row for a date-resolved share
#[derive(Debug, sqlx::FromRow)]
struct ShareRow {
    id: Uuid,
    code: String,
    headcount: i32,
}

impl UnitRegistryService {
    /// Create a new UnitRegistryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a unit by id
    pub async fn get(&self, unit_id: Uuid) -> AppResult<MilitaryUnit> {
        let row = sqlx::query_as::<_, UnitRow>(
            "SELECT id, code, name, personnel, created_at FROM units WHERE id = $1",
        )
        .bind(unit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit".to_string()))?;

        Ok(row.into())
    }

    /// Check whether a unit exists
    pub async fn exists(&self, unit_id: Uuid) -> AppResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM units WHERE id = $1)")
                .bind(unit_id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    /// List all units, code ascending
    pub async fn list(&self) -> AppResult<Vec<MilitaryUnit>> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT id, code, name, personnel, created_at FROM units ORDER BY code ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Resolve every unit's allocation weight for `date`.
    ///
    /// Returned in unit-code order, which the allocator relies on as its
    /// deterministic tie-break. Queried fresh for each planning day;
    /// headcounts change daily and must not be cached across a week.
    pub async fn shares_for_date(&self, date: NaiveDate) -> AppResult<Vec<UnitShare>> {
        let rows = sqlx::query_as::<_, ShareRow>(
            r#"
            SELECT u.id, u.code, COALESCE(o.personnel, u.personnel) AS headcount
            FROM units u
            LEFT JOIN unit_personnel_overrides o
                   ON o.unit_id = u.id AND o.effective_date = $1
            ORDER BY u.code ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| UnitShare {
                unit_id: r.id,
                code: r.code,
                headcount: r.headcount,
            })
            .collect())
    }
}

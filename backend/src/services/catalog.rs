//! Product catalog read model
//!
//! The catalog is maintained by the surrounding CRUD service; this module
//! only looks products up and resolves menu ingredients against them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Product, ProductCategory};

/// Read-only access to the product catalog
#[derive(Clone)]
pub struct ProductCatalogService {
    db: PgPool,
}

/// Database row for a catalog product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    unit: String,
    category: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            unit: row.unit,
            category: ProductCategory::parse(&row.category),
            created_at: row.created_at,
        }
    }
}

impl ProductCatalogService {
    /// Create a new ProductCatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a product by id
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, unit, category, created_at FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Check whether a product exists
    pub async fn exists(&self, product_id: Uuid) -> AppResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    /// List the whole catalog, name ascending
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, unit, category, created_at FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Build an in-memory index for ingredient resolution.
    ///
    /// Fetched fresh per planning run; the catalog is small (hundreds of
    /// provision items) and must reflect edits made since the last run.
    pub async fn index(&self) -> AppResult<ProductIndex> {
        Ok(ProductIndex::new(self.list().await?))
    }
}

/// In-memory catalog index implementing the ingredient matching rules:
/// exact id when the menu editor linked one, otherwise a
/// case-insensitive name match with substring fallback.
#[derive(Debug, Clone)]
pub struct ProductIndex {
    products: Vec<Product>,
}

impl ProductIndex {
    /// Build an index over `products`; kept sorted by name so fallback
    /// matching is deterministic
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Self { products }
    }

    /// Look a product up by id
    pub fn by_id(&self, product_id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Resolve a menu ingredient to a catalog product.
    ///
    /// An explicit `product_id` wins when it exists in the catalog.
    /// Otherwise the free-text ingredient name is matched
    /// case-insensitively: exact name first, then substring in either
    /// direction, first match in name order. Returns `None` when nothing
    /// matches; the caller reports that as a warning, never guesses.
    pub fn resolve(&self, product_id: Option<Uuid>, ingredient_name: &str) -> Option<&Product> {
        if let Some(id) = product_id {
            if let Some(product) = self.by_id(id) {
                return Some(product);
            }
        }

        let needle = ingredient_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(product) = self
            .products
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
        {
            return Some(product);
        }

        self.products.iter().find(|p| {
            let name = p.name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
    }
}

//! # Material Repository
//!
//! Database operations for the workshop materials catalog.
//!
//! ## Price Snapshots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The catalog price is live; line-item prices are frozen.               │
//! │                                                                         │
//! │  materials.unit_price_cents   ──(copied at line creation)──►           │
//! │                               invoice_lines.unit_price_cents           │
//! │                                                                         │
//! │  A later catalog price change affects NEW lines only; existing         │
//! │  invoices keep the price the customer was quoted.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use axle_core::{validation, Material};

/// Repository for catalog material operations.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Gets a material by catalog id. Returns `None` for unknown ids.
    ///
    /// Inactive (soft-deleted) materials are returned too; the caller
    /// decides whether they may still be added to an invoice.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Material>> {
        fetch_by_id(&self.pool, id).await
    }

    /// Gets a material on a transaction connection.
    ///
    /// Used by the reconciler's update path so the price it snapshots comes
    /// from the same transaction that commits the new line.
    pub async fn get_by_id_tx(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<Option<Material>> {
        fetch_by_id(&mut *conn, id).await
    }

    /// Lists active catalog materials, name order.
    pub async fn list_active(&self) -> DbResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>(
            r#"
            SELECT id, name, unit_price_cents, is_active, created_at, updated_at
            FROM materials
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(materials)
    }

    /// Inserts a catalog material and returns its assigned id.
    ///
    /// Used by the seed binary and tests; the catalog itself is maintained
    /// outside the reconciliation engine.
    pub async fn insert(&self, name: &str, unit_price_cents: i64) -> DbResult<i64> {
        validation::validate_unit_price(unit_price_cents)
            .map_err(|e| DbError::InvalidInput(e.to_string()))?;

        debug!(name = %name, unit_price_cents, "Inserting material");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO materials (name, unit_price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, 1, ?3, ?3)
            "#,
        )
        .bind(name)
        .bind(unit_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a material's catalog price.
    ///
    /// Existing invoice lines are NOT touched: their prices are snapshots.
    pub async fn update_price(&self, id: i64, unit_price_cents: i64) -> DbResult<()> {
        validation::validate_unit_price(unit_price_cents)
            .map_err(|e| DbError::InvalidInput(e.to_string()))?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE materials SET unit_price_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(unit_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id.to_string()));
        }

        Ok(())
    }
}

async fn fetch_by_id<'e, E>(executor: E, id: i64) -> DbResult<Option<Material>>
where
    E: SqliteExecutor<'e>,
{
    let material = sqlx::query_as::<_, Material>(
        r#"
        SELECT id, name, unit_price_cents, is_active, created_at, updated_at
        FROM materials
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(material)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use axle_core::MAX_UNIT_PRICE_CENTS;

    #[tokio::test]
    async fn test_insert_get_and_reprice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.materials();

        let id = repo.insert("Brake pad set", 5_000).await.unwrap();
        let material = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(material.unit_price_cents, 5_000);
        assert!(material.is_active);

        repo.update_price(id, 5_500).await.unwrap();
        let material = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(material.unit_price_cents, 5_500);

        assert!(repo.get_by_id(9_999).await.unwrap().is_none());
        assert!(repo.update_price(9_999, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_list_active_ordering() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.materials();

        repo.insert("Oil filter", 1_200).await.unwrap();
        repo.insert("Air filter", 900).await.unwrap();

        let names: Vec<String> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Air filter", "Oil filter"]);
    }

    #[tokio::test]
    async fn test_prices_outside_the_catalog_bound_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.materials();

        assert!(matches!(
            repo.insert("Gold-plated manifold", MAX_UNIT_PRICE_CENTS + 1).await,
            Err(DbError::InvalidInput(_))
        ));
        assert!(matches!(
            repo.insert("Refund voucher", -1).await,
            Err(DbError::InvalidInput(_))
        ));

        let id = repo.insert("Coolant", MAX_UNIT_PRICE_CENTS).await.unwrap();
        assert!(matches!(
            repo.update_price(id, MAX_UNIT_PRICE_CENTS + 1).await,
            Err(DbError::InvalidInput(_))
        ));
        assert_eq!(
            repo.get_by_id(id).await.unwrap().unwrap().unit_price_cents,
            MAX_UNIT_PRICE_CENTS
        );
    }
}

//! # Reference Repository
//!
//! Existence checks for the entities an invoice refers to: customers,
//! vehicles and job types.
//!
//! The reconciler only needs yes/no answers here - full CRUD for these
//! entities lives outside this crate. Insert helpers exist for the seed
//! binary and tests.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository answering reference-existence questions.
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReferenceRepository { pool }
    }

    /// Whether a customer with this id exists.
    pub async fn customer_exists(&self, id: i64) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Whether this vehicle exists AND belongs to the named customer.
    ///
    /// An invoice must not bill one customer for another customer's vehicle,
    /// so bare existence is not enough.
    pub async fn vehicle_belongs_to(&self, vehicle_id: i64, customer_id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = ?1 AND owner_id = ?2)",
        )
        .bind(vehicle_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether a job type with this id exists.
    pub async fn job_type_exists(&self, id: i64) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM job_types WHERE id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Same check on a transaction connection (reconciler update path).
    pub async fn job_type_exists_tx(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM job_types WHERE id = ?1)")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(exists)
    }

    /// Inserts a customer (seed/tests) and returns the assigned id.
    pub async fn insert_customer(&self, first_name: &str, last_name: &str) -> DbResult<i64> {
        debug!(first_name, last_name, "Inserting customer");
        let result = sqlx::query(
            "INSERT INTO customers (first_name, last_name, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Inserts a vehicle for a customer (seed/tests), returns the id.
    pub async fn insert_vehicle(&self, owner_id: i64, model_name: &str) -> DbResult<i64> {
        debug!(owner_id, model_name, "Inserting vehicle");
        let result = sqlx::query(
            "INSERT INTO vehicles (owner_id, model_name, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(owner_id)
        .bind(model_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Inserts a job type (seed/tests), returns the id.
    pub async fn insert_job_type(&self, name: &str) -> DbResult<i64> {
        debug!(name, "Inserting job type");
        let result = sqlx::query("INSERT INTO job_types (name, created_at) VALUES (?1, ?2)")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_existence_checks() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.references();

        let customer = repo.insert_customer("Ada", "Smith").await.unwrap();
        let other = repo.insert_customer("Max", "Jones").await.unwrap();
        let vehicle = repo.insert_vehicle(customer, "Corolla").await.unwrap();
        let job_type = repo.insert_job_type("Full service").await.unwrap();

        assert!(repo.customer_exists(customer).await.unwrap());
        assert!(!repo.customer_exists(999).await.unwrap());

        assert!(repo.vehicle_belongs_to(vehicle, customer).await.unwrap());
        // Exists, but owned by someone else
        assert!(!repo.vehicle_belongs_to(vehicle, other).await.unwrap());
        assert!(!repo.vehicle_belongs_to(999, customer).await.unwrap());

        assert!(repo.job_type_exists(job_type).await.unwrap());
        assert!(!repo.job_type_exists(999).await.unwrap());
    }
}

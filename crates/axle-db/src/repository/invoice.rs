//! # Invoice Repository
//!
//! Database operations for invoice/draft headers and their owned line-items.
//!
//! ## Ownership & Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoices 1 ──── n invoice_lines  (ON DELETE CASCADE)                  │
//! │                                                                         │
//! │  Reads (get_header, list_lines, list_headers) run on the pool.         │
//! │                                                                         │
//! │  Writes take &mut SqliteConnection: the reconciler threads a single    │
//! │  transaction through every line mutation AND the header amount update  │
//! │  of one call, so a failure anywhere rolls back the whole diff.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use axle_core::{DocumentKind, InvoiceHeader, InvoiceLine};

const HEADER_COLUMNS: &str = r#"
    id, invoice_no, kind, customer_id, vehicle_id, job_type_id,
    description, due_date, service_charge_cents,
    discount_value, discount_kind, vat_bps,
    amount_cents, paid, created_at, updated_at
"#;

/// Repository for invoice and line-item database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================
    // Plain reads run on the pool. The reconciler's update path instead uses
    // the `_tx` variants on its own transaction connection, so the guard, the
    // diff and the amount all see the exact line set the commit applies to.

    /// Gets a header (invoice or draft) by id.
    pub async fn get_header(&self, id: &str) -> DbResult<Option<InvoiceHeader>> {
        fetch_header(&self.pool, id).await
    }

    /// Gets a header on a transaction connection.
    pub async fn get_header_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<InvoiceHeader>> {
        fetch_header(&mut *conn, id).await
    }

    /// Lists headers of one kind, newest invoice number first.
    pub async fn list_headers(&self, kind: DocumentKind) -> DbResult<Vec<InvoiceHeader>> {
        let headers = sqlx::query_as::<_, InvoiceHeader>(&format!(
            "SELECT {HEADER_COLUMNS} FROM invoices WHERE kind = ?1 ORDER BY invoice_no DESC"
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(headers)
    }

    /// Gets all line-items owned by an invoice, insertion order.
    pub async fn list_lines(&self, invoice_id: &str) -> DbResult<Vec<InvoiceLine>> {
        fetch_lines(&self.pool, invoice_id).await
    }

    /// Gets an invoice's line-items on a transaction connection.
    pub async fn list_lines_tx(
        &self,
        conn: &mut SqliteConnection,
        invoice_id: &str,
    ) -> DbResult<Vec<InvoiceLine>> {
        fetch_lines(&mut *conn, invoice_id).await
    }

    // =========================================================================
    // Writes (transaction-scoped)
    // =========================================================================

    /// Inserts a complete header row and returns its assigned invoice number.
    ///
    /// The number is computed inside the INSERT itself
    /// (`MAX(invoice_no) + 1`), so allocation and claim are one atomic
    /// statement: two concurrent creates can never both take the same
    /// number, the later writer simply waits and sees the earlier row.
    /// `header.invoice_no` is ignored on the way in.
    pub async fn insert_header(
        &self,
        conn: &mut SqliteConnection,
        header: &InvoiceHeader,
    ) -> DbResult<i64> {
        debug!(id = %header.id, kind = ?header.kind, "Inserting header");

        let invoice_no: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoices (
                id, invoice_no, kind, customer_id, vehicle_id, job_type_id,
                description, due_date, service_charge_cents,
                discount_value, discount_kind, vat_bps,
                amount_cents, paid, created_at, updated_at
            ) VALUES (
                ?1, (SELECT COALESCE(MAX(invoice_no), 0) + 1 FROM invoices),
                ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12, ?13, ?14, ?15
            )
            RETURNING invoice_no
            "#,
        )
        .bind(&header.id)
        .bind(header.kind)
        .bind(header.customer_id)
        .bind(header.vehicle_id)
        .bind(header.job_type_id)
        .bind(&header.description)
        .bind(header.due_date)
        .bind(header.service_charge_cents)
        .bind(header.discount_value)
        .bind(header.discount_kind)
        .bind(header.vat_bps)
        .bind(header.amount_cents)
        .bind(header.paid)
        .bind(header.created_at)
        .bind(header.updated_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(invoice_no)
    }

    /// Rewrites a header's mutable fields (everything but id/no/kind/created).
    pub async fn update_header(
        &self,
        conn: &mut SqliteConnection,
        header: &InvoiceHeader,
    ) -> DbResult<()> {
        debug!(id = %header.id, amount_cents = header.amount_cents, "Updating header");

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                customer_id = ?2,
                vehicle_id = ?3,
                job_type_id = ?4,
                description = ?5,
                due_date = ?6,
                service_charge_cents = ?7,
                discount_value = ?8,
                discount_kind = ?9,
                vat_bps = ?10,
                amount_cents = ?11,
                paid = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&header.id)
        .bind(header.customer_id)
        .bind(header.vehicle_id)
        .bind(header.job_type_id)
        .bind(&header.description)
        .bind(header.due_date)
        .bind(header.service_charge_cents)
        .bind(header.discount_value)
        .bind(header.discount_kind)
        .bind(header.vat_bps)
        .bind(header.amount_cents)
        .bind(header.paid)
        .bind(header.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", &header.id));
        }

        Ok(())
    }

    /// Inserts a line-item with its price snapshot already taken.
    pub async fn insert_line(
        &self,
        conn: &mut SqliteConnection,
        line: &InvoiceLine,
    ) -> DbResult<()> {
        debug!(
            invoice_id = %line.invoice_id,
            material_id = line.material_id,
            quantity = line.quantity,
            "Inserting line"
        );

        sqlx::query(
            r#"
            INSERT INTO invoice_lines (
                id, invoice_id, material_id, quantity, unit_price_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&line.id)
        .bind(&line.invoice_id)
        .bind(line.material_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Updates only the quantity of an existing line.
    ///
    /// The unit price is a creation-time snapshot and deliberately not
    /// touchable through this repository.
    pub async fn update_line_quantity(
        &self,
        conn: &mut SqliteConnection,
        line_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE invoice_lines SET quantity = ?2 WHERE id = ?1")
            .bind(line_id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice line", line_id));
        }

        Ok(())
    }

    /// Deletes a single line-item.
    pub async fn delete_line(&self, conn: &mut SqliteConnection, line_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoice_lines WHERE id = ?1")
            .bind(line_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice line", line_id));
        }

        Ok(())
    }

    /// Deletes a header; owned lines cascade.
    ///
    /// Runs on the pool: used for standalone deletes and for the best-effort
    /// draft cleanup after an invoice creation has already committed.
    pub async fn delete_header(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting header");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }
}

async fn fetch_header<'e, E>(executor: E, id: &str) -> DbResult<Option<InvoiceHeader>>
where
    E: SqliteExecutor<'e>,
{
    let header = sqlx::query_as::<_, InvoiceHeader>(&format!(
        "SELECT {HEADER_COLUMNS} FROM invoices WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(header)
}

async fn fetch_lines<'e, E>(executor: E, invoice_id: &str) -> DbResult<Vec<InvoiceLine>>
where
    E: SqliteExecutor<'e>,
{
    let lines = sqlx::query_as::<_, InvoiceLine>(
        r#"
        SELECT id, invoice_id, material_id, quantity, unit_price_cents, created_at
        FROM invoice_lines
        WHERE invoice_id = ?1
        ORDER BY created_at, id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(executor)
    .await?;

    Ok(lines)
}

/// Generates a new invoice header ID.
pub fn generate_header_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new line-item ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Invoice Reconciler
//!
//! The crate's main entry point: turns a raw create/update request into a
//! consistent header + line-item state, in one transaction per call.
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Reconciliation Call                              │
//! │                                                                         │
//! │  Phase 1: VALIDATE (pure, no store access)                             │
//! │  ├── due date, service charge, VAT range                               │
//! │  ├── discount pairing + range                                          │
//! │  └── material encoding: parse, limits, duplicate ids                   │
//! │           │                                                             │
//! │  Phase 2: RESOLVE (reads)                                              │
//! │  ├── header load (update) / reference existence (create)               │
//! │  ├── persisted lines + diff (update)                                   │
//! │  └── catalog lookup for every to_add material                          │
//! │           │                                                             │
//! │  Phase 3: COMPUTE                                                      │
//! │  └── amount pipeline over the POST-diff line set                       │
//! │           │                                                             │
//! │  Phase 4: COMMIT                                                       │
//! │  ├── line inserts / quantity updates / deletes                         │
//! │  └── header write with the recomputed amount                           │
//! │                                                                         │
//! │  Every failed phase leaves the store untouched: an open transaction    │
//! │  rolls back on drop, a not-yet-opened one never wrote anything.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Scope
//! On update, ONE transaction spans phases 2-4: the header load, the paid
//! guard, the line diff and the amount computation all read through the
//! transaction's own connection, so the committed amount is derived from
//! exactly the line set the commit applies to. A concurrent update cannot
//! wedge a stale quantity or a stale paid flag between read and write.
//! Create has no prior state to race with; its reads run on the pool and
//! only the writes share a transaction.
//!
//! ## Locking
//! A paid invoice is immutable: the guard runs right after the header load,
//! inside the update transaction, before any validation result could turn
//! into a write. Drafts never lock.

use chrono::Utc;
use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::{debug, info, warn};

use axle_core::amount::{self, validate_discount, AmountInputs};
use axle_core::diff::{diff, LineDiff};
use axle_core::{
    codec, validation, CoreError, CreateRequest, DocumentKind, InvoiceHeader, InvoiceLine,
    Material, MaterialRequest, Money, Rate, UpdateRequest,
};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::invoice::{generate_header_id, generate_line_id};

// =============================================================================
// Errors
// =============================================================================

/// Everything a reconciliation call can reject with.
///
/// The first three variants are pre-store input errors (lifted from
/// [`CoreError`]); `NotFound` and `Immutable` are resolution failures; only
/// `Store` means the database itself misbehaved.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A field does not match its required format.
    #[error("invalid {field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: String,
    },

    /// The discount fields violate pairing or range rules.
    #[error("invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// A numeric input is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// A referenced entity does not exist (or is not usable).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The target invoice is paid and locked against edits.
    #[error("invoice {id} is paid and cannot be modified")]
    Immutable { id: String },

    /// The store failed underneath a structurally valid request.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<CoreError> for ReconcileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFormat { field, reason } => {
                ReconcileError::InvalidFormat { field, reason }
            }
            CoreError::InvalidDiscount { reason } => ReconcileError::InvalidDiscount { reason },
            CoreError::OutOfRange { field, min, max } => {
                ReconcileError::OutOfRange { field, min, max }
            }
        }
    }
}

impl ReconcileError {
    fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        ReconcileError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Result type for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

// =============================================================================
// Outcomes
// =============================================================================

/// What happened to the draft named in a create request.
///
/// The draft delete runs AFTER the invoice transaction has committed and is
/// best effort: a failure here never undoes the created invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftCleanup {
    /// The request named no draft.
    NotRequested,
    /// The draft was deleted.
    Deleted { id: String },
    /// The draft could not be deleted; the invoice itself stands.
    Failed { id: String, reason: String },
}

/// Outcome of a successful create call.
#[derive(Debug, Clone)]
pub struct Created {
    /// The header as persisted, amount already computed.
    pub header: InvoiceHeader,
    /// Draft cleanup outcome (invoice creates only).
    pub draft_cleanup: DraftCleanup,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Creates, updates and deletes invoices and drafts.
///
/// Obtained via [`Database::reconciler`]. Cheap to construct; holds only the
/// shared pool handle.
#[derive(Debug, Clone)]
pub struct InvoiceReconciler {
    db: Database,
}

impl InvoiceReconciler {
    /// Creates a new reconciler over the given database handle.
    pub fn new(db: Database) -> Self {
        InvoiceReconciler { db }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an invoice or draft from scratch.
    ///
    /// ## Rules
    /// - `kind = Invoice`: customer, vehicle and job type are required and
    ///   must exist; the vehicle must belong to the customer
    /// - `kind = Draft`: references are optional, but any that ARE provided
    ///   must still resolve
    /// - every requested material must exist and be active; its current
    ///   catalog price is snapshotted onto the new line
    /// - the amount is computed by the fee pipeline and persisted; it is
    ///   never taken from the request
    ///
    /// On success for invoices, a `draft_id` in the request is deleted best
    /// effort after commit. See [`DraftCleanup`].
    pub async fn create(
        &self,
        kind: DocumentKind,
        req: &CreateRequest,
    ) -> ReconcileResult<Created> {
        // Phase 1: pure validation, nothing touched yet.
        let due_date = req
            .due_date
            .as_deref()
            .map(validation::validate_due_date)
            .transpose()?;
        if let Some(cents) = req.service_charge_cents {
            validation::validate_service_charge(cents)?;
        }
        if let Some(bps) = req.vat_bps {
            validation::validate_vat_bps(bps)?;
        }
        let discount = validate_discount(req.discount_value, req.discount_kind)?;

        let requests = codec::parse(req.materials.as_deref().unwrap_or(""))?;
        validation::validate_material_list(&requests)?;

        // Phase 2: resolve references and catalog materials.
        self.check_references(kind, req).await?;
        let additions = self.resolve_materials(&requests).await?;

        // Phase 3: the amount, from the would-be line set.
        let line_totals = amount::sum_line_totals(
            additions
                .iter()
                .map(|(request, material)| (material.unit_price(), request.quantity)),
        );
        let total = amount::compute(&AmountInputs {
            service_charge: req.service_charge_cents.map(Money::from_cents),
            line_totals,
            discount,
            vat: req.vat_bps.map(Rate::from_bps),
        });

        // Phase 4: one transaction for number, header and every line.
        let invoices = self.db.invoices();
        let now = Utc::now();
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut header = InvoiceHeader {
            id: generate_header_id(),
            invoice_no: 0,
            kind,
            customer_id: req.customer_id,
            vehicle_id: req.vehicle_id,
            job_type_id: req.job_type_id,
            description: req.description.clone(),
            due_date,
            service_charge_cents: req.service_charge_cents,
            discount_value: req.discount_value,
            discount_kind: req.discount_kind,
            vat_bps: req.vat_bps,
            amount_cents: total.cents(),
            paid: false,
            created_at: now,
            updated_at: now,
        };
        header.invoice_no = invoices.insert_header(&mut tx, &header).await?;

        for (request, material) in &additions {
            let line = InvoiceLine {
                id: generate_line_id(),
                invoice_id: header.id.clone(),
                material_id: request.material_id,
                quantity: request.quantity,
                unit_price_cents: material.unit_price_cents,
                created_at: now,
            };
            invoices.insert_line(&mut tx, &line).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %header.id,
            invoice_no = header.invoice_no,
            kind = ?kind,
            amount_cents = header.amount_cents,
            lines = additions.len(),
            "Created document"
        );

        // Post-commit: the invoice stands regardless of what happens here.
        let draft_cleanup = match (&kind, &req.draft_id) {
            (DocumentKind::Invoice, Some(draft_id)) => {
                match invoices.delete_header(draft_id).await {
                    Ok(()) => DraftCleanup::Deleted {
                        id: draft_id.clone(),
                    },
                    Err(e) => {
                        warn!(draft_id = %draft_id, error = %e, "Draft cleanup failed");
                        DraftCleanup::Failed {
                            id: draft_id.clone(),
                            reason: e.to_string(),
                        }
                    }
                }
            }
            _ => DraftCleanup::NotRequested,
        };

        Ok(Created {
            header,
            draft_cleanup,
        })
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Reconciles an existing invoice or draft against an update request.
    ///
    /// The request's material encoding is the full desired line set; persisted
    /// lines are diffed against it and brought in line within one transaction.
    /// Fee fields patch: absent means "keep the stored value". The amount is
    /// always recomputed from the post-diff lines and the effective fees.
    ///
    /// ## Errors
    /// - `NotFound` when no header has this id
    /// - `Immutable` when the header is a paid invoice, checked before any
    ///   validation result can become a write
    pub async fn update(&self, id: &str, req: &UpdateRequest) -> ReconcileResult<InvoiceHeader> {
        let invoices = self.db.invoices();

        // The transaction opens before the header load so every read below
        // sees the state the final write will replace. A failure anywhere
        // drops the transaction and rolls it back.
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let stored = invoices
            .get_header_tx(&mut tx, id)
            .await?
            .ok_or_else(|| ReconcileError::not_found("Invoice", id))?;

        if stored.is_locked() {
            return Err(ReconcileError::Immutable { id: id.to_string() });
        }

        // Phase 1: validate the request fields that are present.
        let due_date = match &req.due_date {
            Some(raw) => Some(validation::validate_due_date(raw)?),
            None => stored.due_date,
        };
        if let Some(cents) = req.service_charge_cents {
            validation::validate_service_charge(cents)?;
        }
        if let Some(bps) = req.vat_bps {
            validation::validate_vat_bps(bps)?;
        }

        // Fees patch over the stored header, then the merged pair is what
        // gets validated: a request may supply one half of a discount the
        // header already holds the other half of.
        let service_charge_cents = req.service_charge_cents.or(stored.service_charge_cents);
        let discount_value = req.discount_value.or(stored.discount_value);
        let discount_kind = req.discount_kind.or(stored.discount_kind);
        let vat_bps = req.vat_bps.or(stored.vat_bps);
        let discount = validate_discount(discount_value, discount_kind)?;

        let requests = codec::parse(&req.materials)?;
        validation::validate_material_list(&requests)?;

        if let Some(job_type_id) = req.job_type_id {
            if !self
                .db
                .references()
                .job_type_exists_tx(&mut tx, job_type_id)
                .await?
            {
                return Err(ReconcileError::not_found("Job type", job_type_id));
            }
        }

        // Phase 2: load lines, diff, resolve the to_add materials.
        let persisted = invoices.list_lines_tx(&mut tx, id).await?;
        let line_diff = diff(&requests, &persisted);
        debug!(
            id = %id,
            to_add = line_diff.to_add.len(),
            to_modify = line_diff.to_modify.len(),
            to_keep = line_diff.to_keep.len(),
            to_remove = line_diff.to_remove.len(),
            "Line diff computed"
        );

        let additions = self.resolve_materials_tx(&mut tx, &line_diff.to_add).await?;

        // Phase 3: amount over the post-diff line set. Kept and modified
        // lines price at their frozen snapshot; only new lines take the
        // current catalog price.
        let line_totals = post_diff_line_totals(&line_diff, &persisted, &additions)?;
        let total = amount::compute(&AmountInputs {
            service_charge: service_charge_cents.map(Money::from_cents),
            line_totals,
            discount,
            vat: vat_bps.map(Rate::from_bps),
        });

        let now = Utc::now();
        let header = InvoiceHeader {
            description: req.description.clone().or_else(|| stored.description.clone()),
            due_date,
            job_type_id: req.job_type_id.or(stored.job_type_id),
            service_charge_cents,
            discount_value,
            discount_kind,
            vat_bps,
            amount_cents: total.cents(),
            paid: req.paid.unwrap_or(stored.paid),
            updated_at: now,
            ..stored
        };

        // Phase 4: apply the diff and the header rewrite on the same
        // transaction the reads ran on.
        for (request, material) in &additions {
            let line = InvoiceLine {
                id: generate_line_id(),
                invoice_id: header.id.clone(),
                material_id: request.material_id,
                quantity: request.quantity,
                unit_price_cents: material.unit_price_cents,
                created_at: now,
            };
            invoices.insert_line(&mut tx, &line).await?;
        }
        for change in &line_diff.to_modify {
            invoices
                .update_line_quantity(&mut tx, &change.line_id, change.new_quantity)
                .await?;
        }
        for line in &line_diff.to_remove {
            invoices.delete_line(&mut tx, &line.id).await?;
        }
        invoices.update_header(&mut tx, &header).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %header.id,
            amount_cents = header.amount_cents,
            noop = line_diff.is_noop(),
            "Reconciled document"
        );

        Ok(header)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes an invoice or draft; its lines cascade.
    pub async fn delete(&self, id: &str) -> ReconcileResult<()> {
        match self.db.invoices().delete_header(id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound { entity, id }) => Err(ReconcileError::NotFound { entity, id }),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Checks the create request's references.
    ///
    /// Invoices require all three. Drafts may omit them, but provided ones
    /// must resolve, and a vehicle cannot be checked without its customer.
    async fn check_references(
        &self,
        kind: DocumentKind,
        req: &CreateRequest,
    ) -> ReconcileResult<()> {
        if kind == DocumentKind::Invoice {
            for (field, value) in [
                ("customer_id", req.customer_id),
                ("vehicle_id", req.vehicle_id),
                ("job_type_id", req.job_type_id),
            ] {
                if value.is_none() {
                    return Err(ReconcileError::InvalidFormat {
                        field,
                        reason: "required for invoices".into(),
                    });
                }
            }
        }

        let refs = self.db.references();

        if let Some(customer_id) = req.customer_id {
            if !refs.customer_exists(customer_id).await? {
                return Err(ReconcileError::not_found("Customer", customer_id));
            }
        }
        if let Some(vehicle_id) = req.vehicle_id {
            let Some(customer_id) = req.customer_id else {
                return Err(ReconcileError::InvalidFormat {
                    field: "vehicle_id",
                    reason: "a vehicle requires its owning customer".into(),
                });
            };
            if !refs.vehicle_belongs_to(vehicle_id, customer_id).await? {
                return Err(ReconcileError::not_found("Vehicle", vehicle_id));
            }
        }
        if let Some(job_type_id) = req.job_type_id {
            if !refs.job_type_exists(job_type_id).await? {
                return Err(ReconcileError::not_found("Job type", job_type_id));
            }
        }

        Ok(())
    }

    /// Resolves every requested material against the catalog.
    ///
    /// Missing or inactive materials reject the whole request; the returned
    /// pairs carry the catalog row whose price will be snapshotted.
    async fn resolve_materials(
        &self,
        requests: &[MaterialRequest],
    ) -> ReconcileResult<Vec<(MaterialRequest, Material)>> {
        let materials = self.db.materials();
        let mut resolved = Vec::with_capacity(requests.len());

        for request in requests {
            let material = materials
                .get_by_id(request.material_id)
                .await?
                .filter(|m| m.is_active)
                .ok_or_else(|| ReconcileError::not_found("Material", request.material_id))?;
            resolved.push((*request, material));
        }

        Ok(resolved)
    }

    /// [`Self::resolve_materials`] on an open transaction, so the snapshotted
    /// prices come from the same state the commit applies to.
    async fn resolve_materials_tx(
        &self,
        conn: &mut SqliteConnection,
        requests: &[MaterialRequest],
    ) -> ReconcileResult<Vec<(MaterialRequest, Material)>> {
        let materials = self.db.materials();
        let mut resolved = Vec::with_capacity(requests.len());

        for request in requests {
            let material = materials
                .get_by_id_tx(&mut *conn, request.material_id)
                .await?
                .filter(|m| m.is_active)
                .ok_or_else(|| ReconcileError::not_found("Material", request.material_id))?;
            resolved.push((*request, material));
        }

        Ok(resolved)
    }
}

/// Sums line totals over the post-diff line set.
///
/// `to_keep` lines price as stored; `to_modify` lines take the new quantity
/// at the FROZEN snapshot price; additions take the current catalog price.
fn post_diff_line_totals(
    line_diff: &LineDiff,
    persisted: &[InvoiceLine],
    additions: &[(MaterialRequest, Material)],
) -> ReconcileResult<Money> {
    let mut total = Money::zero();

    for line in &line_diff.to_keep {
        total = total + line.line_total();
    }
    for change in &line_diff.to_modify {
        let line = persisted
            .iter()
            .find(|l| l.id == change.line_id)
            .ok_or_else(|| {
                DbError::Internal(format!("diffed line {} missing from load", change.line_id))
            })?;
        total = total + line.unit_price().multiply_quantity(change.new_quantity);
    }
    for (request, material) in additions {
        total = total + material.unit_price().multiply_quantity(request.quantity);
    }

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Repositorio de transacciones
//!
//! Un depósito enlaza viajes completados y sin pagar del conductor. Al
//! confirmarlo, esos viajes quedan marcados como pagados en la misma
//! transacción de base de datos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::transaction_dto::{CreateDepositRequest, CreateExpenseTransactionRequest, TransactionFilters};
use crate::models::transaction::{ApprovalStatus, Transaction, TransactionType, TransactionView, UnpaidSummary};
use crate::models::trip::UnpaidTrip;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::utils::validation::{end_of_day, start_of_day};

const TRANSACTION_VIEW_SELECT: &str = r#"
    SELECT tr.*,
           cb.full_name AS created_by_name,
           cf.full_name AS confirmed_by_name,
           v.license_plate AS vehicle_plate,
           ARRAY(SELECT tt.trip_id FROM transaction_trips tt WHERE tt.transaction_id = tr.id) AS trip_ids
    FROM transactions tr
    LEFT JOIN users cb ON cb.id = tr.created_by
    LEFT JOIN users cf ON cf.id = tr.confirmed_by
    LEFT JOIN vehicles v ON v.id = tr.vehicle_id
"#;

const TRANSACTION_FILTERS: &str = r#"
    WHERE ($1::transaction_type IS NULL OR tr.type = $1)
      AND ($2::approval_status IS NULL OR tr.status = $2)
      AND ($3::uuid IS NULL OR tr.created_by = $3)
      AND ($4::timestamptz IS NULL OR tr.transaction_date >= $4)
      AND ($5::timestamptz IS NULL OR tr.transaction_date <= $5)
"#;

/// Viajes completados, sin pagar y sin un depósito pendiente
const UNPAID_TRIPS: &str = r#"
    SELECT t.id, t.trip_code, COALESCE(t.final_price, 0) AS final_price, t.completed_time
    FROM trips t
    WHERE t.driver_id = $1
      AND t.status = 'completed'
      AND t.is_paid = FALSE
      AND NOT EXISTS (
          SELECT 1 FROM transaction_trips tt
          JOIN transactions x ON x.id = tt.transaction_id
          WHERE tt.trip_id = t.id AND x.status = 'pending'
      )
"#;

pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn unpaid_trips(&self, driver_id: Uuid) -> AppResult<Vec<UnpaidTrip>> {
        let sql = format!("{} ORDER BY t.completed_time", UNPAID_TRIPS);
        let trips = sqlx::query_as::<_, UnpaidTrip>(&sql)
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(trips)
    }

    pub async fn unpaid_summary(&self, driver_id: Uuid) -> AppResult<UnpaidSummary> {
        let trips = self.unpaid_trips(driver_id).await?;
        let total_unpaid: Decimal = trips.iter().map(|t| t.final_price).sum();

        Ok(UnpaidSummary {
            total_unpaid,
            trip_count: trips.len(),
            trips,
        })
    }

    /// Registra un depósito pendiente. Todos los viajes deben pertenecer al
    /// conductor, estar completados y no estar pagados ni en otro depósito.
    pub async fn create_deposit(
        &self,
        driver_id: Uuid,
        request: CreateDepositRequest,
    ) -> AppResult<TransactionView> {
        let mut trip_ids = request.trip_ids;
        trip_ids.sort();
        trip_ids.dedup();

        let mut tx = self.pool.begin().await?;

        let sql = format!("{} AND t.id = ANY($2) FOR UPDATE OF t", UNPAID_TRIPS);
        let eligible = sqlx::query_as::<_, UnpaidTrip>(&sql)
            .bind(driver_id)
            .bind(&trip_ids)
            .fetch_all(&mut *tx)
            .await?;

        if eligible.len() != trip_ids.len() {
            return Err(AppError::BadRequest(format!(
                "{} de {} viaje(s) no se pueden depositar (no existen, no son suyos, no están completados o ya están pagados)",
                trip_ids.len() - eligible.len(),
                trip_ids.len()
            )));
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (type, created_by, amount, description, payment_method)
            VALUES ('deposit', $1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(request.amount)
        .bind(request.description)
        .bind(request.payment_method)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO transaction_trips (transaction_id, trip_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(transaction.id)
        .bind(&trip_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "💵 Depósito {} registrado por {} ({} viajes, {})",
            transaction.id,
            driver_id,
            trip_ids.len(),
            transaction.amount
        );

        self.find_view(transaction.id)
            .await?
            .ok_or_else(|| not_found_error("la transacción"))
    }

    pub async fn create_expense(
        &self,
        created_by: Uuid,
        request: CreateExpenseTransactionRequest,
    ) -> AppResult<TransactionView> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (type, created_by, amount, description, payment_method, vehicle_id, attachments)
            VALUES ('expense', $1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(created_by)
        .bind(request.amount)
        .bind(request.description.trim())
        .bind(request.payment_method)
        .bind(request.vehicle_id)
        .bind(&request.attachments)
        .fetch_one(&self.pool)
        .await?;

        info!("🧾 Gasto {} registrado por {}", transaction.id, created_by);

        self.find_view(transaction.id)
            .await?
            .ok_or_else(|| not_found_error("la transacción"))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    pub async fn find_view(&self, id: Uuid) -> AppResult<Option<TransactionView>> {
        let sql = format!("{} WHERE tr.id = $1", TRANSACTION_VIEW_SELECT);
        let transaction = sqlx::query_as::<_, TransactionView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    /// `created_by` fuerza el filtro por creador (los conductores solo ven lo suyo)
    pub async fn list(
        &self,
        filters: &TransactionFilters,
        created_by: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<(Vec<TransactionView>, i64)> {
        let creator = created_by.or(filters.driver_id);
        let from: Option<DateTime<Utc>> = filters.start_date.map(start_of_day);
        let to: Option<DateTime<Utc>> = filters.end_date.map(end_of_day);

        let sql = format!(
            "{} {} ORDER BY tr.transaction_date DESC LIMIT $6 OFFSET $7",
            TRANSACTION_VIEW_SELECT, TRANSACTION_FILTERS
        );
        let transactions = sqlx::query_as::<_, TransactionView>(&sql)
            .bind(filters.kind)
            .bind(filters.status)
            .bind(creator)
            .bind(from)
            .bind(to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM transactions tr {}", TRANSACTION_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filters.kind)
            .bind(filters.status)
            .bind(creator)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok((transactions, total))
    }

    /// Confirma una transacción pendiente y marca como pagados sus viajes
    pub async fn confirm(
        &self,
        id: Uuid,
        accountant_id: Uuid,
        accountant_note: Option<String>,
    ) -> AppResult<TransactionView> {
        let mut tx = self.pool.begin().await?;

        let confirmed = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'confirmed', confirmed_by = $2, confirmed_date = NOW(), accountant_note = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(accountant_id)
        .bind(accountant_note)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(confirmed) = confirmed else {
            tx.rollback().await?;
            return Err(self.not_pending_error(id).await);
        };

        let paid = if confirmed.kind == TransactionType::Deposit {
            sqlx::query(
                r#"
                UPDATE trips SET is_paid = TRUE, updated_at = NOW()
                WHERE id IN (SELECT trip_id FROM transaction_trips WHERE transaction_id = $1)
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        tx.commit().await?;

        info!("✅ Transacción {} confirmada por {} ({} viajes pagados)", id, accountant_id, paid);

        self.find_view(id)
            .await?
            .ok_or_else(|| not_found_error("la transacción"))
    }

    pub async fn reject(
        &self,
        id: Uuid,
        accountant_id: Uuid,
        rejection_reason: &str,
    ) -> AppResult<TransactionView> {
        let rejected = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'rejected', confirmed_by = $2, confirmed_date = NOW(), rejection_reason = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(accountant_id)
        .bind(rejection_reason.trim())
        .fetch_optional(&self.pool)
        .await?;

        if rejected.is_none() {
            return Err(self.not_pending_error(id).await);
        }

        info!("❌ Transacción {} rechazada por {}", id, accountant_id);

        self.find_view(id)
            .await?
            .ok_or_else(|| not_found_error("la transacción"))
    }

    /// 404 si no existe, 409 si ya fue procesada
    async fn not_pending_error(&self, id: Uuid) -> AppError {
        match self.find_by_id(id).await {
            Ok(Some(transaction)) if transaction.status != ApprovalStatus::Pending => {
                AppError::Conflict("La transacción ya fue procesada".to_string())
            }
            Ok(Some(_)) => AppError::Conflict("La transacción cambió durante la operación".to_string()),
            Ok(None) => not_found_error("la transacción"),
            Err(e) => e,
        }
    }
}

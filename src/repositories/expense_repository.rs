use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::expense_dto::{CreateExpenseRequest, ExpenseFilters, UpdateExpenseRequest};
use crate::models::expense::{Expense, ExpenseView};
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::PageParams;
use crate::utils::validation::{end_of_day, start_of_day};

pub(crate) const EXPENSE_VIEW_SELECT: &str = r#"
    SELECT e.*,
           cb.full_name AS created_by_name,
           ab.full_name AS approved_by_name,
           v.license_plate AS vehicle_plate,
           t.trip_code AS trip_code
    FROM expenses e
    LEFT JOIN users cb ON cb.id = e.created_by
    LEFT JOIN users ab ON ab.id = e.approved_by
    LEFT JOIN vehicles v ON v.id = e.vehicle_id
    LEFT JOIN trips t ON t.id = e.trip_id
"#;

const EXPENSE_FILTERS: &str = r#"
    WHERE ($1::expense_type IS NULL OR e.type = $1)
      AND ($2::approval_status IS NULL OR e.status = $2)
      AND ($3::uuid IS NULL OR e.vehicle_id = $3)
      AND ($4::uuid IS NULL OR e.created_by = $4)
      AND ($5::timestamptz IS NULL OR e.expense_date >= $5)
      AND ($6::timestamptz IS NULL OR e.expense_date <= $6)
"#;

pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, created_by: Uuid, request: CreateExpenseRequest) -> AppResult<ExpenseView> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (type, description, amount, created_by, expense_date,
                                  vehicle_id, trip_id, attachments, notes)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.kind)
        .bind(request.description.trim())
        .bind(request.amount)
        .bind(created_by)
        .bind(request.expense_date)
        .bind(request.vehicle_id)
        .bind(request.trip_id)
        .bind(&request.attachments)
        .bind(request.notes)
        .fetch_one(&self.pool)
        .await?;

        info!("🧾 Gasto {} creado ({})", expense.id, expense.amount);
        self.find_view(expense.id)
            .await?
            .ok_or_else(|| not_found_error("el gasto"))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    pub async fn find_view(&self, id: Uuid) -> AppResult<Option<ExpenseView>> {
        let sql = format!("{} WHERE e.id = $1", EXPENSE_VIEW_SELECT);
        let expense = sqlx::query_as::<_, ExpenseView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    pub async fn list(
        &self,
        filters: &ExpenseFilters,
        created_by: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<(Vec<ExpenseView>, i64)> {
        let from: Option<DateTime<Utc>> = filters.start_date.map(start_of_day);
        let to: Option<DateTime<Utc>> = filters.end_date.map(end_of_day);

        let sql = format!(
            "{} {} ORDER BY e.expense_date DESC LIMIT $7 OFFSET $8",
            EXPENSE_VIEW_SELECT, EXPENSE_FILTERS
        );
        let expenses = sqlx::query_as::<_, ExpenseView>(&sql)
            .bind(filters.kind)
            .bind(filters.status)
            .bind(filters.vehicle_id)
            .bind(created_by)
            .bind(from)
            .bind(to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM expenses e {}", EXPENSE_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filters.kind)
            .bind(filters.status)
            .bind(filters.vehicle_id)
            .bind(created_by)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok((expenses, total))
    }

    /// Solo actualiza gastos pendientes; `None` si ya no lo está
    pub async fn update(&self, id: Uuid, request: UpdateExpenseRequest) -> AppResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET type = COALESCE($2, type),
                description = COALESCE($3, description),
                amount = COALESCE($4, amount),
                expense_date = COALESCE($5, expense_date),
                vehicle_id = COALESCE($6, vehicle_id),
                trip_id = COALESCE($7, trip_id),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.kind)
        .bind(request.description)
        .bind(request.amount)
        .bind(request.expense_date)
        .bind(request.vehicle_id)
        .bind(request.trip_id)
        .bind(request.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    pub async fn approve(&self, id: Uuid, approver: Uuid, note: Option<String>) -> AppResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET status = 'confirmed', approved_by = $2, approved_date = NOW(),
                approval_note = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(expense) = &expense {
            info!("✅ Gasto {} aprobado por {}", expense.id, approver);
        }
        Ok(expense)
    }

    pub async fn reject(&self, id: Uuid, approver: Uuid, reason: &str) -> AppResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET status = 'rejected', approved_by = $2, approved_date = NOW(),
                rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver)
        .bind(reason.trim())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(expense) = &expense {
            info!("❌ Gasto {} rechazado por {}", expense.id, approver);
        }
        Ok(expense)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

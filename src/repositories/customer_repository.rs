use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::customer_dto::{CreateCustomerRequest, CustomerFilters, UpdateCustomerRequest};
use crate::models::customer::{Customer, CustomerTripSummary};
use crate::utils::errors::AppResult;
use crate::utils::pagination::PageParams;

const CUSTOMER_FILTERS: &str = r#"
    WHERE ($1::text IS NULL OR phone ILIKE '%' || $1 || '%' OR name ILIKE '%' || $1 || '%')
      AND ($2::boolean IS NULL OR is_vip = $2)
"#;

pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filters: &CustomerFilters,
        page: &PageParams,
    ) -> AppResult<(Vec<Customer>, i64)> {
        let search = filters
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let sql = format!(
            "SELECT * FROM customers {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
            CUSTOMER_FILTERS
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(search)
            .bind(filters.is_vip)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM customers {}", CUSTOMER_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(search)
            .bind(filters.is_vip)
            .fetch_one(&self.pool)
            .await?;

        Ok((customers, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn create(&self, request: CreateCustomerRequest) -> AppResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (phone, name, email, address, notes, is_vip)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.phone)
        .bind(request.name.trim())
        .bind(request.email)
        .bind(request.address)
        .bind(request.notes)
        .bind(request.is_vip)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, request: UpdateCustomerRequest) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                address = COALESCE($4, address),
                notes = COALESCE($5, notes),
                is_vip = COALESCE($6, is_vip),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.address)
        .bind(request.notes)
        .bind(request.is_vip)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Un cliente con viajes no se puede borrar (FK RESTRICT → 409)
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    pub async fn recent_trips(&self, customer_id: Uuid, limit: i64) -> AppResult<Vec<CustomerTripSummary>> {
        let trips = sqlx::query_as::<_, CustomerTripSummary>(
            r#"
            SELECT id, trip_code, scheduled_time, final_price, status
            FROM trips
            WHERE customer_id = $1
            ORDER BY scheduled_time DESC
            LIMIT $2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }
}

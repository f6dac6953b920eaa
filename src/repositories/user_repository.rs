//! Repositorio de usuarios
//!
//! Autenticación, gestión de conductores y reactivación de cuentas.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::driver_dto::{DriverFilters, UpdateDriverRequest};
use crate::models::user::{DriverListItem, DriverStatistics, User, UserRole};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::pagination::PageParams;

/// Datos para insertar un usuario (el hash ya calculado)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub commission_rate: Decimal,
    pub driver_license: Option<String>,
    pub license_expiry: Option<chrono::NaiveDate>,
    pub address: Option<String>,
    pub salary: Option<Decimal>,
}

const ACTIVE_TRIPS_SQL: &str =
    "SELECT COUNT(*) FROM trips WHERE driver_id = $1 AND status IN ('assigned', 'called', 'picked_up')";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn create(&self, user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, phone, role,
                               commission_rate, driver_license, license_expiry, address, salary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.full_name)
        .bind(user.phone)
        .bind(user.role)
        .bind(user.commission_rate)
        .bind(user.driver_license)
        .bind(user.license_expiry)
        .bind(user.address)
        .bind(user.salary)
        .fetch_one(&self.pool)
        .await?;

        info!("👤 Usuario creado: {} ({})", created.username, created.role);
        Ok(created)
    }

    // ---- Conductores ----

    pub async fn list_drivers(
        &self,
        filters: &DriverFilters,
        page: &PageParams,
    ) -> AppResult<(Vec<DriverListItem>, i64)> {
        const WHERE: &str = r#"
            WHERE u.role = 'driver'
              AND ($1::boolean IS NULL OR u.is_active = $1)
              AND ($2::text IS NULL
                   OR u.full_name ILIKE '%' || $2 || '%'
                   OR u.phone ILIKE '%' || $2 || '%'
                   OR u.username ILIKE '%' || $2 || '%')
        "#;

        let search = filters
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let list_sql = format!(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.phone, u.is_active,
                   u.driver_license, u.license_expiry, u.address, u.salary, u.created_at,
                   v.id AS current_vehicle_id, v.license_plate AS current_vehicle_plate
            FROM users u
            LEFT JOIN LATERAL (
                SELECT id, license_plate FROM vehicles
                WHERE current_driver_id = u.id
                ORDER BY updated_at DESC
                LIMIT 1
            ) v ON TRUE
            {}
            ORDER BY u.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            WHERE
        );

        let drivers = sqlx::query_as::<_, DriverListItem>(&list_sql)
            .bind(filters.is_active())
            .bind(search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM users u {}", WHERE);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filters.is_active())
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        Ok((drivers, total))
    }

    pub async fn find_driver(&self, id: Uuid) -> AppResult<Option<User>> {
        let driver = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND role = 'driver'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn current_vehicle(&self, driver_id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE current_driver_id = $1 ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Totales de los viajes completados por el conductor
    pub async fn driver_statistics(&self, driver_id: Uuid) -> AppResult<DriverStatistics> {
        let stats = sqlx::query_as::<_, DriverStatistics>(
            r#"
            SELECT COUNT(*) AS total_trips,
                   COALESCE(SUM(final_price), 0) AS total_revenue,
                   COALESCE(SUM(distance), 0)::float8 AS total_distance
            FROM trips
            WHERE driver_id = $1 AND status = 'completed'
            "#,
        )
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn update_driver(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> AppResult<Option<User>> {
        let driver = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                driver_license = COALESCE($5, driver_license),
                license_expiry = COALESCE($6, license_expiry),
                address = COALESCE($7, address),
                salary = COALESCE($8, salary),
                commission_rate = COALESCE($9, commission_rate),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1 AND role = 'driver'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.full_name)
        .bind(request.phone)
        .bind(request.email)
        .bind(request.driver_license)
        .bind(request.license_expiry)
        .bind(request.address)
        .bind(request.salary)
        .bind(request.commission_rate)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    /// Borrado definitivo: libera los vehículos y elimina la cuenta.
    /// Falla con `Conflict` si el conductor tiene viajes en curso.
    pub async fn delete_driver(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let active: i64 = sqlx::query_scalar(ACTIVE_TRIPS_SQL)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if active > 0 {
            return Err(AppError::Conflict(format!(
                "El conductor tiene {} viaje(s) en curso",
                active
            )));
        }

        sqlx::query("UPDATE vehicles SET current_driver_id = NULL, updated_at = NOW() WHERE current_driver_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'driver'")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if deleted > 0 {
            info!("🗑️ Conductor {} eliminado", id);
        }
        Ok(deleted > 0)
    }

    // ---- Administración de cuentas ----

    pub async fn reactivate_all(&self) -> AppResult<u64> {
        let affected = sqlx::query("UPDATE users SET is_active = TRUE, updated_at = NOW() WHERE is_active = FALSE")
            .execute(&self.pool)
            .await?
            .rows_affected();

        info!("🔓 {} usuario(s) reactivado(s)", affected);
        Ok(affected)
    }

    /// Reactiva por id o, si no es un UUID, por username
    pub async fn reactivate(&self, id_or_username: &str) -> AppResult<Option<User>> {
        let user = match Uuid::parse_str(id_or_username) {
            Ok(id) => {
                sqlx::query_as::<_, User>(
                    "UPDATE users SET is_active = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as::<_, User>(
                    "UPDATE users SET is_active = TRUE, updated_at = NOW() WHERE username = $1 RETURNING *",
                )
                .bind(id_or_username)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(user)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

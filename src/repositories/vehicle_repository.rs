use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::vehicle_dto::{AddMaintenanceRequest, CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters};
use crate::models::vehicle::{
    MaintenanceRecord, Vehicle, VehicleRevenue, VehicleRevenueTrip, VehicleStatus, VehicleView,
};
use crate::utils::errors::AppResult;
use crate::utils::pagination::PageParams;

const VEHICLE_VIEW_SELECT: &str = r#"
    SELECT v.*, d.full_name AS current_driver_name, d.phone AS current_driver_phone
    FROM vehicles v
    LEFT JOIN users d ON d.id = v.current_driver_id
"#;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (license_plate, brand, model, year, seats, color, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.license_plate)
        .bind(&request.brand)
        .bind(&request.model)
        .bind(request.year)
        .bind(request.seats.unwrap_or(4))
        .bind(request.color)
        .bind(request.status.unwrap_or(VehicleStatus::Active))
        .fetch_one(&self.pool)
        .await?;

        info!("🚗 Vehículo creado: {}", vehicle.license_plate);
        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_view(&self, id: Uuid) -> AppResult<Option<VehicleView>> {
        let sql = format!("{} WHERE v.id = $1", VEHICLE_VIEW_SELECT);
        let vehicle = sqlx::query_as::<_, VehicleView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn license_plate_exists(&self, license_plate: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vehicles
                WHERE UPPER(license_plate) = UPPER($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(license_plate.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    /// Vehículos no dados de baja, más recientes primero
    pub async fn list(
        &self,
        filters: &VehicleFilters,
        page: &PageParams,
    ) -> AppResult<(Vec<VehicleView>, i64)> {
        let sql = format!(
            "{} WHERE v.is_active = TRUE AND ($1::vehicle_status IS NULL OR v.status = $1) \
             ORDER BY v.created_at DESC LIMIT $2 OFFSET $3",
            VEHICLE_VIEW_SELECT
        );

        let vehicles = sqlx::query_as::<_, VehicleView>(&sql)
            .bind(filters.status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vehicles v WHERE v.is_active = TRUE AND ($1::vehicle_status IS NULL OR v.status = $1)",
        )
        .bind(filters.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((vehicles, total))
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET license_plate = COALESCE($2, license_plate),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                year = COALESCE($5, year),
                seats = COALESCE($6, seats),
                color = COALESCE($7, color),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.license_plate)
        .bind(request.brand)
        .bind(request.model)
        .bind(request.year)
        .bind(request.seats)
        .bind(request.color)
        .bind(request.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Baja lógica: el vehículo deja de listarse y de poder asignarse
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE vehicles
            SET is_active = FALSE, status = 'inactive', current_driver_id = NULL, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    // ---- Mantenimiento ----

    pub async fn maintenance_history(&self, vehicle_id: Uuid) -> AppResult<Vec<MaintenanceRecord>> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM vehicle_maintenance WHERE vehicle_id = $1 ORDER BY service_date DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn add_maintenance(
        &self,
        vehicle_id: Uuid,
        request: AddMaintenanceRequest,
    ) -> AppResult<MaintenanceRecord> {
        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO vehicle_maintenance (vehicle_id, service_date, description, cost, odometer, performed_by)
            VALUES ($1, COALESCE($2, NOW()), $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(request.service_date)
        .bind(request.description.trim())
        .bind(request.cost)
        .bind(request.odometer)
        .bind(request.performed_by)
        .fetch_one(&self.pool)
        .await?;

        info!("🔧 Mantenimiento registrado para el vehículo {}", vehicle_id);
        Ok(record)
    }

    // ---- Ingresos ----

    pub async fn revenue(
        &self,
        vehicle_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<VehicleRevenue> {
        let trips = sqlx::query_as::<_, VehicleRevenueTrip>(
            r#"
            SELECT id, trip_code, final_price, distance, completed_time
            FROM trips
            WHERE vehicle_id = $1
              AND status = 'completed'
              AND ($2::timestamptz IS NULL OR completed_time >= $2)
              AND ($3::timestamptz IS NULL OR completed_time <= $3)
            ORDER BY completed_time DESC
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(VehicleRevenue::from_trips(trips))
    }
}

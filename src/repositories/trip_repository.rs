//! Repositorio de viajes
//!
//! Además del CRUD, aquí se aplican los planes de la máquina de estados.
//! Toda escritura que toca varias tablas (creación, asignación,
//! transición) corre dentro de una única transacción y los UPDATE de
//! estado van protegidos por el estado esperado: si otro request ya movió
//! el viaje, el UPDATE no afecta filas y se devuelve `InvalidTransition`.

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::dto::trip_dto::{CreateTripRequest, TripFilters, UpdateTripRequest};
use crate::models::customer::Customer;
use crate::models::trip::{StatusHistoryEntry, Trip, TripDetail, TripNote, TripStatus, TripView};
use crate::models::user::{User, UserRole};
use crate::models::vehicle::Vehicle;
use crate::services::trip_state_machine::{TransitionError, TransitionPlan};
use crate::utils::errors::{bad_request_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::utils::validation::{end_of_day, start_of_day};

pub(crate) const TRIP_VIEW_SELECT: &str = r#"
    SELECT t.*,
           v.license_plate AS vehicle_plate,
           d.full_name AS driver_name,
           d.phone AS driver_phone,
           disp.full_name AS dispatcher_name
    FROM trips t
    LEFT JOIN vehicles v ON v.id = t.vehicle_id
    LEFT JOIN users d ON d.id = t.driver_id
    LEFT JOIN users disp ON disp.id = t.dispatcher_id
"#;

const TRIP_FILTERS: &str = r#"
    WHERE ($1::trip_status IS NULL OR t.status = $1)
      AND ($2::uuid IS NULL OR t.driver_id = $2)
      AND ($3::uuid IS NULL OR t.vehicle_id = $3)
      AND ($4::text IS NULL OR t.customer_phone = $4)
      AND ($5::timestamptz IS NULL OR t.scheduled_time >= $5)
      AND ($6::timestamptz IS NULL OR t.scheduled_time <= $6)
"#;

/// Código legible del viaje: `TX` + `yyMMdd` + 6 alfanuméricos en mayúscula
pub fn generate_trip_code(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("TX{}{}", now.format("%y%m%d"), suffix)
}

/// Criterios de búsqueda de viajes ya normalizados
#[derive(Debug, Clone, Default)]
pub struct TripQuery {
    pub status: Option<TripStatus>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl From<TripFilters> for TripQuery {
    fn from(filters: TripFilters) -> Self {
        Self {
            status: filters.status,
            driver_id: filters.driver_id,
            vehicle_id: filters.vehicle_id,
            customer_phone: filters.customer_phone.filter(|p| !p.trim().is_empty()),
            from: filters.start_date.map(start_of_day),
            to: filters.end_date.map(end_of_day),
        }
    }
}

async fn insert_history(
    conn: &mut PgConnection,
    trip_id: Uuid,
    status: TripStatus,
    changed_by: Uuid,
    changed_at: DateTime<Utc>,
    note: Option<&str>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO trip_status_history (trip_id, status, changed_at, changed_by, note)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(trip_id)
    .bind(status)
    .bind(changed_at)
    .bind(changed_by)
    .bind(note)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verifica que vehículo y conductor puedan recibir un viaje
    pub async fn check_assignment(&self, vehicle_id: Uuid, driver_id: Uuid) -> AppResult<()> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| bad_request_error("El vehículo no existe"))?;

        if !vehicle.is_assignable() {
            return Err(AppError::BadRequest(format!(
                "El vehículo {} no está disponible",
                vehicle.license_plate
            )));
        }

        let driver = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await?
            .filter(|user| user.role == UserRole::Driver)
            .ok_or_else(|| bad_request_error("El conductor no es válido"))?;

        if !driver.is_active {
            return Err(bad_request_error("El conductor está desactivado"));
        }

        Ok(())
    }

    /// Crea el viaje, registra (o actualiza) al cliente por su teléfono y
    /// deja el estado inicial en el historial
    pub async fn create(&self, request: CreateTripRequest, dispatcher_id: Uuid) -> AppResult<Trip> {
        let assignment = match (request.vehicle_id, request.driver_id) {
            (Some(vehicle_id), Some(driver_id)) => {
                self.check_assignment(vehicle_id, driver_id).await?;
                Some((vehicle_id, driver_id))
            }
            (None, None) => None,
            _ => return Err(bad_request_error("Debe indicar vehículo y conductor a la vez")),
        };

        let now = Utc::now();
        let trip_code = generate_trip_code(now);
        let customer_name = request
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (phone, name, total_trips)
            VALUES ($1, COALESCE($2, $1), 1)
            ON CONFLICT (phone) DO UPDATE
            SET name = COALESCE($2, customers.name),
                total_trips = customers.total_trips + 1,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&request.customer_phone)
        .bind(customer_name)
        .fetch_one(&mut *tx)
        .await?;

        let status = if assignment.is_some() {
            TripStatus::Assigned
        } else {
            TripStatus::New
        };

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (trip_code, customer_id, customer_phone, customer_name,
                               pickup_location, dropoff_location, scheduled_time, passengers,
                               customer_note, estimated_price, discount, distance,
                               vehicle_id, driver_id, dispatcher_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(&trip_code)
        .bind(customer.id)
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(request.pickup_location.trim())
        .bind(request.dropoff_location.trim())
        .bind(request.scheduled_time)
        .bind(request.passengers.unwrap_or(1))
        .bind(request.customer_note)
        .bind(request.estimated_price)
        .bind(request.discount.unwrap_or(Decimal::ZERO))
        .bind(request.distance)
        .bind(assignment.map(|(vehicle_id, _)| vehicle_id))
        .bind(assignment.map(|(_, driver_id)| driver_id))
        .bind(dispatcher_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        insert_history(&mut tx, trip.id, TripStatus::New, dispatcher_id, now, Some("Viaje creado")).await?;
        if assignment.is_some() {
            insert_history(&mut tx, trip.id, TripStatus::Assigned, dispatcher_id, now, Some("Asignado al crear")).await?;
        }

        tx.commit().await?;

        info!("🚕 Viaje {} creado ({})", trip.trip_code, trip.status);
        Ok(trip)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    pub async fn find_view(&self, id: Uuid) -> AppResult<Option<TripView>> {
        let sql = format!("{} WHERE t.id = $1", TRIP_VIEW_SELECT);
        let trip = sqlx::query_as::<_, TripView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<Option<TripDetail>> {
        let Some(trip) = self.find_view(id).await? else {
            return Ok(None);
        };

        let status_history = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            SELECT h.status, h.changed_at, h.changed_by, u.full_name AS changed_by_name, h.note
            FROM trip_status_history h
            LEFT JOIN users u ON u.id = h.changed_by
            WHERE h.trip_id = $1
            ORDER BY h.changed_at, h.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let notes = sqlx::query_as::<_, TripNote>(
            r#"
            SELECT n.id, n.trip_id, n.content, n.created_by, u.full_name AS created_by_name, n.created_at
            FROM trip_notes n
            LEFT JOIN users u ON u.id = n.created_by
            WHERE n.trip_id = $1
            ORDER BY n.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TripDetail {
            trip,
            status_history,
            notes,
        }))
    }

    pub async fn list(&self, query: &TripQuery, page: &PageParams) -> AppResult<(Vec<TripView>, i64)> {
        let sql = format!(
            "{} {} ORDER BY t.scheduled_time DESC LIMIT $7 OFFSET $8",
            TRIP_VIEW_SELECT, TRIP_FILTERS
        );
        let trips = sqlx::query_as::<_, TripView>(&sql)
            .bind(query.status)
            .bind(query.driver_id)
            .bind(query.vehicle_id)
            .bind(query.customer_phone.as_deref())
            .bind(query.from)
            .bind(query.to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM trips t {}", TRIP_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(query.status)
            .bind(query.driver_id)
            .bind(query.vehicle_id)
            .bind(query.customer_phone.as_deref())
            .bind(query.from)
            .bind(query.to)
            .fetch_one(&self.pool)
            .await?;

        Ok((trips, total))
    }

    /// Edita los datos de la reserva; un viaje bloqueado no se toca
    pub async fn update(&self, id: Uuid, request: UpdateTripRequest) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET pickup_location = COALESCE($2, pickup_location),
                dropoff_location = COALESCE($3, dropoff_location),
                scheduled_time = COALESCE($4, scheduled_time),
                estimated_price = COALESCE($5, estimated_price),
                passengers = COALESCE($6, passengers),
                customer_note = COALESCE($7, customer_note),
                discount = COALESCE($8, discount),
                updated_at = NOW()
            WHERE id = $1 AND is_locked = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.pickup_location)
        .bind(request.dropoff_location)
        .bind(request.scheduled_time)
        .bind(request.estimated_price)
        .bind(request.passengers)
        .bind(request.customer_note)
        .bind(request.discount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trip)
    }

    /// Asigna (desde `new`) o reasigna (desde `assigned`) vehículo y conductor
    pub async fn assign(
        &self,
        trip: &Trip,
        vehicle_id: Uuid,
        driver_id: Uuid,
        actor: Uuid,
    ) -> AppResult<Trip> {
        let note = if trip.status == TripStatus::Assigned {
            "Reasignado"
        } else {
            "Asignado"
        };

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET vehicle_id = $2, driver_id = $3, status = 'assigned', updated_at = NOW()
            WHERE id = $1 AND status = $4 AND is_locked = FALSE
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(vehicle_id)
        .bind(driver_id)
        .bind(trip.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TransitionError::InvalidTransition {
            from: trip.status,
            to: TripStatus::Assigned,
        })?;

        insert_history(&mut tx, trip.id, TripStatus::Assigned, actor, Utc::now(), Some(note)).await?;
        tx.commit().await?;

        info!("🚕 Viaje {} {} (conductor {})", updated.trip_code, note.to_lowercase(), driver_id);
        Ok(updated)
    }

    /// Aplica un plan de transición de forma atómica
    pub async fn apply_transition(&self, plan: &TransitionPlan) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = match &plan.completion {
            None => {
                sqlx::query_as::<_, Trip>(
                    r#"
                    UPDATE trips SET status = $2, updated_at = NOW()
                    WHERE id = $1 AND status = $3
                    RETURNING *
                    "#,
                )
                .bind(plan.trip_id)
                .bind(plan.to)
                .bind(plan.from)
                .fetch_optional(&mut *tx)
                .await?
            }
            Some(effects) => {
                sqlx::query_as::<_, Trip>(
                    r#"
                    UPDATE trips
                    SET status = $2,
                        actual_price = $4,
                        final_price = $5,
                        distance = $6,
                        commission_amount = $7,
                        completed_time = $8,
                        is_locked = TRUE,
                        updated_at = NOW()
                    WHERE id = $1 AND status = $3
                    RETURNING *
                    "#,
                )
                .bind(plan.trip_id)
                .bind(plan.to)
                .bind(plan.from)
                .bind(effects.actual_price)
                .bind(effects.final_price)
                .bind(effects.distance)
                .bind(effects.commission_amount)
                .bind(effects.completed_time)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let trip = trip.ok_or(TransitionError::InvalidTransition {
            from: plan.from,
            to: plan.to,
        })?;

        insert_history(
            &mut tx,
            plan.trip_id,
            plan.history.status,
            plan.history.changed_by,
            plan.history.changed_at,
            plan.history.note.as_deref(),
        )
        .await?;

        if let Some(effects) = &plan.completion {
            if let Some(vehicle_id) = effects.vehicle_id {
                sqlx::query(
                    "UPDATE vehicles SET total_revenue = total_revenue + $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(vehicle_id)
                .bind(effects.final_price)
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query(
                "UPDATE customers SET total_spent = total_spent + $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(effects.customer_id)
            .bind(effects.final_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("🔄 Viaje {}: {} → {}", trip.trip_code, plan.from, plan.to);
        Ok(trip)
    }

    /// Porcentaje de comisión del dispatcher que reservó el viaje
    pub async fn dispatcher_commission_rate(&self, dispatcher_id: Uuid) -> AppResult<Option<Decimal>> {
        let rate: Option<Decimal> =
            sqlx::query_scalar("SELECT commission_rate FROM users WHERE id = $1")
                .bind(dispatcher_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(rate)
    }

    pub async fn add_note(&self, trip_id: Uuid, content: &str, author: Uuid) -> AppResult<TripNote> {
        let note = sqlx::query_as::<_, TripNote>(
            r#"
            WITH inserted AS (
                INSERT INTO trip_notes (trip_id, content, created_by)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.trip_id, i.content, i.created_by, u.full_name AS created_by_name, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.created_by
            "#,
        )
        .bind(trip_id)
        .bind(content.trim())
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    /// Viajes en curso (assigned, called, picked_up) de un vehículo
    pub async fn active_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<TripView>> {
        let sql = format!(
            "{} WHERE t.vehicle_id = $1 AND t.status IN ('assigned', 'called', 'picked_up') \
             ORDER BY t.scheduled_time",
            TRIP_VIEW_SELECT
        );
        let trips = sqlx::query_as::<_, TripView>(&sql)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(trips)
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<TripView>> {
        let sql = format!("{} ORDER BY t.created_at DESC LIMIT $1", TRIP_VIEW_SELECT);
        let trips = sqlx::query_as::<_, TripView>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_trip_code_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 8, 30, 0).unwrap();
        let code = generate_trip_code(now);

        assert_eq!(code.len(), 14);
        assert!(code.starts_with("TX260309"));
        assert!(code[8..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_trip_query_from_filters() {
        let filters = TripFilters {
            status: Some(TripStatus::Called),
            customer_phone: Some("  ".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..Default::default()
        };

        let query = TripQuery::from(filters);
        assert_eq!(query.status, Some(TripStatus::Called));
        assert!(query.customer_phone.is_none());
        assert!(query.from.unwrap() < query.to.unwrap());
    }
}

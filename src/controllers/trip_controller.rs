use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::trip_dto::{
    AddNoteRequest, AssignTripRequest, CreateTripRequest, TripFilters, UpdateTripRequest,
    UpdateTripStatusRequest,
};
use crate::models::auth::AuthenticatedUser;
use crate::models::trip::{Trip, TripDetail, TripNote, TripStatus, TripView};
use crate::models::user::UserRole;
use crate::repositories::trip_repository::{TripQuery, TripRepository};
use crate::services::trip_state_machine::{check_assignable, plan_transition, TransitionRequest};
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

pub struct TripController {
    repository: TripRepository,
}

impl TripController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TripRepository::new(pool),
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Trip> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("el viaje"))
    }

    async fn view(&self, id: Uuid) -> AppResult<TripView> {
        self.repository
            .find_view(id)
            .await?
            .ok_or_else(|| not_found_error("el viaje"))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateTripRequest,
    ) -> AppResult<ApiResponse<TripView>> {
        let trip = self.repository.create(request, user.id).await?;
        let view = self.view(trip.id).await?;

        Ok(ApiResponse::success_with_message(view, "Viaje creado exitosamente"))
    }

    /// Los conductores solo ven sus propios viajes
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: TripFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<TripView>>> {
        let mut query = TripQuery::from(filters);
        if user.is(UserRole::Driver) {
            query.driver_id = Some(user.id);
        }

        let (trips, total) = self.repository.list(&query, &page).await?;
        Ok(ApiResponse::paginated(trips, Pagination::new(total, &page)))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<TripDetail>> {
        let detail = self
            .repository
            .detail(id)
            .await?
            .ok_or_else(|| not_found_error("el viaje"))?;

        if user.is(UserRole::Driver) && detail.trip.trip.driver_id != Some(user.id) {
            return Err(forbidden_error("ver este viaje"));
        }

        Ok(ApiResponse::success(detail))
    }

    pub async fn update(&self, id: Uuid, request: UpdateTripRequest) -> AppResult<ApiResponse<TripView>> {
        let trip = self.load(id).await?;
        if trip.is_locked {
            return Err(AppError::Conflict(format!(
                "El viaje {} está bloqueado y no se puede editar",
                trip.trip_code
            )));
        }

        self.repository
            .update(id, request)
            .await?
            .ok_or_else(|| AppError::Conflict("El viaje fue bloqueado durante la edición".to_string()))?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Viaje actualizado exitosamente"))
    }

    /// Asigna desde `new` (transición a `assigned`) o reasigna un viaje ya asignado
    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AssignTripRequest,
    ) -> AppResult<ApiResponse<TripView>> {
        let trip = self.load(id).await?;
        if trip.is_locked {
            return Err(AppError::Conflict(format!(
                "El viaje {} está bloqueado",
                trip.trip_code
            )));
        }

        check_assignable(trip.status)?;

        self.repository
            .check_assignment(request.vehicle_id, request.driver_id)
            .await?;
        self.repository
            .assign(&trip, request.vehicle_id, request.driver_id, user.id)
            .await?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Viaje asignado exitosamente"))
    }

    /// Cambio de estado; un conductor solo puede mover sus propios viajes
    pub async fn update_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateTripStatusRequest,
    ) -> AppResult<ApiResponse<TripView>> {
        let trip = self.load(id).await?;

        if user.is(UserRole::Driver) && trip.driver_id != Some(user.id) {
            return Err(forbidden_error("cambiar el estado de un viaje que no tiene asignado"));
        }

        let commission_rate = if request.status == TripStatus::Completed {
            self.repository
                .dispatcher_commission_rate(trip.dispatcher_id)
                .await?
        } else {
            None
        };

        let plan = plan_transition(
            &trip,
            TransitionRequest {
                target: request.status,
                actor: user.id,
                note: request.note,
                actual_price: request.actual_price,
                distance: request.distance,
            },
            commission_rate,
            Utc::now(),
        )?;

        self.repository.apply_transition(&plan).await?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(
            view,
            format!("Estado actualizado a '{}'", plan.to),
        ))
    }

    pub async fn add_note(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: AddNoteRequest,
    ) -> AppResult<ApiResponse<TripNote>> {
        let trip = self.load(id).await?;
        if user.is(UserRole::Driver) && trip.driver_id != Some(user.id) {
            return Err(forbidden_error("agregar notas a este viaje"));
        }

        let note = self.repository.add_note(id, &request.content, user.id).await?;
        Ok(ApiResponse::success_with_message(note, "Nota agregada"))
    }

    /// Cancelación administrativa; respeta la tabla de transiciones
    pub async fn cancel(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<TripView>> {
        let trip = self.load(id).await?;

        let plan = plan_transition(
            &trip,
            TransitionRequest {
                target: TripStatus::Cancelled,
                actor: user.id,
                note: Some("Cancelado por administración".to_string()),
                actual_price: None,
                distance: None,
            },
            None,
            Utc::now(),
        )?;
        self.repository.apply_transition(&plan).await?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Viaje cancelado"))
    }

    pub async fn active_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<ApiResponse<Vec<TripView>>> {
        let trips = self.repository.active_by_vehicle(vehicle_id).await?;
        Ok(ApiResponse::success(trips))
    }
}

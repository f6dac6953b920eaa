//! Controlador de handovers (check-in / check-out de vehículos)

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::handover_dto::{CreateHandoverRequest, HandoverFilters, UpdateHandoverRequest};
use crate::models::auth::AuthenticatedUser;
use crate::models::handover::{Handover, HandoverType, HandoverView};
use crate::models::user::UserRole;
use crate::repositories::handover_repository::HandoverRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{bad_request_error, forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

fn already_completed() -> AppError {
    AppError::Conflict("El handover ya está completado".to_string())
}

pub struct HandoverController {
    handovers: HandoverRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
}

impl HandoverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            handovers: HandoverRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Un conductor registra a su nombre; admin/dispatcher indican el conductor
    async fn resolve_driver(&self, user: &AuthenticatedUser, requested: Option<Uuid>) -> AppResult<Uuid> {
        if user.is(UserRole::Driver) {
            return match requested {
                Some(id) if id != user.id => Err(forbidden_error("registrar un handover de otro conductor")),
                _ => Ok(user.id),
            };
        }

        let driver_id = requested.ok_or_else(|| bad_request_error("Debe indicar el conductor (driver_id)"))?;
        match self.users.find_driver(driver_id).await? {
            Some(driver) if driver.is_active => Ok(driver_id),
            Some(_) => Err(bad_request_error("El conductor está desactivado")),
            None => Err(bad_request_error("El conductor indicado no existe")),
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Handover> {
        self.handovers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("el handover"))
    }

    async fn view(&self, id: Uuid) -> AppResult<HandoverView> {
        self.handovers
            .find_view(id)
            .await?
            .ok_or_else(|| not_found_error("el handover"))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        kind: HandoverType,
        request: CreateHandoverRequest,
    ) -> AppResult<ApiResponse<HandoverView>> {
        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("el vehículo"))?;
        if !vehicle.is_active {
            return Err(bad_request_error("El vehículo está dado de baja"));
        }

        let driver_id = self.resolve_driver(user, request.driver_id).await?;
        let handover = self.handovers.create(kind, driver_id, request).await?;

        info!(
            "🚕 {} registrado: vehículo {} / conductor {}",
            kind.label(),
            vehicle.license_plate,
            driver_id
        );

        Ok(ApiResponse::success_with_message(
            handover,
            format!("{} registrado exitosamente", kind.label()),
        ))
    }

    /// Los conductores solo listan sus propios handovers
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: HandoverFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<HandoverView>>> {
        let scope = user.is(UserRole::Driver).then_some(user.id);
        let (handovers, total) = self.handovers.list(&filters, scope, &page).await?;
        Ok(ApiResponse::paginated(handovers, Pagination::new(total, &page)))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<HandoverView>> {
        Ok(ApiResponse::success(self.view(id).await?))
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateHandoverRequest,
    ) -> AppResult<ApiResponse<HandoverView>> {
        let handover = self.load(id).await?;

        if user.is(UserRole::Driver) && handover.driver_id != Some(user.id) {
            return Err(forbidden_error("editar este handover"));
        }
        if handover.is_completed {
            return Err(already_completed());
        }

        self.handovers
            .update(id, request)
            .await?
            .ok_or_else(already_completed)?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Handover actualizado exitosamente"))
    }

    pub async fn complete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<HandoverView>> {
        self.load(id).await?;
        self.handovers
            .complete(id, user.id)
            .await?
            .ok_or_else(already_completed)?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Handover completado"))
    }
}

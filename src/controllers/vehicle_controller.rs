use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{
    AddMaintenanceRequest, CreateVehicleRequest, DateRangeQuery, UpdateVehicleRequest, VehicleFilters,
};
use crate::models::vehicle::{MaintenanceRecord, Vehicle, VehicleRevenue, VehicleView};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    async fn ensure_exists(&self, id: Uuid) -> AppResult<Vehicle> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("el vehículo"))
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<ApiResponse<Vehicle>> {
        // Verificar que la matrícula no exista
        if self
            .repository
            .license_plate_exists(&request.license_plate, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "La matrícula {} ya está registrada",
                request.license_plate
            )));
        }

        let vehicle = self.repository.create(request).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehículo creado exitosamente"))
    }

    pub async fn list(
        &self,
        filters: VehicleFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<VehicleView>>> {
        let (vehicles, total) = self.repository.list(&filters, &page).await?;
        Ok(ApiResponse::paginated(vehicles, Pagination::new(total, &page)))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<VehicleView>> {
        let vehicle = self
            .repository
            .find_view(id)
            .await?
            .ok_or_else(|| not_found_error("el vehículo"))?;

        Ok(ApiResponse::success(vehicle))
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<ApiResponse<Vehicle>> {
        if let Some(plate) = &request.license_plate {
            if self.repository.license_plate_exists(plate, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "La matrícula {} ya está registrada",
                    plate
                )));
            }
        }

        let vehicle = self
            .repository
            .update(id, request)
            .await?
            .ok_or_else(|| not_found_error("el vehículo"))?;

        Ok(ApiResponse::success_with_message(vehicle, "Vehículo actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.repository.soft_delete(id).await? {
            return Err(not_found_error("el vehículo"));
        }

        Ok(ApiResponse::message("Vehículo dado de baja exitosamente"))
    }

    pub async fn maintenance_history(&self, id: Uuid) -> AppResult<ApiResponse<Vec<MaintenanceRecord>>> {
        self.ensure_exists(id).await?;
        let records = self.repository.maintenance_history(id).await?;
        Ok(ApiResponse::success(records))
    }

    pub async fn add_maintenance(
        &self,
        id: Uuid,
        request: AddMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceRecord>> {
        self.ensure_exists(id).await?;
        let record = self.repository.add_maintenance(id, request).await?;
        Ok(ApiResponse::success_with_message(record, "Mantenimiento registrado"))
    }

    pub async fn revenue(&self, id: Uuid, range: DateRangeQuery) -> AppResult<ApiResponse<VehicleRevenue>> {
        self.ensure_exists(id).await?;
        let (from, to) = range.bounds();
        let revenue = self.repository.revenue(id, from, to).await?;
        Ok(ApiResponse::success(revenue))
    }
}

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverFilters, DriverTripFilters, UpdateDriverRequest};
use crate::models::trip::TripView;
use crate::models::user::{DriverDetail, DriverListItem, UserResponse, UserRole};
use crate::repositories::trip_repository::{TripQuery, TripRepository};
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::services::auth_service::hash_password;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};
use crate::utils::validation::{end_of_day, start_of_day};

pub struct DriverController {
    users: UserRepository,
    trips: TripRepository,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filters: DriverFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<DriverListItem>>> {
        let (drivers, total) = self.users.list_drivers(&filters, &page).await?;
        Ok(ApiResponse::paginated(drivers, Pagination::new(total, &page)))
    }

    /// Alta de conductor; sin username se usa el teléfono
    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<ApiResponse<UserResponse>> {
        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(request.phone.trim())
            .to_string();
        let email = request.email.trim().to_lowercase();

        if self.users.username_or_email_exists(&username, &email).await? {
            return Err(AppError::Conflict(
                "El usuario o el email ya están registrados".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let driver = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                full_name: request.full_name.trim().to_string(),
                phone: request.phone,
                role: UserRole::Driver,
                commission_rate: Decimal::ZERO,
                driver_license: request.driver_license,
                license_expiry: request.license_expiry,
                address: request.address,
                salary: request.salary,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(driver),
            "Conductor creado exitosamente",
        ))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<DriverDetail>> {
        let driver = self
            .users
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("el conductor"))?;

        let current_vehicle = self.users.current_vehicle(id).await?;
        let statistics = self.users.driver_statistics(id).await?;

        Ok(ApiResponse::success(DriverDetail {
            driver: UserResponse::from(driver),
            current_vehicle,
            statistics,
        }))
    }

    pub async fn update(&self, id: Uuid, request: UpdateDriverRequest) -> AppResult<ApiResponse<UserResponse>> {
        let driver = self
            .users
            .update_driver(id, request)
            .await?
            .ok_or_else(|| not_found_error("el conductor"))?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(driver),
            "Conductor actualizado exitosamente",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.users.delete_driver(id).await? {
            return Err(not_found_error("el conductor"));
        }

        Ok(ApiResponse::message("Conductor eliminado exitosamente"))
    }

    pub async fn trips(
        &self,
        id: Uuid,
        filters: DriverTripFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<TripView>>> {
        self.users
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("el conductor"))?;

        let query = TripQuery {
            status: filters.status,
            driver_id: Some(id),
            from: filters.start_date.map(start_of_day),
            to: filters.end_date.map(end_of_day),
            ..TripQuery::default()
        };

        let (trips, total) = self.trips.list(&query, &page).await?;
        Ok(ApiResponse::paginated(trips, Pagination::new(total, &page)))
    }
}

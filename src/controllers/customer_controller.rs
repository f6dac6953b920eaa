use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::customer_dto::{CreateCustomerRequest, CustomerFilters, UpdateCustomerRequest};
use crate::models::customer::{Customer, CustomerDetail};
use crate::models::trip::TripView;
use crate::repositories::customer_repository::CustomerRepository;
use crate::repositories::trip_repository::{TripQuery, TripRepository};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

const RECENT_TRIPS: i64 = 10;

pub struct CustomerController {
    customers: CustomerRepository,
    trips: TripRepository,
}

impl CustomerController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filters: CustomerFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<Customer>>> {
        let (customers, total) = self.customers.list(&filters, &page).await?;
        Ok(ApiResponse::paginated(customers, Pagination::new(total, &page)))
    }

    pub async fn create(&self, request: CreateCustomerRequest) -> AppResult<ApiResponse<Customer>> {
        if self.customers.find_by_phone(&request.phone).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Ya existe un cliente con el teléfono {}",
                request.phone
            )));
        }

        let customer = self.customers.create(request).await?;
        Ok(ApiResponse::success_with_message(customer, "Cliente creado exitosamente"))
    }

    /// Detalle con los últimos viajes del cliente
    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<CustomerDetail>> {
        let customer = self
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("el cliente"))?;

        let recent_trips = self.customers.recent_trips(id, RECENT_TRIPS).await?;

        Ok(ApiResponse::success(CustomerDetail {
            customer,
            recent_trips,
        }))
    }

    pub async fn update(&self, id: Uuid, request: UpdateCustomerRequest) -> AppResult<ApiResponse<Customer>> {
        let customer = self
            .customers
            .update(id, request)
            .await?
            .ok_or_else(|| not_found_error("el cliente"))?;

        Ok(ApiResponse::success_with_message(customer, "Cliente actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.customers.delete(id).await? {
            return Err(not_found_error("el cliente"));
        }

        Ok(ApiResponse::message("Cliente eliminado exitosamente"))
    }

    /// Historial por teléfono; funciona aunque el cliente no esté registrado
    pub async fn trips_by_phone(&self, phone: String, page: PageParams) -> AppResult<ApiResponse<Vec<TripView>>> {
        let query = TripQuery {
            customer_phone: Some(phone),
            ..TripQuery::default()
        };

        let (trips, total) = self.trips.list(&query, &page).await?;
        Ok(ApiResponse::paginated(trips, Pagination::new(total, &page)))
    }
}

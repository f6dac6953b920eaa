use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::expense_dto::{
    ApproveExpenseRequest, CreateExpenseRequest, ExpenseFilters, RejectExpenseRequest,
    UpdateExpenseRequest,
};
use crate::models::auth::AuthenticatedUser;
use crate::models::expense::{Expense, ExpenseView};
use crate::models::user::UserRole;
use crate::repositories::expense_repository::ExpenseRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{bad_request_error, forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

fn already_processed() -> AppError {
    AppError::Conflict("El gasto ya fue procesado".to_string())
}

pub struct ExpenseController {
    expenses: ExpenseRepository,
    vehicles: VehicleRepository,
    trips: TripRepository,
}

impl ExpenseController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            expenses: ExpenseRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    async fn check_references(&self, vehicle_id: Option<Uuid>, trip_id: Option<Uuid>) -> AppResult<()> {
        if let Some(vehicle_id) = vehicle_id {
            if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
                return Err(bad_request_error("El vehículo indicado no existe"));
            }
        }
        if let Some(trip_id) = trip_id {
            if self.trips.find_by_id(trip_id).await?.is_none() {
                return Err(bad_request_error("El viaje indicado no existe"));
            }
        }
        Ok(())
    }

    async fn load(&self, id: Uuid) -> AppResult<Expense> {
        self.expenses
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("el gasto"))
    }

    async fn view(&self, id: Uuid) -> AppResult<ExpenseView> {
        self.expenses
            .find_view(id)
            .await?
            .ok_or_else(|| not_found_error("el gasto"))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateExpenseRequest,
    ) -> AppResult<ApiResponse<ExpenseView>> {
        self.check_references(request.vehicle_id, request.trip_id).await?;

        let expense = self.expenses.create(user.id, request).await?;
        Ok(ApiResponse::success_with_message(expense, "Gasto registrado exitosamente"))
    }

    /// Los dispatchers solo listan los gastos que registraron
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: ExpenseFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<ExpenseView>>> {
        let scope = user.is(UserRole::Dispatcher).then_some(user.id);
        let (expenses, total) = self.expenses.list(&filters, scope, &page).await?;
        Ok(ApiResponse::paginated(expenses, Pagination::new(total, &page)))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<ExpenseView>> {
        Ok(ApiResponse::success(self.view(id).await?))
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateExpenseRequest,
    ) -> AppResult<ApiResponse<ExpenseView>> {
        let expense = self.load(id).await?;

        if !user.is(UserRole::Admin) && expense.created_by != user.id {
            return Err(forbidden_error("editar este gasto"));
        }
        if !expense.is_pending() {
            return Err(already_processed());
        }

        self.check_references(request.vehicle_id, request.trip_id).await?;
        self.expenses
            .update(id, request)
            .await?
            .ok_or_else(already_processed)?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Gasto actualizado exitosamente"))
    }

    pub async fn approve(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: ApproveExpenseRequest,
    ) -> AppResult<ApiResponse<ExpenseView>> {
        self.load(id).await?;
        self.expenses
            .approve(id, user.id, request.approval_note)
            .await?
            .ok_or_else(already_processed)?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Gasto aprobado"))
    }

    pub async fn reject(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: RejectExpenseRequest,
    ) -> AppResult<ApiResponse<ExpenseView>> {
        self.load(id).await?;
        self.expenses
            .reject(id, user.id, request.rejection_reason.trim())
            .await?
            .ok_or_else(already_processed)?;

        let view = self.view(id).await?;
        Ok(ApiResponse::success_with_message(view, "Gasto rechazado"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.expenses.delete(id).await? {
            return Err(not_found_error("el gasto"));
        }

        Ok(ApiResponse::message("Gasto eliminado exitosamente"))
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::transaction_dto::{
    ConfirmTransactionRequest, CreateDepositRequest, CreateExpenseTransactionRequest,
    RejectTransactionRequest, TransactionFilters,
};
use crate::models::auth::AuthenticatedUser;
use crate::models::transaction::{TransactionView, UnpaidSummary};
use crate::models::user::UserRole;
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{bad_request_error, forbidden_error, not_found_error, AppResult};
use crate::utils::pagination::{PageParams, Pagination};

pub struct TransactionController {
    transactions: TransactionRepository,
    vehicles: VehicleRepository,
}

impl TransactionController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    pub async fn create_deposit(
        &self,
        user: &AuthenticatedUser,
        request: CreateDepositRequest,
    ) -> AppResult<ApiResponse<TransactionView>> {
        let deposit = self.transactions.create_deposit(user.id, request).await?;
        Ok(ApiResponse::success_with_message(
            deposit,
            "Depósito registrado, pendiente de confirmación",
        ))
    }

    pub async fn create_expense(
        &self,
        user: &AuthenticatedUser,
        request: CreateExpenseTransactionRequest,
    ) -> AppResult<ApiResponse<TransactionView>> {
        if let Some(vehicle_id) = request.vehicle_id {
            if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
                return Err(bad_request_error("El vehículo indicado no existe"));
            }
        }

        let expense = self.transactions.create_expense(user.id, request).await?;
        Ok(ApiResponse::success_with_message(
            expense,
            "Gasto registrado, pendiente de confirmación",
        ))
    }

    pub async fn unpaid(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<UnpaidSummary>> {
        let summary = self.transactions.unpaid_summary(user.id).await?;
        Ok(ApiResponse::success(summary))
    }

    /// Los conductores solo ven sus propias transacciones
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: TransactionFilters,
        page: PageParams,
    ) -> AppResult<ApiResponse<Vec<TransactionView>>> {
        let scope = user.is(UserRole::Driver).then_some(user.id);
        let (transactions, total) = self.transactions.list(&filters, scope, &page).await?;
        Ok(ApiResponse::paginated(transactions, Pagination::new(total, &page)))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<TransactionView>> {
        let transaction = self
            .transactions
            .find_view(id)
            .await?
            .ok_or_else(|| not_found_error("la transacción"))?;

        if user.is(UserRole::Driver) && transaction.transaction.created_by != user.id {
            return Err(forbidden_error("ver esta transacción"));
        }

        Ok(ApiResponse::success(transaction))
    }

    pub async fn confirm(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: ConfirmTransactionRequest,
    ) -> AppResult<ApiResponse<TransactionView>> {
        let transaction = self
            .transactions
            .confirm(id, user.id, request.accountant_note)
            .await?;

        Ok(ApiResponse::success_with_message(transaction, "Transacción confirmada"))
    }

    pub async fn reject(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: RejectTransactionRequest,
    ) -> AppResult<ApiResponse<TransactionView>> {
        let transaction = self
            .transactions
            .reject(id, user.id, request.rejection_reason.trim())
            .await?;

        Ok(ApiResponse::success_with_message(transaction, "Transacción rechazada"))
    }
}

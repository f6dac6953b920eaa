use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserResponse;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{bad_request_error, not_found_error, AppResult};

pub struct AdminController {
    users: UserRepository,
}

impl AdminController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    pub async fn reactivate_all(&self) -> AppResult<ApiResponse<Value>> {
        let reactivated = self.users.reactivate_all().await?;
        Ok(ApiResponse::success_with_message(
            json!({ "reactivated": reactivated }),
            format!("{} usuario(s) reactivado(s)", reactivated),
        ))
    }

    pub async fn reactivate(&self, id_or_username: &str) -> AppResult<ApiResponse<UserResponse>> {
        let user = self
            .users
            .reactivate(id_or_username)
            .await?
            .ok_or_else(|| not_found_error("el usuario"))?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Usuario reactivado",
        ))
    }

    /// Un admin no puede desactivar su propia cuenta
    pub async fn deactivate(&self, admin: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<UserResponse>> {
        if admin.id == id {
            return Err(bad_request_error("No puedes desactivar tu propia cuenta"));
        }

        let user = self
            .users
            .set_active(id, false)
            .await?
            .ok_or_else(|| not_found_error("el usuario"))?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Usuario desactivado",
        ))
    }
}

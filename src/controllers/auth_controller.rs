use sqlx::PgPool;

use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest};
use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserResponse;
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppResult;
use crate::utils::jwt::JwtConfig;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            service: AuthService::new(pool, jwt),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
        let response = self.service.login(request).await?;
        Ok(ApiResponse::success_with_message(response, "Login exitoso"))
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<UserResponse>> {
        let user = self.service.register(request).await?;
        Ok(ApiResponse::success_with_message(user, "Usuario creado exitosamente"))
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<MeResponse>> {
        let me = self.service.me(user.id).await?;
        Ok(ApiResponse::success(me))
    }
}

//! Servicio de autenticación
//!
//! Login con bcrypt + JWT, registro de cuentas y resolución del token de
//! cada request a un `AuthenticatedUser`.

use bcrypt::{hash, verify, DEFAULT_COST};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest};
use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserResponse;
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::services::authorization_service::get_permissions_for_role;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, verify_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))
}

pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Las cuentas desactivadas reciben el mismo error que una contraseña
    /// incorrecta
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .find_by_username(request.username.trim())
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !valid {
            warn!("🔐 Contraseña incorrecta para {}", user.username);
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(user.id, user.role, &self.jwt)?;
        info!("🔑 Login de {} ({})", user.username, user.role);

        Ok(LoginResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserResponse> {
        if self
            .users
            .username_or_email_exists(&request.username, &request.email)
            .await?
        {
            return Err(AppError::Conflict(
                "El usuario o el email ya están registrados".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(NewUser {
                username: request.username.trim().to_string(),
                email: request.email.trim().to_lowercase(),
                password_hash,
                full_name: request.full_name.trim().to_string(),
                phone: request.phone,
                role: request.role,
                commission_rate: request.commission_rate.unwrap_or(Decimal::ZERO),
                driver_license: request.driver_license,
                license_expiry: request.license_expiry,
                address: request.address,
                salary: request.salary,
            })
            .await?;

        Ok(UserResponse::from(user))
    }

    /// Resuelve un token a la identidad del usuario. Falla si el usuario ya
    /// no existe o está desactivado.
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = verify_token(token, &self.jwt)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Usuario no encontrado".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthenticated(
                "La cuenta está desactivada".to_string(),
            ));
        }

        Ok(AuthenticatedUser::from(&user))
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<MeResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("el usuario"))?;

        Ok(MeResponse {
            permissions: get_permissions_for_role(user.role),
            user: UserResponse::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_verifies() {
        let hashed = hash_password("secret123").unwrap();
        assert_ne!(hashed, "secret123");
        assert!(verify("secret123", &hashed).unwrap());
        assert!(!verify("other", &hashed).unwrap());
    }
}

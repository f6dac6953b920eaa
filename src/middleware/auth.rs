//! Middleware de autenticación JWT
//!
//! `auth_middleware` resuelve el Bearer token a un `AuthenticatedUser` y lo
//! inyecta en las extensions. `require_roles` y `require_permission` son los
//! guards por ruta que consultan esa identidad.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    models::{auth::AuthenticatedUser, user::UserRole},
    services::{
        auth_service::AuthService,
        authorization_service::{authorize, can},
    },
    state::AppState,
    utils::{errors::AppError, jwt::extract_token_from_header},
};

pub const ADMIN: &[UserRole] = &[UserRole::Admin];
pub const ADMIN_DISPATCHER: &[UserRole] = &[UserRole::Admin, UserRole::Dispatcher];
pub const ADMIN_DISPATCHER_DRIVER: &[UserRole] =
    &[UserRole::Admin, UserRole::Dispatcher, UserRole::Driver];
pub const ADMIN_ACCOUNTANT: &[UserRole] = &[UserRole::Admin, UserRole::Accountant];
pub const DRIVER: &[UserRole] = &[UserRole::Driver];

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Token de autorización requerido".to_string()))?;

    // El body no es Sync: no se puede retener un préstamo del request a través del await
    let token = extract_token_from_header(auth_header)?.to_string();

    // Verifica firma y expiración, y que el usuario siga existiendo y activo
    let user = AuthService::new(state.pool.clone(), state.jwt_config())
        .authenticate(&token)
        .await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Guard por roles, se monta con `from_fn_with_state(ROLES, require_roles)`
pub async fn require_roles(
    State(roles): State<&'static [UserRole]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(request.extensions().get::<AuthenticatedUser>(), roles)?;
    Ok(next.run(request).await)
}

/// Guard por permiso `(acción, recurso)`
pub async fn require_permission(
    State((action, resource)): State<(&'static str, &'static str)>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthenticated("Se requiere autenticación".to_string()))?;

    can(user.role, action, resource)?;
    Ok(next.run(request).await)
}

/// Usuario autenticado como extractor de handler
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthenticated("Se requiere autenticación".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            full_name: "Tester".to_string(),
            role,
        }
    }

    fn admin_only() -> Router {
        Router::new().route(
            "/",
            get(|| async { "ok" }).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
    }

    async fn status_of(router: Router) -> StatusCode {
        router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_require_roles() {
        assert_eq!(
            status_of(admin_only().layer(Extension(user(UserRole::Admin)))).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(admin_only().layer(Extension(user(UserRole::Dispatcher)))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(admin_only()).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_permission() {
        let router = || {
            Router::new().route(
                "/",
                get(|| async { "ok" }).route_layer(middleware::from_fn_with_state(
                    ("approve", "expenses"),
                    require_permission,
                )),
            )
        };

        assert_eq!(
            status_of(router().layer(Extension(user(UserRole::Accountant)))).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(router().layer(Extension(user(UserRole::Driver)))).await,
            StatusCode::FORBIDDEN
        );
    }
}

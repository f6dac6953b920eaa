//! Servicio de autorización (RBAC)
//!
//! Tabla estática rol → recurso → acciones, construida una sola vez, y los
//! dos guards puros que la consultan: `authorize` (lista de roles) y `can`
//! (acción sobre recurso).

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::utils::errors::AppError;

type ResourcePermissions = HashMap<&'static str, HashSet<&'static str>>;

fn entries(table: Vec<(&'static str, Vec<&'static str>)>) -> ResourcePermissions {
    table
        .into_iter()
        .map(|(resource, actions)| (resource, actions.into_iter().collect()))
        .collect()
}

lazy_static! {
    /// Permisos por rol. El admin no aparece: tiene acceso a todo.
    static ref PERMISSIONS: HashMap<UserRole, ResourcePermissions> = {
        let mut table = HashMap::new();
        table.insert(
            UserRole::Dispatcher,
            entries(vec![
                ("trips", vec!["create", "read", "update", "assign"]),
                ("vehicles", vec!["read", "update"]),
                ("drivers", vec!["read", "update"]),
                ("customers", vec!["create", "read", "update"]),
                ("handover", vec!["read", "approve"]),
                ("expenses", vec!["create", "read"]),
                ("reports", vec!["vehicles", "trips", "drivers"]),
            ]),
        );
        table.insert(
            UserRole::Driver,
            entries(vec![
                ("trips", vec!["read", "updateStatus"]),
                ("handover", vec!["create", "read"]),
                ("transactions", vec!["create", "read"]),
                ("profile", vec!["read", "update"]),
            ]),
        );
        table.insert(
            UserRole::Accountant,
            entries(vec![
                ("transactions", vec!["read", "confirm", "reject"]),
                ("expenses", vec!["read", "approve", "reject"]),
                ("reports", vec!["financial", "revenue", "expenses"]),
            ]),
        );
        table
    };
}

/// Guard por roles: sin identidad → 401, rol no listado → 403
pub fn authorize(user: Option<&AuthenticatedUser>, roles: &[UserRole]) -> Result<(), AppError> {
    let user = user.ok_or_else(|| {
        AppError::Unauthenticated("Se requiere autenticación".to_string())
    })?;

    if !roles.contains(&user.role) {
        return Err(AppError::Forbidden(format!(
            "El rol '{}' no tiene acceso a este recurso",
            user.role
        )));
    }

    Ok(())
}

/// Guard por permisos: el admin siempre pasa
pub fn can(role: UserRole, action: &str, resource: &str) -> Result<(), AppError> {
    if has_permission(role, action, resource) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "El rol '{}' no puede '{}' en '{}'",
        role, action, resource
    )))
}

pub fn has_permission(role: UserRole, action: &str, resource: &str) -> bool {
    if role == UserRole::Admin {
        return true;
    }

    PERMISSIONS
        .get(&role)
        .and_then(|resources| resources.get(resource))
        .map_or(false, |actions| actions.contains(action))
}

/// Permisos del rol en formato `recurso:acción`, ordenados
pub fn get_permissions_for_role(role: UserRole) -> Vec<String> {
    if role == UserRole::Admin {
        return vec!["*".to_string()];
    }

    let mut permissions: Vec<String> = PERMISSIONS
        .get(&role)
        .map(|resources| {
            resources
                .iter()
                .flat_map(|(resource, actions)| {
                    actions.iter().map(move |action| format!("{}:{}", resource, action))
                })
                .collect()
        })
        .unwrap_or_default();
    permissions.sort();
    permissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            full_name: "Tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_authorize_accepts_listed_role() {
        assert!(authorize(Some(&user(UserRole::Admin)), &[UserRole::Admin]).is_ok());
    }

    #[test]
    fn test_authorize_rejects_unlisted_role() {
        let err = authorize(Some(&user(UserRole::Dispatcher)), &[UserRole::Driver]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_authorize_without_identity_is_unauthenticated() {
        let err = authorize(None, &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_can_approve_expenses() {
        assert!(can(UserRole::Accountant, "approve", "expenses").is_ok());
        assert!(can(UserRole::Admin, "approve", "expenses").is_ok());
        assert!(matches!(
            can(UserRole::Dispatcher, "approve", "expenses"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            can(UserRole::Driver, "approve", "expenses"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_can_without_resource_entry() {
        assert!(!has_permission(UserRole::Accountant, "read", "customers"));
        assert!(!has_permission(UserRole::Staff, "read", "trips"));
        assert!(!has_permission(UserRole::Customer, "read", "trips"));
    }

    #[test]
    fn test_driver_permissions() {
        assert!(has_permission(UserRole::Driver, "updateStatus", "trips"));
        assert!(!has_permission(UserRole::Driver, "assign", "trips"));
        assert!(has_permission(UserRole::Dispatcher, "assign", "trips"));
    }

    #[test]
    fn test_permission_listing() {
        assert_eq!(get_permissions_for_role(UserRole::Admin), vec!["*"]);
        let driver = get_permissions_for_role(UserRole::Driver);
        assert!(driver.contains(&"trips:updateStatus".to_string()));
        assert!(get_permissions_for_role(UserRole::Staff).is_empty());
    }
}

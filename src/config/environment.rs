//! Configuración de variables de entorno
//!
//! Este módulo lee la configuración del servidor desde el entorno
//! (`.env` cargado con dotenvy en `main`).

use std::env;
use thiserror::Error;

/// 30 días
const DEFAULT_JWT_EXPIRATION: u64 = 30 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("La variable de entorno {0} es obligatoria")]
    Missing(&'static str),

    #[error("Valor inválido para {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parsed("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret,
            jwt_expiration: parsed("JWT_EXPIRATION", DEFAULT_JWT_EXPIRATION)?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

pub(crate) fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_uses_default_when_unset() {
        let port: u16 = parsed("TAXI_DISPATCH_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_parsed_rejects_garbage() {
        env::set_var("TAXI_DISPATCH_TEST_BAD_PORT", "eighty");
        let result: Result<u16, _> = parsed("TAXI_DISPATCH_TEST_BAD_PORT", 3000);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_required_rejects_blank() {
        env::set_var("TAXI_DISPATCH_TEST_BLANK", "  ");
        assert!(matches!(
            required("TAXI_DISPATCH_TEST_BLANK"),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_server_url() {
        let config = EnvironmentConfig {
            environment: "test".to_string(),
            port: 8080,
            host: "127.0.0.1".to_string(),
            jwt_secret: "s".to_string(),
            jwt_expiration: 60,
        };
        assert_eq!(config.server_url(), "127.0.0.1:8080");
        assert!(!config.is_development());
    }
}

//! Envoltorio común de respuestas `{success, message?, data?, pagination?}`

use serde::Serialize;

use crate::utils::pagination::Pagination;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::PageParams;

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(ApiResponse::message("Hecho")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "Hecho"}));
    }

    #[test]
    fn test_paginated_shape() {
        let params = PageParams { page: Some(1), limit: Some(2) };
        let json = serde_json::to_value(ApiResponse::paginated(vec![1, 2], Pagination::new(3, &params)))
            .unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["pages"], 2);
        assert_eq!(json["pagination"]["limit"], 2);
    }
}

//! Paginación de listados (`page` desde 1, `limit` por defecto 20, máximo 100)

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit >= 1 => limit.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    /// Satura en vez de desbordar con páginas enormes (la consulta queda vacía)
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(total: i64, params: &PageParams) -> Self {
        let limit = params.limit();
        Self {
            total,
            page: params.page(),
            pages: (total + limit - 1) / limit,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_is_capped_and_invalid_values_fall_back() {
        let params = PageParams { page: Some(0), limit: Some(500) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);

        let params = PageParams { page: Some(3), limit: Some(-5) };
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PageParams { page: Some(i64::MAX), limit: Some(100) };
        assert_eq!(params.offset(), i64::MAX);
        assert!(params.offset() >= 0);
        assert_eq!(Pagination::new(5, &params).page, i64::MAX);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let params = PageParams { page: Some(2), limit: Some(10) };
        assert_eq!(
            Pagination::new(41, &params),
            Pagination { total: 41, page: 2, pages: 5, limit: 10 }
        );
        assert_eq!(Pagination::new(0, &params).pages, 0);
    }
}

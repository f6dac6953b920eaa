//! Repositorio de handovers
//!
//! El registro del handover y el cambio de conductor actual del vehículo
//! se escriben en la misma transacción.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::handover_dto::{CreateHandoverRequest, HandoverFilters, UpdateHandoverRequest};
use crate::models::handover::{Handover, HandoverType, HandoverView};
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::PageParams;
use crate::utils::validation::{end_of_day, start_of_day};

const HANDOVER_VIEW_SELECT: &str = r#"
    SELECT h.*,
           v.license_plate AS vehicle_plate,
           v.brand AS vehicle_brand,
           v.model AS vehicle_model,
           d.full_name AS driver_name,
           d.phone AS driver_phone,
           c.full_name AS confirmed_by_name
    FROM handovers h
    LEFT JOIN vehicles v ON v.id = h.vehicle_id
    LEFT JOIN users d ON d.id = h.driver_id
    LEFT JOIN users c ON c.id = h.confirmed_by
"#;

const HANDOVER_FILTERS: &str = r#"
    WHERE ($1::uuid IS NULL OR h.vehicle_id = $1)
      AND ($2::uuid IS NULL OR h.driver_id = $2)
      AND ($3::handover_type IS NULL OR h.type = $3)
      AND ($4::timestamptz IS NULL OR h.handover_time >= $4)
      AND ($5::timestamptz IS NULL OR h.handover_time <= $5)
"#;

pub struct HandoverRepository {
    pool: PgPool,
}

impl HandoverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registra el handover y actualiza el conductor actual del vehículo:
    /// check-in lo asigna, check-out lo libera.
    pub async fn create(
        &self,
        kind: HandoverType,
        driver_id: Uuid,
        request: CreateHandoverRequest,
    ) -> AppResult<HandoverView> {
        let mut tx = self.pool.begin().await?;

        let handover = sqlx::query_as::<_, Handover>(
            r#"
            INSERT INTO handovers (type, vehicle_id, driver_id, checklist, overall_photos,
                                   general_notes, issues, signatures)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(request.vehicle_id)
        .bind(driver_id)
        .bind(Json(&request.checklist))
        .bind(Json(&request.overall_photos))
        .bind(request.general_notes)
        .bind(Json(&request.issues))
        .bind(Json(&request.signatures))
        .fetch_one(&mut *tx)
        .await?;

        match kind {
            HandoverType::CheckIn => {
                sqlx::query(
                    "UPDATE vehicles SET current_driver_id = $2, status = 'active', updated_at = NOW() WHERE id = $1",
                )
                .bind(request.vehicle_id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
            }
            HandoverType::CheckOut => {
                sqlx::query(
                    "UPDATE vehicles SET current_driver_id = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(request.vehicle_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            "📋 {} registrado: vehículo {} conductor {}",
            kind.label(),
            request.vehicle_id,
            driver_id
        );

        self.find_view(handover.id)
            .await?
            .ok_or_else(|| not_found_error("el handover"))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Handover>> {
        let handover = sqlx::query_as::<_, Handover>("SELECT * FROM handovers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(handover)
    }

    pub async fn find_view(&self, id: Uuid) -> AppResult<Option<HandoverView>> {
        let sql = format!("{} WHERE h.id = $1", HANDOVER_VIEW_SELECT);
        let handover = sqlx::query_as::<_, HandoverView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(handover)
    }

    /// `driver_scope` fuerza el filtro por conductor
    pub async fn list(
        &self,
        filters: &HandoverFilters,
        driver_scope: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<(Vec<HandoverView>, i64)> {
        let driver_id = driver_scope.or(filters.driver_id);
        let from: Option<DateTime<Utc>> = filters.start_date.map(start_of_day);
        let to: Option<DateTime<Utc>> = filters.end_date.map(end_of_day);

        let sql = format!(
            "{} {} ORDER BY h.handover_time DESC LIMIT $6 OFFSET $7",
            HANDOVER_VIEW_SELECT, HANDOVER_FILTERS
        );
        let handovers = sqlx::query_as::<_, HandoverView>(&sql)
            .bind(filters.vehicle_id)
            .bind(driver_id)
            .bind(filters.kind)
            .bind(from)
            .bind(to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM handovers h {}", HANDOVER_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filters.vehicle_id)
            .bind(driver_id)
            .bind(filters.kind)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok((handovers, total))
    }

    /// Edita un handover no completado; `None` si ya está completado
    pub async fn update(&self, id: Uuid, request: UpdateHandoverRequest) -> AppResult<Option<Handover>> {
        let handover = sqlx::query_as::<_, Handover>(
            r#"
            UPDATE handovers
            SET checklist = COALESCE($2, checklist),
                overall_photos = COALESCE($3, overall_photos),
                general_notes = COALESCE($4, general_notes),
                issues = COALESCE($5, issues),
                signatures = COALESCE($6, signatures),
                updated_at = NOW()
            WHERE id = $1 AND is_completed = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.checklist.map(Json))
        .bind(request.overall_photos.map(Json))
        .bind(request.general_notes)
        .bind(request.issues.map(Json))
        .bind(request.signatures.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(handover)
    }

    pub async fn complete(&self, id: Uuid, confirmer: Uuid) -> AppResult<Option<Handover>> {
        let handover = sqlx::query_as::<_, Handover>(
            r#"
            UPDATE handovers
            SET is_completed = TRUE, confirmed_by = $2, updated_at = NOW()
            WHERE id = $1 AND is_completed = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(confirmer)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(handover) = &handover {
            info!("🔒 Handover {} completado por {}", handover.id, confirmer);
        }
        Ok(handover)
    }
}

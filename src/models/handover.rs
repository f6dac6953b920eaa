//! Modelo de Handover
//!
//! Checklist de entrega/devolución de vehículos. El checklist, las fotos,
//! las incidencias y las firmas se guardan como JSONB. Un handover
//! completado ya no admite cambios.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Tipo de handover - mapea al ENUM handover_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "handover_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HandoverType {
    CheckIn,
    CheckOut,
}

impl HandoverType {
    pub fn label(&self) -> &'static str {
        match self {
            HandoverType::CheckIn => "Check-in",
            HandoverType::CheckOut => "Check-out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistItemStatus {
    Ok,
    Issue,
    NeedsMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub status: ChecklistItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExteriorChecklist {
    pub body_condition: Option<ChecklistItem>,
    pub lights: Option<ChecklistItem>,
    pub mirrors: Option<ChecklistItem>,
    pub tires: Option<ChecklistItem>,
    pub windshield: Option<ChecklistItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteriorChecklist {
    pub seats: Option<ChecklistItem>,
    pub dashboard: Option<ChecklistItem>,
    pub air_conditioner: Option<ChecklistItem>,
    pub cleanliness: Option<ChecklistItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationalChecklist {
    pub engine: Option<ChecklistItem>,
    pub brakes: Option<ChecklistItem>,
    pub steering: Option<ChecklistItem>,
    pub transmission: Option<ChecklistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FuelReading {
    #[validate(range(min = 0, max = 100))]
    pub level: i32,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdometerReading {
    pub reading: i64,
    pub photo: Option<String>,
}

/// Checklist completo del vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_odometer"))]
pub struct Checklist {
    #[serde(default)]
    pub exterior: ExteriorChecklist,
    #[serde(default)]
    pub interior: InteriorChecklist,
    #[serde(default)]
    pub operational: OperationalChecklist,
    #[validate]
    pub fuel: FuelReading,
    pub odometer: OdometerReading,
}

fn validate_odometer(checklist: &Checklist) -> Result<(), ValidationError> {
    if checklist.odometer.reading < 0 {
        return Err(ValidationError::new("odometer_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallPhotos {
    pub front: Option<String>,
    pub back: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
    pub dashboard: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoverIssue {
    pub description: String,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signatures {
    pub driver: Option<String>,
    pub confirmer: Option<String>,
}

/// Handover - mapea exactamente a la tabla handovers
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Handover {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: HandoverType,
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub confirmed_by: Option<Uuid>,
    pub handover_time: DateTime<Utc>,
    pub checklist: Json<Checklist>,
    pub overall_photos: Json<OverallPhotos>,
    pub general_notes: Option<String>,
    pub issues: Json<Vec<HandoverIssue>>,
    pub signatures: Json<Signatures>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Handover con vehículo y personas resueltas
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HandoverView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub handover: Handover,
    pub vehicle_plate: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub confirmed_by_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checklist(fuel: i32, odometer: i64) -> Checklist {
        serde_json::from_value(json!({
            "exterior": { "tires": { "status": "ok" } },
            "fuel": { "level": fuel },
            "odometer": { "reading": odometer }
        }))
        .unwrap()
    }

    #[test]
    fn test_checklist_accepts_partial_sections() {
        let c = checklist(80, 120_000);
        assert!(c.validate().is_ok());
        assert_eq!(
            c.exterior.tires.as_ref().map(|t| t.status),
            Some(ChecklistItemStatus::Ok)
        );
        assert!(c.interior.seats.is_none());
    }

    #[test]
    fn test_checklist_rejects_out_of_range_readings() {
        assert!(checklist(101, 10).validate().is_err());
        assert!(checklist(50, -1).validate().is_err());
    }

    #[test]
    fn test_handover_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&HandoverType::CheckOut).unwrap(), "\"check_out\"");
    }
}

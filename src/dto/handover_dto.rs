use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::handover::{Checklist, HandoverIssue, HandoverType, OverallPhotos, Signatures};

// Check-in / check-out; el tipo lo determina la ruta
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHandoverRequest {
    pub vehicle_id: Uuid,
    // Solo admin/dispatcher pueden registrar en nombre de otro conductor
    pub driver_id: Option<Uuid>,
    #[validate]
    pub checklist: Checklist,
    #[serde(default)]
    pub overall_photos: OverallPhotos,
    pub general_notes: Option<String>,
    #[serde(default)]
    pub issues: Vec<HandoverIssue>,
    #[serde(default)]
    pub signatures: Signatures,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHandoverRequest {
    #[validate]
    pub checklist: Option<Checklist>,
    pub overall_photos: Option<OverallPhotos>,
    pub general_notes: Option<String>,
    pub issues: Option<Vec<HandoverIssue>>,
    pub signatures: Option<Signatures>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HandoverFilters {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<HandoverType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_checklist_is_validated() {
        let request: CreateHandoverRequest = serde_json::from_value(json!({
            "vehicle_id": "6f1c0c8e-6a57-4d8e-9a4c-0d6f3f0b8d11",
            "checklist": {
                "fuel": { "level": 140 },
                "odometer": { "reading": 1000 }
            }
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}

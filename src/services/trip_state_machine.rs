//! Máquina de estados de los viajes
//!
//! Planificador puro: valida la transición contra la tabla de estados y
//! calcula los efectos financieros de la finalización. No toca la base de
//! datos; `TripRepository::apply_transition` aplica el plan dentro de una
//! transacción.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::trip::{Trip, TripStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("No se puede cambiar el estado de '{from}' a '{to}'")]
    InvalidTransition { from: TripStatus, to: TripStatus },

    #[error("Se requiere el precio real para completar el viaje")]
    MissingActualPrice,

    #[error("El descuento ({discount}) supera el precio real ({actual_price})")]
    NegativeFinalPrice {
        actual_price: Decimal,
        discount: Decimal,
    },
}

/// Estados destino permitidos desde cada estado
pub fn allowed_targets(from: TripStatus) -> &'static [TripStatus] {
    use TripStatus::*;
    match from {
        New => &[Assigned, Cancelled],
        Assigned => &[Called, Cancelled],
        Called => &[PickedUp, Incident, Cancelled],
        PickedUp => &[Completed, Incident],
        Incident => &[PickedUp, Completed, Cancelled],
        Completed | Cancelled => &[],
    }
}

pub fn can_transition(from: TripStatus, to: TripStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Asignar vale desde `new` o reasignando un viaje que ya está `assigned`
pub fn check_assignable(status: TripStatus) -> Result<(), TransitionError> {
    if status == TripStatus::Assigned || can_transition(status, TripStatus::Assigned) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            from: status,
            to: TripStatus::Assigned,
        })
    }
}

/// Datos de la solicitud de cambio de estado
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub target: TripStatus,
    pub actor: Uuid,
    pub note: Option<String>,
    pub actual_price: Option<Decimal>,
    pub distance: Option<f64>,
}

/// Entrada que se agrega al historial de estados
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub status: TripStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Uuid,
    pub note: Option<String>,
}

/// Efectos de completar un viaje
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEffects {
    pub actual_price: Decimal,
    pub final_price: Decimal,
    pub distance: Option<f64>,
    pub commission_amount: Decimal,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub completed_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub trip_id: Uuid,
    pub from: TripStatus,
    pub to: TripStatus,
    pub history: HistoryEntry,
    pub completion: Option<CompletionEffects>,
}

/// Comisión del dispatcher: `final_price * rate / 100`, redondeada a 2 decimales
pub fn commission_for(final_price: Decimal, commission_rate: Option<Decimal>) -> Decimal {
    match commission_rate {
        Some(rate) if rate > Decimal::ZERO => {
            (final_price * rate / Decimal::ONE_HUNDRED).round_dp(2)
        }
        _ => Decimal::ZERO,
    }
}

/// Planifica la transición de `trip` al estado solicitado.
///
/// `commission_rate` es el porcentaje del dispatcher que reservó el viaje;
/// solo se usa al completar.
pub fn plan_transition(
    trip: &Trip,
    request: TransitionRequest,
    commission_rate: Option<Decimal>,
    now: DateTime<Utc>,
) -> Result<TransitionPlan, TransitionError> {
    let from = trip.status;
    let to = request.target;

    if !can_transition(from, to) {
        return Err(TransitionError::InvalidTransition { from, to });
    }

    let completion = if to == TripStatus::Completed {
        let actual_price = request
            .actual_price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or(TransitionError::MissingActualPrice)?;

        let final_price = actual_price - trip.discount;
        if final_price < Decimal::ZERO {
            return Err(TransitionError::NegativeFinalPrice {
                actual_price,
                discount: trip.discount,
            });
        }

        Some(CompletionEffects {
            actual_price,
            final_price,
            distance: request.distance.or(trip.distance),
            commission_amount: commission_for(final_price, commission_rate),
            vehicle_id: trip.vehicle_id,
            customer_id: trip.customer_id,
            completed_time: now,
        })
    } else {
        None
    };

    Ok(TransitionPlan {
        trip_id: trip.id,
        from,
        to,
        history: HistoryEntry {
            status: to,
            changed_at: now,
            changed_by: request.actor,
            note: request.note,
        },
        completion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TripStatus; 7] = [
        TripStatus::New,
        TripStatus::Assigned,
        TripStatus::Called,
        TripStatus::PickedUp,
        TripStatus::Incident,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    fn trip(status: TripStatus, discount: i64) -> Trip {
        let now = Utc::now();
        Trip {
            id: Uuid::new_v4(),
            trip_code: "TX260101ABC123".to_string(),
            customer_id: Uuid::new_v4(),
            customer_phone: "0912345678".to_string(),
            customer_name: "Nguyen Van A".to_string(),
            pickup_location: "Hoan Kiem".to_string(),
            dropoff_location: "Noi Bai".to_string(),
            scheduled_time: now,
            passengers: 1,
            customer_note: None,
            estimated_price: Decimal::from(350_000),
            actual_price: None,
            discount: Decimal::from(discount),
            final_price: None,
            distance: Some(28.0),
            commission_amount: Decimal::ZERO,
            vehicle_id: Some(Uuid::new_v4()),
            driver_id: Some(Uuid::new_v4()),
            dispatcher_id: Uuid::new_v4(),
            status,
            is_paid: false,
            is_locked: false,
            completed_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(target: TripStatus, actual_price: Option<i64>) -> TransitionRequest {
        TransitionRequest {
            target,
            actor: Uuid::new_v4(),
            note: Some("ok".to_string()),
            actual_price: actual_price.map(Decimal::from),
            distance: None,
        }
    }

    #[test]
    fn test_transition_succeeds_only_for_listed_targets() {
        for from in ALL {
            for to in ALL {
                let price = (to == TripStatus::Completed).then_some(100_000);
                let result = plan_transition(&trip(from, 0), request(to, price), None, Utc::now());
                assert_eq!(
                    result.is_ok(),
                    allowed_targets(from).contains(&to),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_new_to_picked_up_is_invalid() {
        let err = plan_transition(
            &trip(TripStatus::New, 0),
            request(TripStatus::PickedUp, None),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: TripStatus::New,
                to: TripStatus::PickedUp
            }
        );
    }

    #[test]
    fn test_assignable_only_from_new_or_assigned() {
        for status in ALL {
            let result = check_assignable(status);
            if matches!(status, TripStatus::New | TripStatus::Assigned) {
                assert!(result.is_ok(), "{:?}", status);
            } else {
                assert_eq!(
                    result.unwrap_err(),
                    TransitionError::InvalidTransition {
                        from: status,
                        to: TripStatus::Assigned
                    }
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        assert!(allowed_targets(TripStatus::Completed).is_empty());
        assert!(allowed_targets(TripStatus::Cancelled).is_empty());
    }

    #[test]
    fn test_completion_requires_actual_price() {
        let t = trip(TripStatus::PickedUp, 0);
        let err = plan_transition(&t, request(TripStatus::Completed, None), None, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::MissingActualPrice);

        let zero = plan_transition(&t, request(TripStatus::Completed, Some(0)), None, Utc::now());
        assert_eq!(zero.unwrap_err(), TransitionError::MissingActualPrice);
    }

    #[test]
    fn test_completion_effects() {
        let t = trip(TripStatus::PickedUp, 10_000);
        let now = Utc::now();
        let plan = plan_transition(
            &t,
            request(TripStatus::Completed, Some(100_000)),
            Some(Decimal::from(10)),
            now,
        )
        .unwrap();

        let effects = plan.completion.expect("completion effects");
        assert_eq!(effects.final_price, Decimal::from(90_000));
        assert_eq!(effects.commission_amount, Decimal::from(9_000));
        assert_eq!(effects.vehicle_id, t.vehicle_id);
        assert_eq!(effects.customer_id, t.customer_id);
        assert_eq!(effects.completed_time, now);
        assert_eq!(effects.distance, Some(28.0));
        assert_eq!(plan.history.status, TripStatus::Completed);
        assert_eq!(plan.from, TripStatus::PickedUp);
    }

    #[test]
    fn test_discount_larger_than_price_is_rejected() {
        let t = trip(TripStatus::Incident, 200_000);
        let err = plan_transition(&t, request(TripStatus::Completed, Some(150_000)), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, TransitionError::NegativeFinalPrice { .. }));
    }

    #[test]
    fn test_non_completion_has_no_effects() {
        let plan = plan_transition(
            &trip(TripStatus::Assigned, 0),
            request(TripStatus::Called, None),
            None,
            Utc::now(),
        )
        .unwrap();
        assert!(plan.completion.is_none());
        assert_eq!(plan.history.note.as_deref(), Some("ok"));
    }

    #[test]
    fn test_commission_without_rate_is_zero() {
        assert_eq!(commission_for(Decimal::from(90_000), None), Decimal::ZERO);
        assert_eq!(
            commission_for(Decimal::from(90_000), Some(Decimal::ZERO)),
            Decimal::ZERO
        );
        assert_eq!(
            commission_for(Decimal::new(12_345, 0), Some(Decimal::new(75, 1))),
            Decimal::new(92588, 2)
        );
    }
}

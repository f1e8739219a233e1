//! Stock arithmetic for a single inventory record.
//!
//! Every function takes the current record and returns the next one without
//! touching the store, so a rejected operation leaves the caller's copy
//! untouched. Persisting the result is the service layer's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    dto::inventory::UpdateInventoryRequest,
    entity::{
        inventories::{
            DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_REORDER_POINT, DEFAULT_REORDER_QUANTITY,
            DEFAULT_WAREHOUSE, Model,
        },
        types::{AdjustmentEntry, AdjustmentLog, ReservationEntry, ReservationLog},
    },
    error::{AppError, AppResult},
};

pub const DEFAULT_ADJUSTMENT_REASON: &str = "Manual adjustment";
pub const DEFAULT_RESERVATION_REFERENCE: &str = "Manual reservation";
pub const DEFAULT_RELEASE_REFERENCE: &str = "Manual release";

/// Fresh record for a variant that has never been stocked.
pub fn new_record(variant_id: Uuid, at: DateTime<Utc>) -> Model {
    Model {
        id: Uuid::new_v4(),
        variant_id,
        quantity: 0,
        reserved: 0,
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        reorder_point: DEFAULT_REORDER_POINT,
        reorder_quantity: DEFAULT_REORDER_QUANTITY,
        warehouse_location: DEFAULT_WAREHOUSE.to_string(),
        adjustment_log: AdjustmentLog::default(),
        reservation_log: ReservationLog::default(),
        release_log: ReservationLog::default(),
        created_at: at.into(),
        updated_at: at.into(),
    }
}

/// Overwrites the fields present in `changes`.
pub fn apply_update(
    current: &Model,
    changes: &UpdateInventoryRequest,
    at: DateTime<Utc>,
) -> AppResult<Model> {
    let mut next = current.clone();
    if let Some(quantity) = changes.quantity {
        next.quantity = quantity;
    }
    if let Some(reserved) = changes.reserved {
        next.reserved = reserved;
    }
    if let Some(threshold) = changes.low_stock_threshold {
        next.low_stock_threshold = threshold;
    }
    if let Some(point) = changes.reorder_point {
        next.reorder_point = point;
    }
    if let Some(quantity) = changes.reorder_quantity {
        next.reorder_quantity = quantity;
    }
    if let Some(location) = changes.warehouse_location.as_deref() {
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::Validation(
                "Warehouse location cannot be empty".into(),
            ));
        }
        next.warehouse_location = location.to_string();
    }

    validate(&next)?;
    next.updated_at = at.into();
    Ok(next)
}

/// Adds `delta` to the on-hand quantity.
pub fn adjust(
    current: &Model,
    delta: i32,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> AppResult<Model> {
    if delta == 0 {
        return Err(AppError::Validation("Adjustment value is required".into()));
    }

    let new_quantity = current
        .quantity
        .checked_add(delta)
        .filter(|q| *q >= 0)
        .ok_or_else(|| {
            AppError::InvalidAdjustment("Adjustment would result in negative inventory".into())
        })?;
    if new_quantity < current.reserved {
        return Err(AppError::InvalidAdjustment(format!(
            "Adjustment would leave quantity {new_quantity} below reserved {}",
            current.reserved
        )));
    }

    let mut next = current.clone();
    next.quantity = new_quantity;
    next.adjustment_log.0.push(AdjustmentEntry {
        adjustment: delta,
        reason: reason_or(reason, DEFAULT_ADJUSTMENT_REASON),
        date: at,
    });
    next.updated_at = at.into();
    Ok(next)
}

/// Moves `amount` from available into reserved.
pub fn reserve(
    current: &Model,
    amount: i32,
    reference: Option<&str>,
    at: DateTime<Utc>,
) -> AppResult<Model> {
    ensure_positive(amount)?;
    let available = current.quantity - current.reserved;
    if available < amount {
        return Err(AppError::InsufficientAvailable(format!(
            "Not enough available inventory to reserve: requested {amount}, available {available}"
        )));
    }

    let mut next = current.clone();
    next.reserved += amount;
    next.reservation_log.0.push(ReservationEntry {
        quantity: amount,
        reference: reason_or(reference, DEFAULT_RESERVATION_REFERENCE),
        date: at,
    });
    next.updated_at = at.into();
    Ok(next)
}

/// Returns `amount` from reserved back to available.
pub fn release(
    current: &Model,
    amount: i32,
    reference: Option<&str>,
    at: DateTime<Utc>,
) -> AppResult<Model> {
    ensure_positive(amount)?;
    if current.reserved < amount {
        return Err(AppError::OverRelease(format!(
            "Cannot release more than reserved quantity: requested {amount}, reserved {}",
            current.reserved
        )));
    }

    let mut next = current.clone();
    next.reserved -= amount;
    next.release_log.0.push(ReservationEntry {
        quantity: amount,
        reference: reason_or(reference, DEFAULT_RELEASE_REFERENCE),
        date: at,
    });
    next.updated_at = at.into();
    Ok(next)
}

/// Field bounds and `0 <= reserved <= quantity`.
pub fn validate(record: &Model) -> AppResult<()> {
    if record.quantity < 0 {
        return Err(AppError::Validation("Quantity cannot be negative".into()));
    }
    if record.reserved < 0 {
        return Err(AppError::Validation(
            "Reserved quantity cannot be negative".into(),
        ));
    }
    if record.reserved > record.quantity {
        return Err(AppError::Validation(format!(
            "Reserved quantity {} cannot exceed quantity {}",
            record.reserved, record.quantity
        )));
    }
    if record.low_stock_threshold < 0 {
        return Err(AppError::Validation(
            "Low stock threshold cannot be negative".into(),
        ));
    }
    if record.reorder_point < 1 {
        return Err(AppError::Validation(
            "Reorder point must be at least 1".into(),
        ));
    }
    if record.reorder_quantity < 1 {
        return Err(AppError::Validation(
            "Reorder quantity must be at least 1".into(),
        ));
    }
    Ok(())
}

fn ensure_positive(amount: i32) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "Quantity must be a positive number".into(),
        ));
    }
    Ok(())
}

fn reason_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked(quantity: i32, reserved: i32) -> Model {
        let mut record = new_record(Uuid::new_v4(), Utc::now());
        record.quantity = quantity;
        record.reserved = reserved;
        record
    }

    fn assert_invariant(record: &Model) {
        assert!(record.reserved >= 0, "reserved went negative");
        assert!(record.reserved <= record.quantity, "reserved exceeds quantity");
    }

    #[test]
    fn new_record_uses_defaults() {
        let record = new_record(Uuid::new_v4(), Utc::now());
        assert_eq!(record.quantity, 0);
        assert_eq!(record.reserved, 0);
        assert_eq!(record.low_stock_threshold, 5);
        assert_eq!(record.reorder_point, 10);
        assert_eq!(record.reorder_quantity, 20);
        assert_eq!(record.warehouse_location, "Main Warehouse");
        assert!(record.is_low_stock());
        assert!(record.needs_reorder());
        assert!(record.is_out_of_stock());
    }

    #[test]
    fn adjust_adds_delta_and_logs_it() {
        let record = stocked(10, 2);
        let next = adjust(&record, -4, Some("damaged"), Utc::now()).unwrap();
        assert_eq!(next.quantity, 6);
        assert_eq!(next.reserved, 2);
        let entry = next.adjustment_log.0.last().unwrap();
        assert_eq!(entry.adjustment, -4);
        assert_eq!(entry.reason, "damaged");

        let restocked = adjust(&next, 14, None, Utc::now()).unwrap();
        assert_eq!(restocked.quantity, 20);
        assert_eq!(restocked.adjustment_log.0.len(), 2);
        assert_eq!(restocked.adjustment_log.0[1].reason, "Manual adjustment");
    }

    #[test]
    fn adjust_below_zero_is_rejected() {
        let record = stocked(10, 0);
        let err = adjust(&record, -15, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
        assert_eq!(record.quantity, 10);
        assert!(record.adjustment_log.0.is_empty());
    }

    #[test]
    fn adjust_below_reserved_is_rejected() {
        let record = stocked(10, 7);
        let err = adjust(&record, -5, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
        assert!(adjust(&record, -3, None, Utc::now()).is_ok());
    }

    #[test]
    fn adjust_rejects_zero_and_overflow() {
        let record = stocked(10, 0);
        assert!(matches!(
            adjust(&record, 0, None, Utc::now()),
            Err(AppError::Validation(_))
        ));
        let full = stocked(i32::MAX, 0);
        assert!(matches!(
            adjust(&full, 1, None, Utc::now()),
            Err(AppError::InvalidAdjustment(_))
        ));
    }

    #[test]
    fn reserve_and_release_walkthrough() {
        let record = stocked(10, 2);

        let after_first = reserve(&record, 5, Some("order-1"), Utc::now()).unwrap();
        assert_eq!(after_first.reserved, 7);
        assert_eq!(after_first.available(), 3);
        assert_eq!(after_first.reservation_log.0[0].reference, "order-1");

        let err = reserve(&after_first, 5, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientAvailable(_)));
        assert_eq!(after_first.reserved, 7);

        let released = release(&after_first, 7, None, Utc::now()).unwrap();
        assert_eq!(released.reserved, 0);
        assert_eq!(released.release_log.0[0].quantity, 7);
        assert_eq!(released.release_log.0[0].reference, "Manual release");

        let err = adjust(&released, -15, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
        assert_eq!(released.quantity, 10);
    }

    #[test]
    fn reserve_exactly_available_is_allowed() {
        let record = stocked(5, 1);
        let next = reserve(&record, 4, None, Utc::now()).unwrap();
        assert_eq!(next.available(), 0);
        assert!(next.is_out_of_stock());
        assert_invariant(&next);
    }

    #[test]
    fn release_more_than_reserved_fails() {
        let record = stocked(10, 3);
        let err = release(&record, 4, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::OverRelease(_)));
        assert!(record.release_log.0.is_empty());
    }

    #[test]
    fn non_positive_amounts_are_validation_errors() {
        let record = stocked(10, 3);
        for amount in [0, -1] {
            assert!(matches!(
                reserve(&record, amount, None, Utc::now()),
                Err(AppError::Validation(_))
            ));
            assert!(matches!(
                release(&record, amount, None, Utc::now()),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn invariant_holds_across_mixed_sequence() {
        let mut record = stocked(0, 0);
        let steps: [(&str, i32); 10] = [
            ("adjust", 12),
            ("reserve", 5),
            ("reserve", 9),
            ("release", 2),
            ("adjust", -8),
            ("adjust", -3),
            ("reserve", 4),
            ("release", 10),
            ("release", 7),
            ("adjust", -12),
        ];
        for (op, amount) in steps {
            let result = match op {
                "adjust" => adjust(&record, amount, None, Utc::now()),
                "reserve" => reserve(&record, amount, None, Utc::now()),
                _ => release(&record, amount, None, Utc::now()),
            };
            if let Ok(next) = result {
                record = next;
            }
            assert_invariant(&record);
        }
        assert_eq!(record.quantity, 4);
        assert_eq!(record.reserved, 3);
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let record = stocked(10, 2);
        let changes = UpdateInventoryRequest {
            low_stock_threshold: Some(3),
            warehouse_location: Some(" East ".into()),
            ..Default::default()
        };
        let next = apply_update(&record, &changes, Utc::now()).unwrap();
        assert_eq!(next.quantity, 10);
        assert_eq!(next.reserved, 2);
        assert_eq!(next.low_stock_threshold, 3);
        assert_eq!(next.reorder_point, 10);
        assert_eq!(next.warehouse_location, "East");
    }

    #[test]
    fn update_rejects_negative_and_over_reserved() {
        let record = stocked(10, 2);
        let negative = UpdateInventoryRequest {
            quantity: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&record, &negative, Utc::now()),
            Err(AppError::Validation(_))
        ));

        let over = UpdateInventoryRequest {
            quantity: Some(4),
            reserved: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&record, &over, Utc::now()),
            Err(AppError::Validation(_))
        ));

        let bad_point = UpdateInventoryRequest {
            reorder_point: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&record, &bad_point, Utc::now()),
            Err(AppError::Validation(_))
        ));
    }
}

//! Validation utilities for the Food Logistics Management Platform

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate that a quantity is strictly positive
pub fn validate_quantity_positive(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a quantity fits the ledger's storage scale of three
/// fractional digits; finer values would be silently rounded on insert
/// and break exact reversal
pub fn validate_quantity_scale(quantity: Decimal) -> Result<(), &'static str> {
    if quantity.normalize().scale() > 3 {
        return Err("Quantity cannot have more than three fractional digits");
    }
    Ok(())
}

/// Validate that a headcount is non-negative
pub fn validate_headcount(headcount: i32) -> Result<(), &'static str> {
    if headcount < 0 {
        return Err("Headcount cannot be negative");
    }
    Ok(())
}

/// Validate that a recipe serving basis is usable as a divisor
pub fn validate_serving_basis(basis: i32) -> Result<(), &'static str> {
    if basis < 1 {
        return Err("Serving basis must be at least 1");
    }
    Ok(())
}

// ============================================================================
// Date Validations
// ============================================================================

/// Validate that a batch does not expire before it was received
pub fn validate_batch_dates(entry: NaiveDate, expiry: NaiveDate) -> Result<(), &'static str> {
    if expiry < entry {
        return Err("Expiry date cannot precede entry date");
    }
    Ok(())
}

/// Validate an ISO week reference and return the Monday of that week
pub fn resolve_iso_week(week: u32, year: i32) -> Result<NaiveDate, &'static str> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or("Invalid ISO week reference")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn positive_quantity_accepted() {
        assert!(validate_quantity_positive(Decimal::new(105, 1)).is_ok());
    }

    #[test]
    fn zero_and_negative_quantities_rejected() {
        assert!(validate_quantity_positive(Decimal::ZERO).is_err());
        assert!(validate_quantity_positive(Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn quantity_scale_capped_at_storage_precision() {
        assert!(validate_quantity_scale(Decimal::new(12345, 3)).is_ok());
        assert!(validate_quantity_scale(Decimal::new(125000, 4)).is_ok());
        assert!(validate_quantity_scale(Decimal::new(12345, 4)).is_err());
    }

    #[test]
    fn headcount_zero_is_valid() {
        assert!(validate_headcount(0).is_ok());
        assert!(validate_headcount(-1).is_err());
    }

    #[test]
    fn serving_basis_must_divide() {
        assert!(validate_serving_basis(1).is_ok());
        assert!(validate_serving_basis(100).is_ok());
        assert!(validate_serving_basis(0).is_err());
    }

    #[test]
    fn expiry_before_entry_rejected() {
        let entry = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert!(validate_batch_dates(entry, expiry).is_err());
        assert!(validate_batch_dates(expiry, entry).is_ok());
    }

    #[test]
    fn iso_week_resolution() {
        let monday = resolve_iso_week(10, 2025).unwrap();
        assert_eq!(monday.iso_week().week(), 10);
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert!(resolve_iso_week(54, 2025).is_err());
    }
}

//! Input validation helpers
//!
//! Centralized length/amount limits and validation functions.
//! Prices are in the local currency's minor-less unit (VND), so the upper
//! bounds are generous.

use shared::error::ErrorCode;
use shared::models::{LineItem, OrderCreate};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Food names
pub const MAX_NAME_LEN: usize = 200;

/// Usernames
pub const MAX_USERNAME_LEN: usize = 64;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Amount limits ───────────────────────────────────────────────────

/// Maximum unit price per item
pub const MAX_PRICE: f64 = 1_000_000_000.0;

/// Maximum quantity per line item
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum order total
pub const MAX_TOTAL: f64 = 1_000_000_000_000.0;

/// Maximum line items per order
pub const MAX_ITEMS: usize = 500;

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

// ── Amounts ─────────────────────────────────────────────────────────

fn invalid_amount(field: &str, message: String) -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, message).with_detail("field", field)
}

/// Validate that an amount is finite, non-negative and at most `max`
fn validate_amount(value: f64, field: &str, max: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(invalid_amount(
            field,
            format!("{field} must be a finite number, got {value}"),
        ));
    }
    if value < 0.0 {
        return Err(invalid_amount(
            field,
            format!("{field} must be non-negative, got {value}"),
        ));
    }
    if value > max {
        return Err(invalid_amount(
            field,
            format!("{field} exceeds maximum allowed ({max}), got {value}"),
        ));
    }
    Ok(())
}

fn validate_line_item(item: &LineItem, index: usize) -> Result<(), AppError> {
    validate_required_text(&item.name, &format!("items[{index}].name"), MAX_NAME_LEN)?;
    validate_amount(item.price, &format!("items[{index}].price"), MAX_PRICE)?;

    if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
        let field = format!("items[{index}].quantity");
        return Err(invalid_amount(
            &field,
            format!(
                "{field} must be between 1 and {MAX_QUANTITY}, got {}",
                item.quantity
            ),
        ));
    }
    Ok(())
}

/// Validate a create-order payload.
///
/// `total` is taken as submitted and not cross-checked against the items.
pub fn validate_order_create(order: &OrderCreate) -> Result<(), AppError> {
    if order.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if order.items.len() > MAX_ITEMS {
        return Err(AppError::validation(format!(
            "too many items ({}, max {MAX_ITEMS})",
            order.items.len()
        )));
    }
    for (index, item) in order.items.iter().enumerate() {
        validate_line_item(item, index)?;
    }

    validate_amount(order.total, "total", MAX_TOTAL)?;

    if !order.payment_method.is_accepted() {
        return Err(AppError::new(ErrorCode::InvalidPaymentMethod)
            .with_detail("paymentMethod", order.payment_method.as_str()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentMethod;

    fn item(name: &str, price: f64, quantity: i32) -> LineItem {
        LineItem {
            name: name.to_string(),
            price,
            quantity,
            category: None,
        }
    }

    fn order(items: Vec<LineItem>, total: f64, method: PaymentMethod) -> OrderCreate {
        OrderCreate {
            items,
            total,
            payment_method: method,
            date: None,
        }
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Pho", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(65), "username", MAX_USERNAME_LEN).is_err());
        // length counts characters, not bytes
        assert!(validate_required_text("Phở bò", "name", 6).is_ok());
    }

    #[test]
    fn test_valid_order() {
        let o = order(vec![item("Pho", 50000.0, 2)], 100000.0, PaymentMethod::Cash);
        assert!(validate_order_create(&o).is_ok());
    }

    #[test]
    fn test_empty_order_rejected() {
        let o = order(vec![], 0.0, PaymentMethod::Cash);
        assert_eq!(
            validate_order_create(&o).unwrap_err().code,
            ErrorCode::OrderEmpty
        );
    }

    #[test]
    fn test_bad_amounts_rejected() {
        for (price, quantity, total) in [
            (f64::NAN, 1, 0.0),
            (-1.0, 1, 0.0),
            (MAX_PRICE * 2.0, 1, 0.0),
            (10.0, 0, 10.0),
            (10.0, MAX_QUANTITY + 1, 10.0),
            (10.0, 1, f64::INFINITY),
            (10.0, 1, -10.0),
        ] {
            let o = order(vec![item("Pho", price, quantity)], total, PaymentMethod::Bank);
            let err = validate_order_create(&o).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidAmount, "{price} {quantity} {total}");
        }
    }

    #[test]
    fn test_unknown_payment_method_rejected() {
        let o = order(
            vec![item("Pho", 50000.0, 1)],
            50000.0,
            PaymentMethod::Other("card".to_string()),
        );
        assert_eq!(
            validate_order_create(&o).unwrap_err().code,
            ErrorCode::InvalidPaymentMethod
        );
    }

    #[test]
    fn test_blank_item_name_rejected() {
        let o = order(vec![item(" ", 1.0, 1)], 1.0, PaymentMethod::Cash);
        let err = validate_order_create(&o).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap().get("field").unwrap(), "items[0].name");
    }
}

/// API routes and handlers
pub mod calendar;
pub mod maps;
pub mod weather;

use crate::context::AppContext;
use crate::error::{GatewayError, GatewayResult};
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(maps::routes())
        .merge(weather::routes())
        .merge(calendar::routes())
}

/// Validate a required free-text parameter against a length range
pub(crate) fn validate_text(field: &str, value: &str, max: usize) -> GatewayResult<()> {
    if value.is_empty() {
        return Err(GatewayError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }
    if value.len() > max {
        return Err(GatewayError::Validation(format!(
            "{} too long (max {} characters)",
            field, max
        )));
    }
    Ok(())
}

/// Validate a YYYY-MM-DD date string
pub(crate) fn validate_date(field: &str, value: &str) -> GatewayResult<()> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());

    if !well_formed {
        return Err(GatewayError::Validation(format!(
            "{} must match YYYY-MM-DD",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_bounds() {
        assert!(validate_text("q", "museums", 200).is_ok());
        assert!(validate_text("q", "", 200).is_err());
        assert!(validate_text("q", &"x".repeat(201), 200).is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date("start_date", "2024-01-15").is_ok());
        assert!(validate_date("start_date", "2024-1-15").is_err());
        assert!(validate_date("start_date", "15-01-2024").is_err());
        assert!(validate_date("start_date", "2024-01-15T00:00").is_err());
    }
}

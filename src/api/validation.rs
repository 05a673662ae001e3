use validator::Validate;

use crate::api::errors::ApiError;

/// Runs derive-based validation and turns failures into a 400.
pub(crate) fn validated<T: Validate>(payload: T) -> Result<T, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(payload)
}

pub(crate) fn require_positive_id(field: &'static str, value: i64) -> Result<i64, ApiError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!("{field} must be a positive id")))
    }
}

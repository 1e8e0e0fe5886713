//! Min-max normalisation between value ranges.

use rov_common::consts::NORMALISATION_PRECISION;
use rov_common::error::{ControlResult, ControlSystemError};

/// Linearly rescale `value` from `[current_min, current_max]` into
/// `[intended_min, intended_max]`, rounded to three decimal places.
///
/// Out-of-range input is an error, never clamped.
///
/// ```
/// use rov_control::normalise;
///
/// assert_eq!(normalise(0.0, -1.0, 1.0, 1100.0, 1900.0).unwrap(), 1500.0);
/// assert!(normalise(5.0, -1.0, 1.0, 1100.0, 1900.0).is_err());
/// ```
///
/// # Errors
///
/// - `DegenerateRange` if either range has equal bounds.
/// - `OutOfRange` if `value` is not within `[current_min, current_max]`.
pub fn normalise(
    value: f64,
    current_min: f64,
    current_max: f64,
    intended_min: f64,
    intended_max: f64,
) -> ControlResult<f64> {
    if current_min == current_max {
        return Err(ControlSystemError::DegenerateRange {
            min: current_min,
            max: current_max,
        });
    }
    if intended_min == intended_max {
        return Err(ControlSystemError::DegenerateRange {
            min: intended_min,
            max: intended_max,
        });
    }
    if !(current_min..=current_max).contains(&value) {
        return Err(ControlSystemError::OutOfRange {
            value,
            min: current_min,
            max: current_max,
        });
    }

    let scaled = intended_min
        + (value - current_min) * (intended_max - intended_min) / (current_max - current_min);
    Ok(round_to(scaled, NORMALISATION_PRECISION))
}

#[inline]
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

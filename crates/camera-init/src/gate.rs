//! Completeness gate applied before a result is accepted.

use crate::error::CameraInitError;
use crate::params::{CameraInitParams, IntrinsicDefaults};
use crate::report::UnknownSensor;

/// Fail the run when too few views ended up with a usable intrinsic.
///
/// Nothing is checked when incomplete output is allowed. Otherwise unknown
/// sensors are fatal unless a default focal length or field of view covered
/// them, and at least two complete views are needed (one with
/// `allow_single_view`).
pub fn check_completeness(
    complete_views: usize,
    unknown_sensors: &[UnknownSensor],
    params: &CameraInitParams,
    defaults: &IntrinsicDefaults,
) -> Result<(), CameraInitError> {
    if params.allow_incomplete_output {
        return Ok(());
    }
    if !unknown_sensors.is_empty() && !defaults.has_focal_fallback() {
        return Err(CameraInitError::UnknownSensors {
            sensors: unknown_sensors.to_vec(),
        });
    }
    let required = if params.allow_single_view { 1 } else { 2 };
    if complete_views < required {
        return Err(CameraInitError::NotEnoughCompleteViews {
            found: complete_views,
            required,
        });
    }
    Ok(())
}

//! Focal length resolution in millimetres.

use crate::sensor::film_diagonal_mm;

/// Diagonal of a sensor of the given width and `width / height` ratio.
fn sensor_diagonal_mm(sensor_width_mm: f64, aspect_ratio: f64) -> f64 {
    sensor_width_mm.hypot(sensor_width_mm / aspect_ratio)
}

/// Resolve the true focal length of a view.
///
/// A positive metadata focal length wins. Otherwise, with a resolved sensor
/// width and a 35mm-equivalent focal length, the focal length is scaled by
/// the ratio of the sensor diagonal to the film diagonal.
pub fn resolve_focal_length(
    metadata_focal_mm: Option<f64>,
    focal_35mm: Option<f64>,
    sensor_width_mm: Option<f64>,
    aspect_ratio: f64,
) -> Option<f64> {
    if let Some(focal) = metadata_focal_mm.filter(|f| f.is_finite() && *f > 0.0) {
        return Some(focal);
    }
    let (focal_35mm, sensor_width) = (focal_35mm?, sensor_width_mm?);
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return None;
    }
    let focal = sensor_diagonal_mm(sensor_width, aspect_ratio) * focal_35mm / film_diagonal_mm();
    (focal.is_finite() && focal > 0.0).then_some(focal)
}

/// 35mm-equivalent focal length of a lens on the given sensor.
pub fn equivalent_focal_35mm(focal_length_mm: f64, sensor_width_mm: f64, aspect_ratio: f64) -> f64 {
    focal_length_mm * film_diagonal_mm() / sensor_diagonal_mm(sensor_width_mm, aspect_ratio)
}

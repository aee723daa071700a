//! Sensor width resolution.
//!
//! Cascade: sensor database, then inversion of the 35mm-equivalent focal
//! length, then failure. The 35mm branch may also resolve the focal length
//! as a side effect; that value is final for the view.

use camera_init_core::{Datasheet, InitMode, SensorDatabase, View};
use serde::Serialize;

/// Width of 35mm film in millimetres.
pub const FILM_WIDTH_MM: f64 = 36.0;
/// Height of 35mm film in millimetres.
pub const FILM_HEIGHT_MM: f64 = 24.0;

/// Diagonal of a 36x24 mm film frame.
pub fn film_diagonal_mm() -> f64 {
    FILM_WIDTH_MM.hypot(FILM_HEIGHT_MM)
}

/// Per-view classification of how the sensor lookup went.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    Ok,
    /// Neither make nor model is known.
    NoMetadata,
    /// Make or model is known but the database has no entry and no 35mm tag helped.
    UnknownSensor,
    /// The database entry that matched names a slightly different model.
    SensorMismatch {
        queried_model: String,
        datasheet: Datasheet,
    },
}

/// Inputs of the sensor width cascade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorQuery<'a> {
    pub make: &'a str,
    pub model: &'a str,
    /// 35mm-equivalent focal length, strictly positive when present.
    pub focal_35mm: Option<f64>,
    /// True focal length in millimetres, strictly positive when present.
    pub focal_length_hint_mm: Option<f64>,
    /// `width / height` of the image.
    pub aspect_ratio: f64,
}

impl<'a> SensorQuery<'a> {
    pub fn from_view(view: &'a View) -> Self {
        Self {
            make: view.make(),
            model: view.model(),
            focal_35mm: view.focal_length_in_35mm(),
            focal_length_hint_mm: view.focal_length_mm().filter(|f| *f > 0.0),
            aspect_ratio: view.aspect_ratio(),
        }
    }

    pub fn has_camera_metadata(&self) -> bool {
        !self.make.is_empty() || !self.model.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SensorResolution {
    pub sensor_width_mm: Option<f64>,
    /// Set only when the 35mm branch derived it without a focal hint.
    pub focal_length_mm: Option<f64>,
    pub init_mode: InitMode,
    pub diagnostic: Diagnostic,
}

/// Resolve the sensor width of one view.
pub fn resolve_sensor_width(query: SensorQuery<'_>, db: &dyn SensorDatabase) -> SensorResolution {
    let mut resolution = SensorResolution {
        sensor_width_mm: None,
        focal_length_mm: None,
        init_mode: InitMode::Unresolved,
        diagnostic: Diagnostic::Ok,
    };

    if query.has_camera_metadata() {
        if let Some(datasheet) = db.lookup(query.make, query.model) {
            log::trace!(
                "sensor width found in database: {} {} -> {} mm",
                query.make,
                query.model,
                datasheet.sensor_width_mm
            );
            if datasheet.sensor_width_mm.is_finite() && datasheet.sensor_width_mm > 0.0 {
                resolution.sensor_width_mm = Some(datasheet.sensor_width_mm);
                if query.focal_length_hint_mm.is_some() {
                    resolution.init_mode = InitMode::ComputedFromMetadata;
                }
                if datasheet.model != query.model {
                    resolution.diagnostic = Diagnostic::SensorMismatch {
                        queried_model: query.model.to_string(),
                        datasheet,
                    };
                }
            }
        }
    }

    if resolution.sensor_width_mm.is_none() {
        if let Some(focal_35mm) = query.focal_35mm {
            if let Some((width, focal)) =
                sensor_width_from_35mm(focal_35mm, query.focal_length_hint_mm, query.aspect_ratio)
            {
                resolution.sensor_width_mm = Some(width);
                resolution.focal_length_mm = focal;
                resolution.init_mode = InitMode::EstimatedFrom35mm;
            }
        }
    }

    if resolution.sensor_width_mm.is_none() {
        resolution.diagnostic = if query.has_camera_metadata() {
            Diagnostic::UnknownSensor
        } else {
            Diagnostic::NoMetadata
        };
    }
    resolution
}

/// Invert the 35mm-film geometry.
///
/// With a known true focal length the sensor diagonal follows from the crop
/// factor. Without it the sensor is assumed to have the film diagonal and the
/// focal length is derived from the equivalent one; it is returned as the
/// second element. `None` for a degenerate aspect ratio or focal length.
pub fn sensor_width_from_35mm(
    focal_35mm: f64,
    focal_length_hint_mm: Option<f64>,
    aspect_ratio: f64,
) -> Option<(f64, Option<f64>)> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(focal_35mm) || !usable(aspect_ratio) {
        return None;
    }
    let inv_ratio = 1.0 / aspect_ratio;
    let width_over_diag = (1.0 / (1.0 + inv_ratio * inv_ratio)).sqrt();

    match focal_length_hint_mm.filter(|f| usable(*f)) {
        Some(hint) => {
            let sensor_diag = hint * film_diagonal_mm() / focal_35mm;
            Some((sensor_diag * width_over_diag, None))
        }
        None => {
            let width = film_diagonal_mm() * width_over_diag;
            Some((width, Some(width * focal_35mm / FILM_WIDTH_MM)))
        }
    }
}

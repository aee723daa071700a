//! Per-view sensor and focal length cascade.

use camera_init_core::{InitMode, SensorDatabase, View, ViewId};

use crate::focal::resolve_focal_length;
use crate::sensor::{resolve_sensor_width, Diagnostic, SensorQuery};

/// What the cascade found for one view.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionOutcome {
    pub view_id: ViewId,
    pub sensor_width_mm: Option<f64>,
    pub focal_length_mm: Option<f64>,
    pub init_mode: InitMode,
    pub diagnostic: Diagnostic,
    /// The 35mm-equivalent focal length fed the result.
    pub used_35mm: bool,
}

impl ResolutionOutcome {
    /// Both sensor width and focal length are known.
    pub fn is_resolved(&self) -> bool {
        self.sensor_width_mm.is_some() && self.focal_length_mm.is_some()
    }

    pub fn sensor_resolved(&self) -> bool {
        self.sensor_width_mm.is_some()
    }
}

/// Run the sensor width resolver, then the focal length resolver.
///
/// A focal length produced by the sensor stage is kept as is; the focal
/// stage only fills a gap.
pub fn resolve_view(view: &View, db: &dyn SensorDatabase) -> ResolutionOutcome {
    let query = SensorQuery::from_view(view);
    let sensor = resolve_sensor_width(query, db);
    let mut init_mode = sensor.init_mode;
    let mut used_35mm = sensor.init_mode == InitMode::EstimatedFrom35mm;

    let focal_length_mm = match sensor.focal_length_mm {
        Some(focal) => Some(focal),
        None => {
            let focal = resolve_focal_length(
                query.focal_length_hint_mm,
                query.focal_35mm,
                sensor.sensor_width_mm,
                query.aspect_ratio,
            );
            if query.focal_length_hint_mm.is_none() && focal.is_some() {
                init_mode = InitMode::EstimatedFrom35mm;
                used_35mm = true;
            }
            focal
        }
    };

    log::debug!(
        "view {} ({}): sensor {:?} mm, focal {:?} mm, {:?}",
        view.view_id,
        view.image_path.display(),
        sensor.sensor_width_mm,
        focal_length_mm,
        init_mode
    );

    ResolutionOutcome {
        view_id: view.view_id,
        sensor_width_mm: sensor.sensor_width_mm,
        focal_length_mm,
        init_mode,
        diagnostic: sensor.diagnostic,
        used_35mm,
    }
}

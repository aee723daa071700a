//! Run summary.

use std::collections::BTreeSet;
use std::path::PathBuf;

use camera_init_core::{Datasheet, View};
use serde::Serialize;

use crate::resolve::ResolutionOutcome;
use crate::sensor::Diagnostic;

/// A camera with metadata that the sensor database does not know.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnknownSensor {
    pub make: String,
    pub model: String,
    /// First image taken with this camera.
    pub image_path: PathBuf,
}

/// A camera matched to a database entry with a different model name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SensorMismatch {
    pub make: String,
    pub model: String,
    pub image_path: PathBuf,
    pub datasheet: Datasheet,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Focal35mmEstimate {
    pub image_path: PathBuf,
    pub sensor_width_mm: f64,
    pub focal_length_mm: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CameraInitReport {
    pub view_count: usize,
    pub complete_view_count: usize,
    pub intrinsic_count: usize,
    pub rig_count: usize,
    pub no_metadata_views: Vec<PathBuf>,
    pub unknown_sensors: Vec<UnknownSensor>,
    pub sensor_mismatches: Vec<SensorMismatch>,
    pub estimated_from_35mm: Vec<Focal35mmEstimate>,
    #[serde(skip)]
    seen_unknown: BTreeSet<(String, String)>,
    #[serde(skip)]
    seen_mismatch: BTreeSet<(String, String)>,
}

impl CameraInitReport {
    /// Account for the resolution outcome of one view. Cameras are listed once.
    pub fn record(&mut self, view: &View, outcome: &ResolutionOutcome) {
        let camera = (view.make().to_string(), view.model().to_string());
        match &outcome.diagnostic {
            Diagnostic::Ok => {}
            Diagnostic::NoMetadata => self.no_metadata_views.push(view.image_path.clone()),
            Diagnostic::UnknownSensor => {
                if self.seen_unknown.insert(camera.clone()) {
                    self.unknown_sensors.push(UnknownSensor {
                        make: camera.0,
                        model: camera.1,
                        image_path: view.image_path.clone(),
                    });
                }
            }
            Diagnostic::SensorMismatch { datasheet, .. } => {
                if self.seen_mismatch.insert(camera.clone()) {
                    self.sensor_mismatches.push(SensorMismatch {
                        make: camera.0,
                        model: camera.1,
                        image_path: view.image_path.clone(),
                        datasheet: datasheet.clone(),
                    });
                }
            }
        }
        if outcome.used_35mm {
            if let Some(sensor_width_mm) = outcome.sensor_width_mm {
                self.estimated_from_35mm.push(Focal35mmEstimate {
                    image_path: view.image_path.clone(),
                    sensor_width_mm,
                    focal_length_mm: outcome.focal_length_mm,
                });
            }
        }
    }

    /// Emit the summary through the `log` facade.
    pub fn log(&self) {
        for sensor in &self.sensor_mismatches {
            log::warn!(
                "camera found in database with a slightly different name: queried '{} {}', database '{} {}' ({} mm), e.g. '{}'",
                sensor.make,
                sensor.model,
                sensor.datasheet.brand,
                sensor.datasheet.model,
                sensor.datasheet.sensor_width_mm,
                sensor.image_path.display()
            );
        }
        for sensor in &self.unknown_sensors {
            log::warn!(
                "sensor width unknown for '{}' '{}', e.g. '{}'",
                sensor.make,
                sensor.model,
                sensor.image_path.display()
            );
        }
        if !self.no_metadata_views.is_empty() {
            log::warn!(
                "{} image(s) without camera make/model metadata",
                self.no_metadata_views.len()
            );
            for path in &self.no_metadata_views {
                log::debug!("  no metadata: {}", path.display());
            }
        }
        if !self.estimated_from_35mm.is_empty() {
            log::info!(
                "{} intrinsic(s) estimated from the 35mm-equivalent focal length",
                self.estimated_from_35mm.len()
            );
        }
        log::info!(
            "{} views listed, {} with a resolved intrinsic, {} intrinsics, {} rigs",
            self.view_count,
            self.complete_view_count,
            self.intrinsic_count,
            self.rig_count
        );
    }
}

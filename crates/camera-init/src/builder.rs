//! Intrinsic construction from resolved values or caller defaults.

use camera_init_core::{CameraModel, InitMode, Intrinsic, View};

use crate::params::IntrinsicDefaults;

/// Focal length in pixels from a horizontal field of view.
pub fn focal_from_fov(width_pix: f64, fov_deg: f64) -> f64 {
    (width_pix / 2.0) / (fov_deg.to_radians() / 2.0).tan()
}

/// Pick the model family for a new intrinsic.
///
/// An explicit default wins. A `Custom` make may name the family in its
/// model string. GoPro bodies and very short 35mm-equivalent focal lengths
/// get a fisheye model. Everything else is `radial3`.
pub fn choose_camera_model(view: &View, defaults: &IntrinsicDefaults) -> CameraModel {
    if let Some(model) = defaults.camera_model {
        return model;
    }
    let make = view.make();
    if make.eq_ignore_ascii_case("custom") {
        if let Ok(model) = view.model().parse::<CameraModel>() {
            return model;
        }
    }
    if make.eq_ignore_ascii_case("gopro") {
        return CameraModel::Fisheye4;
    }
    if view.focal_length_in_35mm().is_some_and(|f| f < 18.0) {
        return CameraModel::Fisheye4;
    }
    CameraModel::Radial3
}

/// Build the intrinsic of one view.
///
/// The pixel focal length comes from the resolved millimetre values when
/// both are known, else from the default focal length, else from the default
/// field of view. Without any of them the focal length is `-1`.
pub fn build_intrinsic(
    view: &View,
    focal_length_mm: Option<f64>,
    sensor_width_mm: Option<f64>,
    defaults: &IntrinsicDefaults,
    init_mode: InitMode,
) -> Intrinsic {
    let width = f64::from(view.width);
    let (focal_length_pix, init_mode) = match (focal_length_mm, sensor_width_mm) {
        (Some(focal), Some(sensor)) if sensor > 0.0 => {
            let mode = match init_mode {
                InitMode::Unresolved => InitMode::ComputedFromMetadata,
                mode => mode,
            };
            (focal * width / sensor, mode)
        }
        _ => match (defaults.focal_length_pix, defaults.field_of_view_deg) {
            (Some(focal), _) => (focal, InitMode::DefaultFocalLength),
            (None, Some(fov)) => (focal_from_fov(width, fov), InitMode::DefaultFieldOfView),
            (None, None) => (-1.0, InitMode::Unresolved),
        },
    };

    let mut intrinsic = Intrinsic::new(
        choose_camera_model(view, defaults),
        view.width,
        view.height,
        focal_length_pix,
    );
    if let Some(pp) = defaults.principal_point {
        intrinsic.principal_point = pp;
    }
    intrinsic.serial_number = view.serial_number();
    intrinsic.init_mode = init_mode;
    intrinsic
}

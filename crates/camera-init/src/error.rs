use crate::params::ParamsError;
use crate::report::UnknownSensor;
use crate::rig::RigError;

fn describe(sensors: &[UnknownSensor]) -> String {
    sensors
        .iter()
        .map(|s| format!("'{} {}' ({})", s.make, s.model, s.image_path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run-level failures.
#[derive(thiserror::Error, Debug)]
pub enum CameraInitError {
    #[error("no input views")]
    NoViews,
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Rig(#[from] RigError),
    #[error(
        "sensor width unknown for {}; add the cameras to the sensor database, provide a default focal length or field of view, or allow incomplete output",
        describe(.sensors)
    )]
    UnknownSensors { sensors: Vec<UnknownSensor> },
    #[error("only {found} view(s) with a resolved intrinsic, at least {required} required")]
    NotEnoughCompleteViews { found: usize, required: usize },
}

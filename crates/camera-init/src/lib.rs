//! Initial camera intrinsics for structure-from-motion.
//!
//! Given a set of views (listed from a folder or loaded from a project file),
//! this crate derives a first guess of each camera's intrinsics from EXIF
//! metadata and a sensor database, groups views that share a camera, detects
//! multi-camera rigs from the folder layout and refuses results with too few
//! usable views.
//!
//! ## Quickstart
//!
//! ```no_run
//! use camera_init::{initialize_cameras, views_from_folder, CameraInitParams, SensorDb};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let project = views_from_folder("images/")?;
//! let db = SensorDb::load("cameraSensors.db")?;
//! let params = CameraInitParams {
//!     default_field_of_view_deg: Some(45.0),
//!     ..CameraInitParams::default()
//! };
//!
//! let (project, report) = initialize_cameras(project, &params, &db)?;
//! project.write_json("out/cameraInit.json")?;
//! println!("{} of {} views resolved", report.complete_view_count, report.view_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `camera_init::core`: views, intrinsics, datasheets, the project file.
//! - [`sensor`] and [`focal`]: the millimetre cascades.
//! - [`builder`]: pixel focal length, principal point and model family.
//! - [`grouping`]: grouping keys and id assignment.
//! - [`rig`]: `rig/<sub_pose>/<frame>.ext` detection and validation.
//! - [`gate`]: completeness checks.
//! - [`pipeline`]: parallel resolution and deterministic merge.
//! - [`listing`] (feature `image`): folder listing and EXIF probing.

pub use camera_init_core as core;

pub mod builder;
pub mod focal;
pub mod gate;
pub mod grouping;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod rig;
pub mod sensor;
pub mod sensor_db;

mod error;

#[cfg(feature = "image")]
pub mod listing;

pub use camera_init_core::{
    CameraModel, Datasheet, InitMode, Intrinsic, Project, SensorDatabase, View,
};
pub use error::CameraInitError;
pub use grouping::{IdSource, SeededIds, SequentialIds};
pub use params::{CameraInitParams, GroupingPolicy, IntrinsicDefaults, ParamsError};
pub use pipeline::{initialize_cameras, initialize_cameras_with_ids};
pub use report::CameraInitReport;
pub use sensor_db::{SensorDb, SensorDbError};

#[cfg(feature = "image")]
pub use listing::{list_images, probe_view, views_from_folder, ListingError};

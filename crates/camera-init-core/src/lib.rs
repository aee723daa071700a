//! Core types for camera initialization.
//!
//! This crate holds the data model shared by the resolution engine and its
//! callers: image views with their metadata, pinhole-family intrinsics,
//! sensor datasheets and the lookup capability, and the persisted project.
//! It performs no resolution itself.

mod hash;
mod intrinsic;
mod logger;
mod project;
mod sensor;
mod view;

pub use hash::{path_id, StableHasher};
pub use intrinsic::{CameraModel, Distortion, InitMode, Intrinsic, UnknownCameraModel};
pub use project::{JsonIoError, Project, Rig, PROJECT_VERSION};
pub use sensor::{Datasheet, SensorDatabase};
pub use view::{tags, IntrinsicId, RigAnnotation, RigId, View, ViewId};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_verbose_level};

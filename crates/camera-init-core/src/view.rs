//! Image records and their metadata accessors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub type ViewId = u32;
pub type IntrinsicId = u32;
pub type RigId = u32;

/// Well-known metadata keys.
pub mod tags {
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const FOCAL_LENGTH: &str = "Exif:FocalLength";
    pub const FOCAL_LENGTH_IN_35MM: &str = "Exif:FocalLengthIn35mmFilm";
    pub const BODY_SERIAL_NUMBER: &str = "Exif:BodySerialNumber";
    pub const LENS_SERIAL_NUMBER: &str = "Exif:LensSerialNumber";
}

/// Position of a view inside a multi-camera rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RigAnnotation {
    pub rig_id: RigId,
    /// Which physical camera of the rig took the image.
    pub sub_pose_id: i32,
    /// Synchronized capture instant.
    pub frame_id: u32,
}

/// One input image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub view_id: ViewId,
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub intrinsic_id: Option<IntrinsicId>,
    #[serde(default)]
    pub rig: Option<RigAnnotation>,
}

impl View {
    pub fn new(view_id: ViewId, image_path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            view_id,
            image_path: image_path.into(),
            width,
            height,
            metadata: BTreeMap::new(),
            intrinsic_id: None,
            rig: None,
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Raw metadata value, if present.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Metadata value parsed as a finite number.
    pub fn digit_metadata(&self, key: &str) -> Option<f64> {
        self.metadata(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn has_digit_metadata(&self, key: &str) -> bool {
        self.digit_metadata(key).is_some()
    }

    /// Camera brand, trimmed; empty when absent.
    pub fn make(&self) -> &str {
        self.metadata(tags::MAKE).map(str::trim).unwrap_or_default()
    }

    /// Camera model, trimmed; empty when absent.
    pub fn model(&self) -> &str {
        self.metadata(tags::MODEL).map(str::trim).unwrap_or_default()
    }

    pub fn has_camera_metadata(&self) -> bool {
        !self.make().is_empty() || !self.model().is_empty()
    }

    /// Lens focal length in millimetres as reported by the camera.
    pub fn focal_length_mm(&self) -> Option<f64> {
        self.digit_metadata(tags::FOCAL_LENGTH)
    }

    /// 35mm-film equivalent focal length.
    ///
    /// EXIF stores `0` for "unknown", so only strictly positive values count.
    pub fn focal_length_in_35mm(&self) -> Option<f64> {
        self.digit_metadata(tags::FOCAL_LENGTH_IN_35MM)
            .filter(|f| *f > 0.0)
    }

    /// Body and lens serial numbers concatenated; empty when neither is known.
    pub fn serial_number(&self) -> String {
        let body = self.metadata(tags::BODY_SERIAL_NUMBER).unwrap_or_default();
        let lens = self.metadata(tags::LENS_SERIAL_NUMBER).unwrap_or_default();
        format!("{}{}", body.trim(), lens.trim())
    }

    /// `width / height`; NaN for a degenerate image size.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            return f64::NAN;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// Directory containing the image.
    pub fn folder(&self) -> &Path {
        self.image_path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn is_part_of_rig(&self) -> bool {
        self.rig.is_some()
    }
}

//! Run parameters and their validation.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use camera_init_core::{CameraModel, JsonIoError};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// How views are grouped into shared intrinsics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPolicy {
    /// Every view gets its own intrinsic.
    Ungrouped,
    /// Views with camera metadata share intrinsics by content; the others get one each.
    Metadata,
    /// As [`GroupingPolicy::Metadata`], metadata-less views are grouped per folder.
    #[default]
    MetadataOrFolder,
}

impl GroupingPolicy {
    /// Numeric code used on the command line (`0`, `1`, `2`).
    pub fn code(self) -> u8 {
        match self {
            GroupingPolicy::Ungrouped => 0,
            GroupingPolicy::Metadata => 1,
            GroupingPolicy::MetadataOrFolder => 2,
        }
    }
}

impl fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupingPolicy::Ungrouped => "ungrouped",
            GroupingPolicy::Metadata => "metadata",
            GroupingPolicy::MetadataOrFolder => "metadata_or_folder",
        };
        f.write_str(name)
    }
}

impl FromStr for GroupingPolicy {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "ungrouped" => Ok(GroupingPolicy::Ungrouped),
            "1" | "metadata" => Ok(GroupingPolicy::Metadata),
            "2" | "metadata_or_folder" => Ok(GroupingPolicy::MetadataOrFolder),
            _ => Err(ParamsError::UnknownGroupingPolicy(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("cannot combine {first} with {second}")]
    Conflicting {
        first: &'static str,
        second: &'static str,
    },
    #[error("invalid default K matrix '{0}': expected \"f;0;ppx;0;f;ppy;0;0;1\"")]
    InvalidKMatrix(String),
    #[error("default focal length must be positive, got {0}")]
    InvalidFocalLength(f64),
    #[error("default field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),
    #[error("unknown grouping policy '{0}' (expected 0, 1 or 2)")]
    UnknownGroupingPolicy(String),
}

/// Parameters of one initialization run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraInitParams {
    /// Focal length in pixels used when metadata cannot provide one.
    pub default_focal_length_pix: Option<f64>,
    /// Horizontal field of view in degrees used when metadata cannot provide a focal length.
    pub default_field_of_view_deg: Option<f64>,
    /// `"f;0;ppx;0;f;ppy;0;0;1"`: default focal length and principal point.
    pub default_k_matrix: Option<String>,
    /// Camera model family forced on every new intrinsic.
    pub default_camera_model: Option<CameraModel>,
    pub grouping: GroupingPolicy,
    pub allow_incomplete_output: bool,
    pub allow_single_view: bool,
    /// Seed for ungrouped intrinsic ids; sequential ids when absent.
    pub id_seed: Option<u64>,
}

/// Caller defaults consumed by the intrinsic builder.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntrinsicDefaults {
    pub focal_length_pix: Option<f64>,
    pub field_of_view_deg: Option<f64>,
    pub principal_point: Option<[f64; 2]>,
    pub camera_model: Option<CameraModel>,
}

impl IntrinsicDefaults {
    /// True when a focal length can be built without metadata.
    pub fn has_focal_fallback(&self) -> bool {
        self.focal_length_pix.is_some() || self.field_of_view_deg.is_some()
    }
}

impl CameraInitParams {
    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, JsonIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check option combinations and extract the builder defaults.
    pub fn validate(&self) -> Result<IntrinsicDefaults, ParamsError> {
        if self.default_k_matrix.is_some() {
            if self.default_focal_length_pix.is_some() {
                return Err(ParamsError::Conflicting {
                    first: "a default K matrix",
                    second: "a default focal length",
                });
            }
            if self.default_field_of_view_deg.is_some() {
                return Err(ParamsError::Conflicting {
                    first: "a default K matrix",
                    second: "a default field of view",
                });
            }
        }
        if self.default_focal_length_pix.is_some() && self.default_field_of_view_deg.is_some() {
            return Err(ParamsError::Conflicting {
                first: "a default focal length",
                second: "a default field of view",
            });
        }

        let mut defaults = IntrinsicDefaults {
            camera_model: self.default_camera_model,
            ..IntrinsicDefaults::default()
        };

        if let Some(focal) = self.default_focal_length_pix {
            if !(focal.is_finite() && focal > 0.0) {
                return Err(ParamsError::InvalidFocalLength(focal));
            }
            defaults.focal_length_pix = Some(focal);
        }
        if let Some(fov) = self.default_field_of_view_deg {
            if !(fov.is_finite() && fov > 0.0 && fov < 180.0) {
                return Err(ParamsError::InvalidFieldOfView(fov));
            }
            defaults.field_of_view_deg = Some(fov);
        }
        if let Some(raw) = &self.default_k_matrix {
            let k = parse_k_matrix(raw)?;
            defaults.focal_length_pix = Some(k[(0, 0)]);
            let (ppx, ppy) = (k[(0, 2)], k[(1, 2)]);
            if ppx > 0.0 && ppy > 0.0 {
                defaults.principal_point = Some([ppx, ppy]);
            }
        }
        Ok(defaults)
    }
}

/// Parse a row-major `"f;0;ppx;0;f;ppy;0;0;1"` calibration matrix.
///
/// Exactly nine finite fields are required and the focal length must be
/// positive.
pub fn parse_k_matrix(raw: &str) -> Result<Matrix3<f64>, ParamsError> {
    let invalid = || ParamsError::InvalidKMatrix(raw.to_string());
    let values = raw
        .split(';')
        .map(|field| field.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    if values.len() != 9 || values[0] <= 0.0 {
        return Err(invalid());
    }
    Ok(Matrix3::from_row_slice(&values))
}

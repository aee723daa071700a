//! Pinhole-family camera intrinsics.
//!
//! The supported model families form a closed set. The family of an
//! [`Intrinsic`] is carried by its [`Distortion`] variant, so there is no
//! way to build a model whose parameters disagree with its family.

use std::fmt;
use std::str::FromStr;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::hash::StableHasher;
use crate::view::IntrinsicId;

/// Supported camera model families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraModel {
    Pinhole,
    Radial1,
    Radial3,
    Brown,
    Fisheye4,
    Fisheye1,
}

impl CameraModel {
    pub const ALL: [CameraModel; 6] = [
        CameraModel::Pinhole,
        CameraModel::Radial1,
        CameraModel::Radial3,
        CameraModel::Brown,
        CameraModel::Fisheye4,
        CameraModel::Fisheye1,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CameraModel::Pinhole => "pinhole",
            CameraModel::Radial1 => "radial1",
            CameraModel::Radial3 => "radial3",
            CameraModel::Brown => "brown",
            CameraModel::Fisheye4 => "fisheye4",
            CameraModel::Fisheye1 => "fisheye1",
        }
    }

    pub fn is_fisheye(self) -> bool {
        matches!(self, CameraModel::Fisheye4 | CameraModel::Fisheye1)
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown camera model '{0}' (expected one of: pinhole, radial1, radial3, brown, fisheye4, fisheye1)")]
pub struct UnknownCameraModel(pub String);

impl FromStr for CameraModel {
    type Err = UnknownCameraModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CameraModel::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| UnknownCameraModel(s.to_string()))
    }
}

/// Lens distortion parameters; the variant fixes the model family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distortion {
    Pinhole,
    Radial1 { k1: f64 },
    Radial3 { k1: f64, k2: f64, k3: f64 },
    Brown { k1: f64, k2: f64, k3: f64, t1: f64, t2: f64 },
    Fisheye4 { k1: f64, k2: f64, k3: f64, k4: f64 },
    Fisheye1 { omega: f64 },
}

impl Distortion {
    /// Zero-distortion parameters for a family.
    pub fn zero(model: CameraModel) -> Self {
        match model {
            CameraModel::Pinhole => Distortion::Pinhole,
            CameraModel::Radial1 => Distortion::Radial1 { k1: 0.0 },
            CameraModel::Radial3 => Distortion::Radial3 {
                k1: 0.0,
                k2: 0.0,
                k3: 0.0,
            },
            CameraModel::Brown => Distortion::Brown {
                k1: 0.0,
                k2: 0.0,
                k3: 0.0,
                t1: 0.0,
                t2: 0.0,
            },
            CameraModel::Fisheye4 => Distortion::Fisheye4 {
                k1: 0.0,
                k2: 0.0,
                k3: 0.0,
                k4: 0.0,
            },
            CameraModel::Fisheye1 => Distortion::Fisheye1 { omega: 0.0 },
        }
    }

    pub fn model(&self) -> CameraModel {
        match self {
            Distortion::Pinhole => CameraModel::Pinhole,
            Distortion::Radial1 { .. } => CameraModel::Radial1,
            Distortion::Radial3 { .. } => CameraModel::Radial3,
            Distortion::Brown { .. } => CameraModel::Brown,
            Distortion::Fisheye4 { .. } => CameraModel::Fisheye4,
            Distortion::Fisheye1 { .. } => CameraModel::Fisheye1,
        }
    }

    pub fn coefficients(&self) -> Vec<f64> {
        match *self {
            Distortion::Pinhole => Vec::new(),
            Distortion::Radial1 { k1 } => vec![k1],
            Distortion::Radial3 { k1, k2, k3 } => vec![k1, k2, k3],
            Distortion::Brown { k1, k2, k3, t1, t2 } => vec![k1, k2, k3, t1, t2],
            Distortion::Fisheye4 { k1, k2, k3, k4 } => vec![k1, k2, k3, k4],
            Distortion::Fisheye1 { omega } => vec![omega],
        }
    }
}

/// How the focal length of an intrinsic was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// Sensor width from the database and focal length from metadata.
    ComputedFromMetadata,
    /// Inferred from the 35mm-equivalent focal length tag.
    EstimatedFrom35mm,
    /// Caller-supplied focal length in pixels.
    DefaultFocalLength,
    /// Caller-supplied field of view.
    DefaultFieldOfView,
    /// No focal length could be derived.
    Unresolved,
}

/// A pinhole-family camera projection model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intrinsic {
    pub width: u32,
    pub height: u32,
    /// Focal length in pixels; `<= 0` means unresolved.
    pub focal_length_pix: f64,
    /// `[ppx, ppy]` in pixels.
    pub principal_point: [f64; 2],
    pub distortion: Distortion,
    /// Grouping discriminator: physical serial number, folder path, or rig slot.
    #[serde(default)]
    pub serial_number: String,
    pub init_mode: InitMode,
}

impl Intrinsic {
    /// Zero-distortion model of the given family, principal point at the image center.
    pub fn new(model: CameraModel, width: u32, height: u32, focal_length_pix: f64) -> Self {
        Self {
            width,
            height,
            focal_length_pix,
            principal_point: [f64::from(width) / 2.0, f64::from(height) / 2.0],
            distortion: Distortion::zero(model),
            serial_number: String::new(),
            init_mode: InitMode::Unresolved,
        }
    }

    pub fn model(&self) -> CameraModel {
        self.distortion.model()
    }

    /// True when the focal length is a usable, strictly positive number.
    pub fn is_resolved(&self) -> bool {
        self.focal_length_pix.is_finite() && self.focal_length_pix > 0.0
    }

    /// Calibration matrix `K` (zero skew, square pixels).
    pub fn k_matrix(&self) -> Matrix3<f64> {
        let f = self.focal_length_pix;
        let [ppx, ppy] = self.principal_point;
        Matrix3::new(f, 0.0, ppx, 0.0, f, ppy, 0.0, 0.0, 1.0)
    }

    /// Horizontal field of view in degrees, when resolved.
    pub fn horizontal_fov_deg(&self) -> Option<f64> {
        if !self.is_resolved() {
            return None;
        }
        let half_width = f64::from(self.width) / 2.0;
        Some(2.0 * (half_width / self.focal_length_pix).atan().to_degrees())
    }

    /// Content hash over family, image size, serial number and every numeric
    /// parameter. The init mode does not participate.
    pub fn hash_value(&self) -> IntrinsicId {
        let mut hasher = StableHasher::new();
        hasher.write_str(self.model().name());
        hasher.write_u32(self.width);
        hasher.write_u32(self.height);
        hasher.write_str(&self.serial_number);
        hasher.write_f64(self.focal_length_pix);
        hasher.write_f64(self.principal_point[0]);
        hasher.write_f64(self.principal_point[1]);
        for c in self.distortion.coefficients() {
            hasher.write_f64(c);
        }
        hasher.finish_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn camera_model_names_round_trip_through_from_str() {
        for model in CameraModel::ALL {
            assert_eq!(model.name().parse::<CameraModel>(), Ok(model));
        }
        assert_eq!("  Fisheye4 ".parse::<CameraModel>(), Ok(CameraModel::Fisheye4));
        assert!("equirectangular".parse::<CameraModel>().is_err());
    }

    #[test]
    fn distortion_variant_fixes_family() {
        let intrinsic = Intrinsic::new(CameraModel::Brown, 640, 480, 500.0);
        assert_eq!(intrinsic.model(), CameraModel::Brown);
        assert_eq!(intrinsic.distortion.coefficients().len(), 5);
        assert_eq!(intrinsic.principal_point, [320.0, 240.0]);
    }

    #[test]
    fn non_positive_focal_is_unresolved() {
        assert!(!Intrinsic::new(CameraModel::Radial3, 640, 480, -1.0).is_resolved());
        assert!(!Intrinsic::new(CameraModel::Radial3, 640, 480, 0.0).is_resolved());
        assert!(!Intrinsic::new(CameraModel::Radial3, 640, 480, f64::NAN).is_resolved());
        assert!(Intrinsic::new(CameraModel::Radial3, 640, 480, 1.0).is_resolved());
    }

    #[test]
    fn hash_depends_on_parameters_not_init_mode() {
        let a = Intrinsic::new(CameraModel::Radial3, 640, 480, 500.0);
        let mut b = a.clone();
        b.init_mode = InitMode::DefaultFieldOfView;
        assert_eq!(a.hash_value(), b.hash_value());

        let mut c = a.clone();
        c.serial_number = "/data/seq01".into();
        assert_ne!(a.hash_value(), c.hash_value());

        let d = Intrinsic::new(CameraModel::Radial3, 640, 480, 501.0);
        assert_ne!(a.hash_value(), d.hash_value());

        let e = Intrinsic::new(CameraModel::Pinhole, 640, 480, 500.0);
        assert_ne!(a.hash_value(), e.hash_value());
    }

    #[test]
    fn k_matrix_and_fov_are_consistent() {
        let intrinsic = Intrinsic::new(CameraModel::Pinhole, 1000, 800, 500.0);
        let k = intrinsic.k_matrix();
        assert_relative_eq!(k[(0, 0)], 500.0);
        assert_relative_eq!(k[(0, 2)], 500.0);
        assert_relative_eq!(k[(1, 2)], 400.0);
        assert_relative_eq!(intrinsic.horizontal_fov_deg().unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn serde_keeps_the_family_tag() {
        let intrinsic = Intrinsic::new(CameraModel::Fisheye1, 640, 480, 300.0);
        let json = serde_json::to_string(&intrinsic).unwrap();
        assert!(json.contains("\"type\":\"fisheye1\""));
        let back: Intrinsic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intrinsic);
    }
}

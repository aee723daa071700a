//! Multi-camera rig detection from the `rig/<sub_pose>/<frame>.ext` layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use camera_init_core::{path_id, Rig, RigAnnotation, RigId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error(
        "rig '{}': sub-pose {sub_pose_id} is outside [0, {sub_pose_count}); sub-pose folders must be numbered from 0 without gaps",
        .rig_path.display()
    )]
    SubPoseOutOfRange {
        rig_path: PathBuf,
        sub_pose_id: i32,
        sub_pose_count: usize,
    },
    #[error(
        "rig '{}': sub-pose {sub_pose_id} has {found} frames but sub-pose {reference} has {expected}",
        .rig_path.display()
    )]
    PoseCountMismatch {
        rig_path: PathBuf,
        sub_pose_id: i32,
        reference: i32,
        found: usize,
        expected: usize,
    },
}

fn stem_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Rig annotation of an image, if its path follows the rig layout.
///
/// A path whose grandparent folder is named `rig` but whose sub-pose folder
/// or file stem is not an integer is logged and treated as a plain image.
pub fn detect_rig(image_path: &Path) -> Option<RigAnnotation> {
    let sub_pose_dir = image_path.parent()?;
    let rig_dir = sub_pose_dir.parent()?;
    if stem_of(rig_dir) != Some("rig") {
        return None;
    }

    let frame_id = stem_of(image_path).and_then(|s| s.parse::<u32>().ok());
    let sub_pose_id = stem_of(sub_pose_dir).and_then(|s| s.parse::<i32>().ok());
    match (sub_pose_id, frame_id) {
        (Some(sub_pose_id), Some(frame_id)) => Some(RigAnnotation {
            rig_id: path_id(rig_dir),
            sub_pose_id,
            frame_id,
        }),
        _ => {
            log::warn!(
                "invalid rig structure for view '{}', used as a single image",
                image_path.display()
            );
            None
        }
    }
}

/// Frame counts per rig and sub-pose, filled during the serial merge.
#[derive(Clone, Debug, Default)]
pub struct RigCounter {
    poses: BTreeMap<RigId, BTreeMap<i32, usize>>,
    paths: BTreeMap<RigId, PathBuf>,
}

impl RigCounter {
    pub fn record(&mut self, rig: &RigAnnotation, image_path: &Path) {
        *self
            .poses
            .entry(rig.rig_id)
            .or_default()
            .entry(rig.sub_pose_id)
            .or_insert(0) += 1;
        if let Some(rig_dir) = image_path.parent().and_then(Path::parent) {
            self.paths
                .entry(rig.rig_id)
                .or_insert_with(|| rig_dir.to_path_buf());
        }
    }

    /// Check every rig and return the rig map.
    ///
    /// Sub-poses must be numbered `0..n` and all have the frame count of the
    /// lowest one.
    pub fn validate(&self) -> Result<BTreeMap<RigId, Rig>, RigError> {
        let mut rigs = BTreeMap::new();
        for (&rig_id, sub_poses) in &self.poses {
            let rig_path = || self.paths.get(&rig_id).cloned().unwrap_or_default();
            let sub_pose_count = sub_poses.len();
            let Some((&reference, &expected)) = sub_poses.iter().next() else {
                continue;
            };

            for (&sub_pose_id, &found) in sub_poses {
                let in_range = usize::try_from(sub_pose_id).is_ok_and(|i| i < sub_pose_count);
                if !in_range {
                    return Err(RigError::SubPoseOutOfRange {
                        rig_path: rig_path(),
                        sub_pose_id,
                        sub_pose_count,
                    });
                }
                if found != expected {
                    return Err(RigError::PoseCountMismatch {
                        rig_path: rig_path(),
                        sub_pose_id,
                        reference,
                        found,
                        expected,
                    });
                }
            }
            log::info!(
                "rig '{}': {sub_pose_count} sub-poses, {expected} frames each",
                rig_path().display()
            );
            rigs.insert(rig_id, Rig { sub_pose_count });
        }
        Ok(rigs)
    }
}

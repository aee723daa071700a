//! Persisted view/intrinsic/rig collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::intrinsic::Intrinsic;
use crate::view::{IntrinsicId, RigId, View, ViewId};

pub const PROJECT_VERSION: [u32; 3] = [1, 0, 0];

fn default_version() -> [u32; 3] {
    PROJECT_VERSION
}

#[derive(thiserror::Error, Debug)]
pub enum JsonIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A multi-camera rig: number of physical cameras (sub-poses).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rig {
    pub sub_pose_count: usize,
}

/// Views, the intrinsics they reference, and detected rigs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: [u32; 3],
    #[serde(default)]
    pub views: BTreeMap<ViewId, View>,
    #[serde(default)]
    pub intrinsics: BTreeMap<IntrinsicId, Intrinsic>,
    #[serde(default)]
    pub rigs: BTreeMap<RigId, Rig>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: PROJECT_VERSION,
            views: BTreeMap::new(),
            intrinsics: BTreeMap::new(),
            rigs: BTreeMap::new(),
        }
    }
}

impl Project {
    /// Project holding the given views, keyed by their ids.
    pub fn from_views(views: impl IntoIterator<Item = View>) -> Self {
        Self {
            views: views.into_iter().map(|v| (v.view_id, v)).collect(),
            ..Self::default()
        }
    }

    /// Intrinsic referenced by a view, if any.
    pub fn intrinsic_of(&self, view: &View) -> Option<&Intrinsic> {
        view.intrinsic_id.and_then(|id| self.intrinsics.get(&id))
    }

    /// Number of views whose intrinsic has a strictly positive focal length.
    pub fn complete_view_count(&self) -> usize {
        self.views
            .values()
            .filter(|v| self.intrinsic_of(v).is_some_and(Intrinsic::is_resolved))
            .count()
    }

    /// Load a project from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, JsonIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this project to disk as pretty JSON, creating the parent folder.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), JsonIoError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

//! Intrinsic grouping: which views share one set of parameters.
//!
//! Keys are computed per view without shared state ([`group_key`]); ids are
//! handed out afterwards, one view at a time in view id order, by
//! [`IntrinsicGroups::assign`].

use std::collections::{BTreeMap, BTreeSet};

use camera_init_core::{Intrinsic, IntrinsicId, RigAnnotation, StableHasher, View};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::GroupingPolicy;

/// Where an intrinsic id comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKey {
    /// A fresh id, never shared.
    Unique,
    /// Content hash of the built intrinsic and the camera's make and model;
    /// equal content shares the id.
    Content(IntrinsicId),
    /// The id the view already carried.
    Existing(IntrinsicId),
}

/// Serial number used to group metadata-less views.
fn fallback_serial(view: &View, rig: Option<&RigAnnotation>) -> String {
    match rig {
        Some(rig) => format!("no_metadata_rig_{}_{}", rig.rig_id, rig.sub_pose_id),
        None => view.folder().to_string_lossy().into_owned(),
    }
}

/// Intrinsic content plus the camera identity, so that two camera models
/// that happen to yield equal parameters stay apart.
fn content_id(view: &View, intrinsic: &Intrinsic) -> IntrinsicId {
    let mut hasher = StableHasher::new();
    hasher.write_u32(intrinsic.hash_value());
    hasher.write_str(view.make());
    hasher.write_str(view.model());
    hasher.finish_u32()
}

/// Compute the grouping key of a freshly built intrinsic.
///
/// Under [`GroupingPolicy::MetadataOrFolder`] a view without camera metadata
/// has the serial number of `intrinsic` replaced by its folder, or by its rig
/// slot when it belongs to a rig, before hashing.
pub fn group_key(
    view: &View,
    rig: Option<&RigAnnotation>,
    intrinsic: &mut Intrinsic,
    policy: GroupingPolicy,
    has_camera_metadata: bool,
) -> GroupKey {
    if policy == GroupingPolicy::Ungrouped {
        return GroupKey::Unique;
    }
    if !has_camera_metadata && policy == GroupingPolicy::MetadataOrFolder {
        intrinsic.serial_number = fallback_serial(view, rig);
    }
    if let Some(id) = view.intrinsic_id {
        return GroupKey::Existing(id);
    }
    if has_camera_metadata || policy == GroupingPolicy::MetadataOrFolder {
        GroupKey::Content(content_id(view, intrinsic))
    } else {
        GroupKey::Unique
    }
}

/// Source of ids for ungrouped intrinsics.
pub trait IdSource {
    fn next_id(&mut self) -> IntrinsicId;
}

/// `start, start + 1, ...`
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    next: IntrinsicId,
}

impl SequentialIds {
    pub fn starting_at(start: IntrinsicId) -> Self {
        Self { next: start }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> IntrinsicId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Pseudo-random ids from a seeded generator; reproducible for a given seed.
#[derive(Clone, Debug)]
pub struct SeededIds {
    rng: StdRng,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IdSource for SeededIds {
    fn next_id(&mut self) -> IntrinsicId {
        self.rng.random::<u32>()
    }
}

/// The intrinsic map being filled during the serial merge.
pub struct IntrinsicGroups<'a> {
    intrinsics: BTreeMap<IntrinsicId, Intrinsic>,
    refreshed: BTreeSet<IntrinsicId>,
    ids: &'a mut dyn IdSource,
}

impl<'a> IntrinsicGroups<'a> {
    /// Start from the intrinsics already present in a project.
    pub fn new(intrinsics: BTreeMap<IntrinsicId, Intrinsic>, ids: &'a mut dyn IdSource) -> Self {
        Self {
            intrinsics,
            refreshed: BTreeSet::new(),
            ids,
        }
    }

    /// Store `intrinsic` under the id its key designates and return that id.
    ///
    /// A content id that is already present is reused without inserting a
    /// duplicate. An existing id is overwritten once per run, by its first
    /// view.
    pub fn assign(&mut self, key: GroupKey, intrinsic: Intrinsic) -> IntrinsicId {
        match key {
            GroupKey::Unique => {
                let id = loop {
                    let id = self.ids.next_id();
                    if !self.intrinsics.contains_key(&id) {
                        break id;
                    }
                };
                self.intrinsics.insert(id, intrinsic);
                id
            }
            GroupKey::Content(id) => {
                match self.intrinsics.get(&id) {
                    Some(stored) if stored.hash_value() != intrinsic.hash_value() => {
                        log::warn!(
                            "intrinsic id {id} already holds different parameters, keeping the stored ones"
                        );
                    }
                    Some(_) => {}
                    None => {
                        self.intrinsics.insert(id, intrinsic);
                    }
                }
                id
            }
            GroupKey::Existing(id) => {
                if self.refreshed.insert(id) {
                    self.intrinsics.insert(id, intrinsic);
                }
                id
            }
        }
    }

    pub fn len(&self) -> usize {
        self.intrinsics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intrinsics.is_empty()
    }

    pub fn into_intrinsics(self) -> BTreeMap<IntrinsicId, Intrinsic> {
        self.intrinsics
    }
}

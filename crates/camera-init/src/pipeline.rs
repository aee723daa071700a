//! End-to-end initialization of a project.
//!
//! Views are resolved in parallel; each worker only reads the project and
//! returns a [`ViewPlan`]. Plans are then merged serially in view id order,
//! which is where views are annotated, ids are handed out and rigs are
//! counted. The merged project goes through rig validation and the
//! completeness gate.

use camera_init_core::{Intrinsic, Project, RigAnnotation, SensorDatabase, View, ViewId};
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::build_intrinsic;
use crate::error::CameraInitError;
use crate::gate::check_completeness;
use crate::grouping::{group_key, GroupKey, IdSource, IntrinsicGroups, SeededIds, SequentialIds};
use crate::params::{CameraInitParams, GroupingPolicy, IntrinsicDefaults};
use crate::report::CameraInitReport;
use crate::resolve::{resolve_view, ResolutionOutcome};
use crate::rig::{detect_rig, RigCounter};

/// What the merge stage does with a view's intrinsic.
#[derive(Clone, Debug, PartialEq)]
pub enum IntrinsicPlan {
    /// The view already references a resolved intrinsic.
    Keep,
    /// No intrinsic can be built; the view is left without one.
    Clear,
    /// Store a new intrinsic under the id its key designates.
    Assign { key: GroupKey, intrinsic: Intrinsic },
}

/// Result of the parallel stage for one view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewPlan {
    pub view_id: ViewId,
    pub rig: Option<RigAnnotation>,
    /// `None` when the existing intrinsic was kept.
    pub outcome: Option<ResolutionOutcome>,
    pub intrinsic: IntrinsicPlan,
}

/// Resolve one view without touching shared state.
pub fn plan_view(
    view: &View,
    existing: Option<&Intrinsic>,
    params: &CameraInitParams,
    defaults: &IntrinsicDefaults,
    db: &dyn SensorDatabase,
) -> ViewPlan {
    let rig = detect_rig(&view.image_path);

    if existing.is_some_and(Intrinsic::is_resolved) {
        log::debug!("view {}: intrinsic already initialized", view.view_id);
        return ViewPlan {
            view_id: view.view_id,
            rig,
            outcome: None,
            intrinsic: IntrinsicPlan::Keep,
        };
    }

    let outcome = resolve_view(view, db);
    if !outcome.sensor_resolved() && params.allow_incomplete_output {
        return ViewPlan {
            view_id: view.view_id,
            rig,
            outcome: Some(outcome),
            intrinsic: IntrinsicPlan::Clear,
        };
    }

    let mut intrinsic = build_intrinsic(
        view,
        outcome.focal_length_mm,
        outcome.sensor_width_mm,
        defaults,
        outcome.init_mode,
    );
    let key = group_key(
        view,
        rig.as_ref(),
        &mut intrinsic,
        params.grouping,
        view.has_camera_metadata(),
    );
    ViewPlan {
        view_id: view.view_id,
        rig,
        outcome: Some(outcome),
        intrinsic: IntrinsicPlan::Assign { key, intrinsic },
    }
}

fn default_ids(params: &CameraInitParams) -> Box<dyn IdSource> {
    match params.id_seed {
        Some(seed) => Box::new(SeededIds::new(seed)),
        None => Box::new(SequentialIds::default()),
    }
}

/// Initialize the intrinsics of every view of `project`.
///
/// Ungrouped ids are drawn from a generator seeded with
/// [`CameraInitParams::id_seed`], or sequentially when no seed is set.
pub fn initialize_cameras(
    project: Project,
    params: &CameraInitParams,
    db: &dyn SensorDatabase,
) -> Result<(Project, CameraInitReport), CameraInitError> {
    let mut ids = default_ids(params);
    initialize_cameras_with_ids(project, params, db, ids.as_mut())
}

/// [`initialize_cameras`] with an explicit id source for ungrouped intrinsics.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(views = project.views.len()))
)]
pub fn initialize_cameras_with_ids(
    mut project: Project,
    params: &CameraInitParams,
    db: &dyn SensorDatabase,
    ids: &mut dyn IdSource,
) -> Result<(Project, CameraInitReport), CameraInitError> {
    if project.views.is_empty() {
        return Err(CameraInitError::NoViews);
    }
    let defaults = params.validate()?;
    if params.grouping == GroupingPolicy::Ungrouped {
        log::debug!("grouping disabled, every view gets its own intrinsic");
    }

    let mut plans: Vec<ViewPlan> = {
        let project = &project;
        project
            .views
            .par_iter()
            .map(|(_, view)| {
                let existing = project.intrinsic_of(view);
                plan_view(view, existing, params, &defaults, db)
            })
            .collect()
    };
    plans.sort_by_key(|plan| plan.view_id);

    let mut report = CameraInitReport::default();
    let mut rigs = RigCounter::default();
    let mut groups = IntrinsicGroups::new(std::mem::take(&mut project.intrinsics), ids);

    for plan in plans {
        let Some(view) = project.views.get_mut(&plan.view_id) else {
            continue;
        };
        view.rig = plan.rig;
        if let Some(rig) = &plan.rig {
            rigs.record(rig, &view.image_path);
        }
        if let Some(outcome) = &plan.outcome {
            report.record(view, outcome);
        }
        match plan.intrinsic {
            IntrinsicPlan::Keep => {}
            IntrinsicPlan::Clear => view.intrinsic_id = None,
            IntrinsicPlan::Assign { key, intrinsic } => {
                view.intrinsic_id = Some(groups.assign(key, intrinsic));
            }
        }
    }
    project.intrinsics = groups.into_intrinsics();

    project.rigs = rigs.validate()?;

    report.view_count = project.views.len();
    report.complete_view_count = project.complete_view_count();
    report.intrinsic_count = project.intrinsics.len();
    report.rig_count = project.rigs.len();
    report.log();

    check_completeness(
        report.complete_view_count,
        &report.unknown_sensors,
        params,
        &defaults,
    )?;
    Ok((project, report))
}

use std::collections::BTreeSet;
use std::path::Path;

use approx::assert_relative_eq;
use camera_init::core::{tags, IntrinsicId};
use camera_init::focal::equivalent_focal_35mm;
use camera_init::rig::RigError;
use camera_init::{
    initialize_cameras, views_from_folder, CameraInitError, CameraInitParams, Datasheet,
    GroupingPolicy, InitMode, Project, View,
};

fn db() -> Vec<Datasheet> {
    vec![
        Datasheet::new("Canon", "Canon EOS 5D", 35.8),
        Datasheet::new("NIKON CORPORATION", "NIKON D800", 35.9),
    ]
}

fn canon(view_id: u32, path: &str, focal_mm: &str) -> View {
    View::new(view_id, path, 4368, 2912)
        .with_metadata(tags::MAKE, "Canon")
        .with_metadata(tags::MODEL, "Canon EOS 5D")
        .with_metadata(tags::FOCAL_LENGTH, focal_mm)
}

fn bare(view_id: u32, path: &str) -> View {
    View::new(view_id, path, 1920, 1080)
}

fn fov(deg: f64) -> CameraInitParams {
    CameraInitParams {
        default_field_of_view_deg: Some(deg),
        ..CameraInitParams::default()
    }
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(width, height).save(path).unwrap();
}

#[test]
fn database_focal_is_exact() {
    let project = Project::from_views([
        canon(0, "/shoot/a.jpg", "24"),
        canon(1, "/shoot/b.jpg", "70"),
    ]);
    let (project, _) = initialize_cameras(project, &CameraInitParams::default(), &db()).unwrap();

    for (view, focal_mm) in [(&project.views[&0], 24.0), (&project.views[&1], 70.0)] {
        let intrinsic = project.intrinsic_of(view).unwrap();
        assert_relative_eq!(
            intrinsic.focal_length_pix,
            focal_mm * 4368.0 / 35.8,
            max_relative = 1e-9
        );
        assert_eq!(intrinsic.init_mode, InitMode::ComputedFromMetadata);
    }
    // different zoom, different intrinsic
    assert_ne!(project.views[&0].intrinsic_id, project.views[&1].intrinsic_id);
}

#[test]
fn unknown_camera_is_recovered_from_35mm_tag() {
    let (sensor_width, focal_mm, width, height) = (23.5, 18.0, 6000u32, 4000u32);
    let ratio = f64::from(width) / f64::from(height);
    let focal_35mm = equivalent_focal_35mm(focal_mm, sensor_width, ratio);
    let view = |id: u32| {
        View::new(id, format!("/trip/{id}.jpg"), width, height)
            .with_metadata(tags::MAKE, "FUJIFILM")
            .with_metadata(tags::MODEL, "X-T2")
            .with_metadata(tags::FOCAL_LENGTH, focal_mm.to_string())
            .with_metadata(tags::FOCAL_LENGTH_IN_35MM, focal_35mm.to_string())
    };
    let project = Project::from_views([view(0), view(1)]);
    let (project, report) = initialize_cameras(project, &CameraInitParams::default(), &db()).unwrap();

    let intrinsic = project.intrinsic_of(&project.views[&0]).unwrap();
    assert_relative_eq!(
        intrinsic.focal_length_pix,
        focal_mm * f64::from(width) / sensor_width,
        max_relative = 1e-9
    );
    assert_eq!(intrinsic.init_mode, InitMode::EstimatedFrom35mm);
    assert!(report.unknown_sensors.is_empty());
    assert_eq!(report.estimated_from_35mm.len(), 2);
    assert_relative_eq!(
        report.estimated_from_35mm[0].sensor_width_mm,
        sensor_width,
        max_relative = 1e-9
    );
}

#[test]
fn ungrouped_views_never_share_even_with_identical_metadata() {
    let params = CameraInitParams {
        grouping: GroupingPolicy::Ungrouped,
        id_seed: Some(42),
        ..CameraInitParams::default()
    };
    let project = Project::from_views((0..20).map(|i| canon(i, "/shoot/same.jpg", "50")));
    let (project, report) = initialize_cameras(project, &params, &db()).unwrap();

    let ids: BTreeSet<IntrinsicId> = project.views.values().filter_map(|v| v.intrinsic_id).collect();
    assert_eq!(ids.len(), 20);
    assert_eq!(report.intrinsic_count, 20);

    // same seed, same ids
    let again = Project::from_views((0..20).map(|i| canon(i, "/shoot/same.jpg", "50")));
    let (again, _) = initialize_cameras(again, &params, &db()).unwrap();
    assert_eq!(again, project);
}

#[test]
fn bare_views_are_grouped_per_folder() {
    let project = Project::from_views([
        bare(0, "/video1/0001.jpg"),
        bare(1, "/video1/0002.jpg"),
        bare(2, "/video2/0001.jpg"),
        bare(3, "/video2/0002.jpg"),
    ]);
    let (project, report) = initialize_cameras(project, &fov(60.0), &db()).unwrap();
    let id = |v: u32| project.views[&v].intrinsic_id.unwrap();

    assert_eq!(id(0), id(1));
    assert_eq!(id(2), id(3));
    assert_ne!(id(0), id(2));
    assert_eq!(project.intrinsics.len(), 2);
    assert_eq!(project.intrinsics[&id(0)].serial_number, "/video1");
    assert_eq!(report.no_metadata_views.len(), 4);
}

#[test]
fn strict_metadata_policy_isolates_bare_views() {
    let params = CameraInitParams {
        grouping: GroupingPolicy::Metadata,
        ..fov(60.0)
    };
    let project = Project::from_views([bare(0, "/video1/0001.jpg"), bare(1, "/video1/0002.jpg")]);
    let (project, _) = initialize_cameras(project, &params, &db()).unwrap();
    assert_ne!(project.views[&0].intrinsic_id, project.views[&1].intrinsic_id);
}

fn rig_project(layout: &[(i32, u32)], with_metadata: bool) -> Project {
    let mut views = Vec::new();
    for &(sub_pose, frames) in layout {
        for frame in 0..frames {
            let id = views.len() as u32;
            let path = format!("/capture/rig/{sub_pose}/{frame:04}.jpg");
            views.push(if with_metadata {
                canon(id, &path, "35")
            } else {
                bare(id, &path)
            });
        }
    }
    Project::from_views(views)
}

#[test]
fn balanced_rig_is_annotated() {
    let project = rig_project(&[(0, 3), (1, 3), (2, 3)], false);
    let (project, report) = initialize_cameras(project, &fov(90.0), &db()).unwrap();

    assert_eq!(report.rig_count, 1);
    let rig = project.rigs.values().next().unwrap();
    assert_eq!(rig.sub_pose_count, 3);

    // one intrinsic per physical camera
    assert_eq!(project.intrinsics.len(), 3);
    for view in project.views.values() {
        let annotation = view.rig.unwrap();
        let intrinsic = project.intrinsic_of(view).unwrap();
        assert_eq!(
            intrinsic.serial_number,
            format!("no_metadata_rig_{}_{}", annotation.rig_id, annotation.sub_pose_id)
        );
    }
}

#[test]
fn uneven_rig_is_fatal() {
    let project = rig_project(&[(0, 3), (1, 2)], true);
    let err = initialize_cameras(project, &CameraInitParams::default(), &db()).unwrap_err();
    assert!(matches!(
        err,
        CameraInitError::Rig(RigError::PoseCountMismatch { .. })
    ));
}

#[test]
fn rig_sub_pose_gap_is_fatal() {
    let project = rig_project(&[(0, 3), (1, 3), (3, 3)], true);
    let err = initialize_cameras(project, &CameraInitParams::default(), &db()).unwrap_err();
    assert!(matches!(
        err,
        CameraInitError::Rig(RigError::SubPoseOutOfRange { sub_pose_id: 3, .. })
    ));
}

#[test]
fn malformed_rig_path_is_a_plain_image() {
    let project = Project::from_views([
        canon(0, "/capture/rig/left/0001.jpg", "35"),
        canon(1, "/capture/rig/0/cover.jpg", "35"),
    ]);
    let (project, report) = initialize_cameras(project, &CameraInitParams::default(), &db()).unwrap();
    assert!(project.views.values().all(|v| v.rig.is_none()));
    assert_eq!(report.rig_count, 0);
}

#[test]
fn single_resolvable_view_needs_permission() {
    let mut views = vec![canon(0, "/mixed/a.jpg", "50")];
    views.extend((1..6).map(|i| bare(i, "/mixed/b.jpg")));

    let err = initialize_cameras(Project::from_views(views.clone()), &CameraInitParams::default(), &db())
        .unwrap_err();
    assert!(matches!(
        err,
        CameraInitError::NotEnoughCompleteViews {
            found: 1,
            required: 2
        }
    ));

    let params = CameraInitParams {
        allow_single_view: true,
        ..CameraInitParams::default()
    };
    let (project, report) = initialize_cameras(Project::from_views(views), &params, &db()).unwrap();
    assert_eq!(report.complete_view_count, 1);
    // unresolved views still reference an intrinsic, with a non-positive focal length
    let unresolved = project.intrinsic_of(&project.views[&1]).unwrap();
    assert!(!unresolved.is_resolved());
    assert_eq!(unresolved.init_mode, InitMode::Unresolved);
}

#[test]
fn unknown_sensor_is_fatal_without_defaults() {
    let view = |id: u32| {
        View::new(id, format!("/x/{id}.jpg"), 4000, 3000)
            .with_metadata(tags::MAKE, "Acme")
            .with_metadata(tags::MODEL, "Obscura 1")
            .with_metadata(tags::FOCAL_LENGTH, "8")
    };
    let project = Project::from_views([view(0), view(1)]);
    let err = initialize_cameras(project.clone(), &CameraInitParams::default(), &db()).unwrap_err();
    match err {
        CameraInitError::UnknownSensors { sensors } => {
            assert_eq!(sensors.len(), 1);
            assert_eq!(sensors[0].make, "Acme");
            assert_eq!(sensors[0].model, "Obscura 1");
        }
        other => panic!("unexpected error {other}"),
    }

    let (project, _) = initialize_cameras(project, &fov(70.0), &db()).unwrap();
    let intrinsic = project.intrinsic_of(&project.views[&0]).unwrap();
    assert_eq!(intrinsic.init_mode, InitMode::DefaultFieldOfView);
}

#[test]
fn bare_images_in_one_folder_share_a_field_of_view_intrinsic() {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("frames").join("0001.jpg"), 320, 240);
    write_jpeg(&dir.path().join("frames").join("0002.jpg"), 320, 240);

    let project = views_from_folder(dir.path()).unwrap();
    assert_eq!(project.views.len(), 2);

    let params = CameraInitParams {
        grouping: GroupingPolicy::MetadataOrFolder,
        ..fov(45.0)
    };
    let (project, report) = initialize_cameras(project, &params, &db()).unwrap();
    let a = project.views[&0].intrinsic_id.unwrap();
    let b = project.views[&1].intrinsic_id.unwrap();
    assert_eq!(a, b);

    let intrinsic = &project.intrinsics[&a];
    assert_relative_eq!(
        intrinsic.focal_length_pix,
        160.0 / 22.5f64.to_radians().tan(),
        max_relative = 1e-9
    );
    assert_eq!(intrinsic.init_mode, InitMode::DefaultFieldOfView);
    assert_eq!(intrinsic.principal_point, [160.0, 120.0]);
    assert_eq!(report.complete_view_count, 2);
}

#[test]
fn rerun_on_resolved_output_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let project = Project::from_views([
        canon(0, "/shoot/a.jpg", "24"),
        canon(1, "/shoot/b.jpg", "24"),
        bare(2, "/video/0001.jpg"),
        bare(3, "/video/0002.jpg"),
    ]);
    let params = fov(50.0);
    let (first, _) = initialize_cameras(project, &params, &db()).unwrap();

    let path = dir.path().join("cameraInit.json");
    first.write_json(&path).unwrap();
    let reloaded = Project::load_json(&path).unwrap();
    assert_eq!(reloaded, first);

    let (second, report) = initialize_cameras(reloaded, &params, &db()).unwrap();
    assert_eq!(second, first);
    assert_eq!(report.complete_view_count, second.views.len());
}

#[test]
fn unresolved_existing_intrinsic_is_replaced_in_place() {
    let params = fov(60.0);
    let mut project = Project::from_views([bare(0, "/v/1.jpg"), bare(1, "/v/2.jpg")]);
    let stale = camera_init::Intrinsic::new(camera_init::CameraModel::Radial3, 1920, 1080, -1.0);
    project.intrinsics.insert(5, stale);
    for view in project.views.values_mut() {
        view.intrinsic_id = Some(5);
    }

    let (project, _) = initialize_cameras(project, &params, &db()).unwrap();
    assert_eq!(project.intrinsics.len(), 1);
    assert!(project.intrinsics[&5].is_resolved());
    assert!(project.views.values().all(|v| v.intrinsic_id == Some(5)));
}

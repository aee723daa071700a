use std::error::Error;
use std::path::{Path, PathBuf};

use camera_init::core::{parse_verbose_level, CameraModel, Project};
use camera_init::{initialize_cameras, CameraInitParams, GroupingPolicy, SensorDb};
use clap::{ArgGroup, Parser};

#[cfg(not(feature = "tracing"))]
use camera_init::core::init_with_level;
#[cfg(feature = "tracing")]
use camera_init::core::init_tracing;

/// Initialize camera intrinsics of an image set.
#[derive(Debug, Parser)]
#[command(author, version, about = "Initial camera intrinsics from image metadata")]
#[command(group(ArgGroup::new("source").required(true).args(["input", "image_folder"])))]
struct Args {
    /// Project JSON file to complete.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Folder of images (jpg, jpeg, tif, tiff, exr), searched recursively.
    #[arg(long)]
    image_folder: Option<PathBuf>,

    /// Sensor database file (`brand;model;sensor_width_mm` lines).
    #[arg(long)]
    sensor_database: Option<PathBuf>,

    /// Output project file; its folder is created if needed.
    #[arg(long, default_value = "cameraInit.json")]
    output: PathBuf,

    /// JSON file with run parameters; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Default focal length in pixels.
    #[arg(long)]
    default_focal_length_pix: Option<f64>,

    /// Default horizontal field of view in degrees.
    #[arg(long)]
    default_field_of_view: Option<f64>,

    /// Default K matrix "f;0;ppx;0;f;ppy;0;0;1".
    #[arg(long)]
    default_intrinsic: Option<String>,

    /// Camera model family (pinhole, radial1, radial3, brown, fisheye4, fisheye1).
    #[arg(long)]
    default_camera_model: Option<CameraModel>,

    /// 0: no grouping, 1: group by metadata, 2: group by metadata or folder.
    #[arg(long)]
    group_camera_model: Option<GroupingPolicy>,

    /// Write the project even when some views could not be initialized.
    #[arg(long)]
    allow_incomplete_output: bool,

    /// Accept a result with a single initialized view.
    #[arg(long)]
    allow_single_view: bool,

    /// Seed for ungrouped intrinsic ids.
    #[arg(long)]
    id_seed: Option<u64>,

    /// fatal, error, warning, info, debug or trace. With the `tracing`
    /// feature, `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "info")]
    verbose_level: String,
}

impl Args {
    fn params(&self) -> Result<CameraInitParams, Box<dyn Error>> {
        let mut params = match &self.config {
            Some(path) => CameraInitParams::load_json(path)?,
            None => CameraInitParams::default(),
        };
        if let Some(focal) = self.default_focal_length_pix {
            params.default_focal_length_pix = Some(focal);
        }
        if let Some(fov) = self.default_field_of_view {
            params.default_field_of_view_deg = Some(fov);
        }
        if let Some(k) = &self.default_intrinsic {
            params.default_k_matrix = Some(k.clone());
        }
        if let Some(model) = self.default_camera_model {
            params.default_camera_model = Some(model);
        }
        if let Some(policy) = self.group_camera_model {
            params.grouping = policy;
        }
        if let Some(seed) = self.id_seed {
            params.id_seed = Some(seed);
        }
        params.allow_incomplete_output |= self.allow_incomplete_output;
        params.allow_single_view |= self.allow_single_view;
        Ok(params)
    }
}

#[cfg(feature = "image")]
fn project_from_folder(folder: &Path) -> Result<Project, Box<dyn Error>> {
    Ok(camera_init::views_from_folder(folder)?)
}

#[cfg(not(feature = "image"))]
fn project_from_folder(folder: &Path) -> Result<Project, Box<dyn Error>> {
    Err(format!(
        "cannot list '{}': built without the `image` feature",
        folder.display()
    )
    .into())
}

fn init_logging(verbose_level: &str) -> Result<(), Box<dyn Error>> {
    let level = parse_verbose_level(verbose_level)
        .ok_or_else(|| format!("unknown verbose level '{verbose_level}'"))?;

    #[cfg(not(feature = "tracing"))]
    init_with_level(level)?;

    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        init_tracing(level, false);
    }
    Ok(())
}

fn run(args: &Args) -> Result<String, Box<dyn Error>> {
    let params = args.params()?;

    let project = match (&args.input, &args.image_folder) {
        (Some(input), _) => Project::load_json(input)?,
        (None, Some(folder)) => project_from_folder(folder)?,
        (None, None) => return Err("either --input or --image-folder is required".into()),
    };

    let db = match &args.sensor_database {
        Some(path) => SensorDb::load(path)?,
        None => {
            log::warn!("no sensor database given, sensor widths come from 35mm metadata only");
            SensorDb::default()
        }
    };

    let (project, report) = initialize_cameras(project, &params, &db)?;
    project.write_json(&args.output)?;
    log::info!("project written to {}", args.output.display());
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args.verbose_level)?;
    let report = run(&args)?;
    println!("{report}");
    Ok(())
}

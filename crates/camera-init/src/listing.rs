//! Image folder listing and view probing.
//!
//! Requires the `image` feature.

use std::fs;
use std::path::{Path, PathBuf};

use camera_init_core::{tags, Project, View, ViewId};
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use rayon::prelude::*;
use walkdir::WalkDir;

/// Extensions picked up by [`list_images`], lowercase.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "tif", "tiff", "exr"];

#[derive(thiserror::Error, Debug)]
pub enum ListingError {
    #[error("'{}' is not a folder", .0.display())]
    NotAFolder(PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("cannot read image '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_image_file(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// All supported images below `folder`, recursively, sorted by path.
pub fn list_images(folder: impl AsRef<Path>) -> Result<Vec<PathBuf>, ListingError> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(ListingError::NotAFolder(folder.to_path_buf()));
    }
    let mut images = Vec::new();
    for entry in WalkDir::new(folder).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }
    images.sort();
    Ok(images)
}

fn exif_text(tag: &ExifTag) -> Option<String> {
    let text = match tag {
        ExifTag::Make(s)
        | ExifTag::Model(s)
        | ExifTag::SerialNumber(s)
        | ExifTag::LensSerialNumber(s) => s,
        _ => return None,
    };
    let text = text.trim_matches(char::from(0)).trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn exif_number(tag: &ExifTag) -> Option<f64> {
    match tag {
        ExifTag::FocalLength(values) => values
            .first()
            .filter(|r| r.denominator != 0)
            .map(|r| f64::from(r.nominator) / f64::from(r.denominator)),
        ExifTag::FocalLengthIn35mmFormat(values) => values.first().map(|v| f64::from(*v)),
        _ => None,
    }
}

/// Camera metadata of an image as `(key, value)` pairs, keyed like [`tags`].
///
/// Unsupported formats and unreadable EXIF blocks yield no metadata.
pub fn read_camera_metadata(path: &Path) -> Vec<(&'static str, String)> {
    let file_type = match lowercase_extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => FileExtension::JPEG,
        Some("tif") | Some("tiff") => FileExtension::TIFF,
        _ => return Vec::new(),
    };
    let buffer = match fs::read(path) {
        Ok(buffer) => buffer,
        Err(err) => {
            log::debug!("cannot read '{}' for EXIF: {err}", path.display());
            return Vec::new();
        }
    };
    let metadata = match Metadata::new_from_vec(&buffer, file_type) {
        Ok(metadata) => metadata,
        Err(err) => {
            log::debug!("no EXIF metadata in '{}': {err}", path.display());
            return Vec::new();
        }
    };

    let wanted = [
        (tags::MAKE, ExifTag::Make(String::new())),
        (tags::MODEL, ExifTag::Model(String::new())),
        (tags::BODY_SERIAL_NUMBER, ExifTag::SerialNumber(String::new())),
        (tags::LENS_SERIAL_NUMBER, ExifTag::LensSerialNumber(String::new())),
        (tags::FOCAL_LENGTH, ExifTag::FocalLength(Vec::new())),
        (tags::FOCAL_LENGTH_IN_35MM, ExifTag::FocalLengthIn35mmFormat(Vec::new())),
    ];
    wanted
        .iter()
        .filter_map(|(key, probe)| {
            metadata
                .get_tag(probe)
                .into_iter()
                .find_map(|tag| exif_text(tag).or_else(|| exif_number(tag).map(|v| v.to_string())))
                .map(|value| (*key, value))
        })
        .collect()
}

/// Build a view from an image file: size from the image header, camera
/// metadata from EXIF.
pub fn probe_view(view_id: ViewId, path: impl AsRef<Path>) -> Result<View, ListingError> {
    let path = path.as_ref();
    let (width, height) = image::image_dimensions(path).map_err(|source| ListingError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let mut view = View::new(view_id, path, width, height);
    for (key, value) in read_camera_metadata(path) {
        view.metadata.insert(key.to_string(), value);
    }
    Ok(view)
}

/// Project with one view per image below `folder`; view ids follow the
/// sorted path order.
pub fn views_from_folder(folder: impl AsRef<Path>) -> Result<Project, ListingError> {
    let images = list_images(folder)?;
    let views = images
        .par_iter()
        .enumerate()
        .map(|(index, path)| probe_view(index as ViewId, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Project::from_views(views))
}

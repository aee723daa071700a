//! Text-file sensor database.
//!
//! One camera per line: `brand;model;sensor_width_mm`, optionally followed
//! by more `;`-separated fields which are ignored. Blank lines and lines
//! starting with `#` are skipped.

use std::fs;
use std::path::Path;

use camera_init_core::{Datasheet, SensorDatabase};

#[derive(thiserror::Error, Debug)]
pub enum SensorDbError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("sensor database line {line}: expected 'brand;model;sensor_width_mm', got '{content}'")]
    Parse { line: usize, content: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorDb {
    entries: Vec<Datasheet>,
}

impl SensorDb {
    pub fn new(entries: Vec<Datasheet>) -> Self {
        Self { entries }
    }

    /// Read and parse a database file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SensorDbError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let db = Self::parse(&raw)?;
        log::debug!("{} camera sensors loaded from {}", db.len(), path.display());
        Ok(db)
    }

    pub fn parse(raw: &str) -> Result<Self, SensorDbError> {
        let mut entries = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let invalid = || SensorDbError::Parse {
                line: index + 1,
                content: line.to_string(),
            };
            let mut fields = trimmed.split(';').map(str::trim);
            let (Some(brand), Some(model), Some(width)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(invalid());
            };
            let width = width
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or_else(invalid)?;
            if brand.is_empty() || model.is_empty() {
                return Err(invalid());
            }
            entries.push(Datasheet::new(brand, model, width));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Datasheet] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SensorDatabase for SensorDb {
    fn lookup(&self, make: &str, model: &str) -> Option<Datasheet> {
        self.entries.as_slice().lookup(make, model)
    }
}

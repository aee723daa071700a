//! Sensor datasheets and the lookup capability.

use serde::{Deserialize, Serialize};

/// Physical sensor description for one camera body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Datasheet {
    pub brand: String,
    pub model: String,
    pub sensor_width_mm: f64,
}

impl Datasheet {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, sensor_width_mm: f64) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            sensor_width_mm,
        }
    }

    /// Loose camera name matching.
    ///
    /// The queried make must equal (ignoring case) one whitespace-separated
    /// word of the datasheet brand, and every word of the datasheet model must
    /// appear among the words of the queried model. `"Canon EOS 5D Mark II"`
    /// therefore matches an `"EOS 5D Mark II"` entry but not an `"EOS 5DS"`
    /// one.
    pub fn matches(&self, make: &str, model: &str) -> bool {
        let make = make.trim().to_lowercase();
        if make.is_empty() {
            return false;
        }
        let brand_hit = self
            .brand
            .split_whitespace()
            .any(|word| word.to_lowercase() == make);
        if !brand_hit {
            return false;
        }

        let queried: Vec<String> = model.split_whitespace().map(str::to_lowercase).collect();
        let mut wanted = self.model.split_whitespace().peekable();
        if wanted.peek().is_none() {
            return false;
        }
        wanted.all(|word| {
            let word = word.to_lowercase();
            queried.iter().any(|q| *q == word)
        })
    }
}

/// Read-only sensor width lookup.
///
/// Implementations are shared by every worker of a run, hence `Sync`.
pub trait SensorDatabase: Sync {
    fn lookup(&self, make: &str, model: &str) -> Option<Datasheet>;
}

/// First matching datasheet wins.
impl SensorDatabase for [Datasheet] {
    fn lookup(&self, make: &str, model: &str) -> Option<Datasheet> {
        self.iter().find(|ds| ds.matches(make, model)).cloned()
    }
}

impl SensorDatabase for Vec<Datasheet> {
    fn lookup(&self, make: &str, model: &str) -> Option<Datasheet> {
        self.as_slice().lookup(make, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Vec<Datasheet> {
        vec![
            Datasheet::new("Canon", "Canon EOS 5D Mark II", 36.0),
            Datasheet::new("Canon", "Canon EOS 5D", 35.8),
            Datasheet::new("NIKON CORPORATION", "NIKON D800", 35.9),
        ]
    }

    #[test]
    fn make_matches_any_brand_word_case_insensitively() {
        let hit = db().lookup("nikon", "NIKON D800").expect("nikon entry");
        assert_eq!(hit.sensor_width_mm, 35.9);
    }

    #[test]
    fn all_datasheet_model_words_must_be_present() {
        let hit = db().lookup("Canon", "Canon EOS 5D Mark II").expect("mark ii");
        assert_eq!(hit.model, "Canon EOS 5D Mark II");

        // "EOS 5D" words are all contained in the query, so the second entry
        // matches a query that the first one does not.
        let hit = db().lookup("Canon", "Canon EOS 5D").expect("5d");
        assert_eq!(hit.sensor_width_mm, 35.8);
    }

    #[test]
    fn unknown_camera_misses() {
        assert!(db().lookup("Sony", "ILCE-7").is_none());
        assert!(db().lookup("", "Canon EOS 5D").is_none());
    }
}

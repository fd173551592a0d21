//! Plant classification — the record handed to the garden engine by the
//! external vision service, plus the fixed fallback used when that service
//! cannot produce one.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SproutError};

/// Best-effort identification of a plant photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantClassification {
    pub plant_name: String,
    pub scientific_name: String,
    pub species: String,
    /// How many `water_repeat_unit`s between waterings. Always at least 1.
    pub water_repeat_every: u32,
    /// Free text from the classifier, e.g. `"days"`; validated by the engine.
    pub water_repeat_unit: String,
    /// 0..=100.
    pub plant_health: u8,
}

impl PlantClassification {
    /// The record substituted whenever classification fails.
    pub fn fallback() -> Self {
        Self {
            plant_name: "Unknown Plant".to_string(),
            scientific_name: "Unknown Species".to_string(),
            species: "Unknown".to_string(),
            water_repeat_every: 1,
            water_repeat_unit: "day".to_string(),
            plant_health: 100,
        }
    }

    /// Parse the text a vision model replied with.
    ///
    /// Models sometimes wrap the JSON in a markdown fence and sometimes quote
    /// numbers, so both are tolerated. Health is clamped into 0..=100 and a
    /// zero interval becomes 1.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let body = strip_fence(reply);
        let raw: RawClassification = serde_json::from_str(body)?;

        let every = lenient_int(&raw.water_repeat_every, "water_repeat_every")?;
        let health = lenient_int(&raw.plant_health, "plant_health")?;

        Ok(Self {
            plant_name: raw.plant_name,
            scientific_name: raw.scientific_name,
            species: raw.species,
            water_repeat_every: every.clamp(1, i64::from(u32::MAX)) as u32,
            water_repeat_unit: raw.water_repeat_unit.trim().to_string(),
            plant_health: health.clamp(0, 100) as u8,
        })
    }
}

#[derive(Deserialize)]
struct RawClassification {
    plant_name: String,
    scientific_name: String,
    species: String,
    water_repeat_every: Value,
    water_repeat_unit: String,
    plant_health: Value,
}

fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn lenient_int(value: &Value, field: &str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SproutError::Classification(format!("{field} is not a number: {value}")))
}

/// Seam to the external vision service.
pub trait Classifier: Send + Sync {
    fn classify(&self, image_url: &str) -> Result<PlantClassification>;
}

/// Classifies from a reply that was already obtained from the vision service.
pub struct ReplyClassifier {
    reply: String,
}

impl ReplyClassifier {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// Load a reply saved to disk. An unreadable file is an I/O error; its
    /// contents are only parsed when [`classify`](Classifier::classify) runs.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let reply = std::fs::read_to_string(path)?;
        Ok(Self::new(reply))
    }
}

impl Classifier for ReplyClassifier {
    fn classify(&self, _image_url: &str) -> Result<PlantClassification> {
        PlantClassification::from_reply(&self.reply)
    }
}

/// Used when no vision service is configured.
pub struct FallbackClassifier;

impl Classifier for FallbackClassifier {
    fn classify(&self, _image_url: &str) -> Result<PlantClassification> {
        Ok(PlantClassification::fallback())
    }
}

/// Run `classifier`, substituting [`PlantClassification::fallback`] on failure.
pub fn classify_or_fallback(classifier: &dyn Classifier, image_url: &str) -> PlantClassification {
    match classifier.classify(image_url) {
        Ok(c) => c,
        Err(e) => {
            warn!(image_url, error = %e, "classification failed, using fallback");
            PlantClassification::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONSTERA: &str = r#"{
        "plant_name": "Swiss Cheese Plant",
        "scientific_name": "Monstera deliciosa",
        "species": "deliciosa",
        "water_repeat_every": 7,
        "water_repeat_unit": "days",
        "plant_health": 83
    }"#;

    #[test]
    fn parses_plain_json_reply() {
        let c = PlantClassification::from_reply(MONSTERA).unwrap();
        assert_eq!(c.plant_name, "Swiss Cheese Plant");
        assert_eq!(c.water_repeat_every, 7);
        assert_eq!(c.water_repeat_unit, "days");
        assert_eq!(c.plant_health, 83);
    }

    #[test]
    fn strips_markdown_fence() {
        let fenced = format!("```json\n{MONSTERA}\n```");
        let c = PlantClassification::from_reply(&fenced).unwrap();
        assert_eq!(c.scientific_name, "Monstera deliciosa");
    }

    #[test]
    fn accepts_quoted_numbers_and_clamps() {
        let reply = r#"{"plant_name":"Fern","scientific_name":"Nephrolepis exaltata",
            "species":"exaltata","water_repeat_every":"0","water_repeat_unit":" week ",
            "plant_health":"140"}"#;
        let c = PlantClassification::from_reply(reply).unwrap();
        assert_eq!(c.water_repeat_every, 1);
        assert_eq!(c.water_repeat_unit, "week");
        assert_eq!(c.plant_health, 100);
    }

    #[test]
    fn non_numeric_interval_is_rejected() {
        let reply = r#"{"plant_name":"Fern","scientific_name":"x","species":"y",
            "water_repeat_every":"some number","water_repeat_unit":"days","plant_health":50}"#;
        let err = PlantClassification::from_reply(reply).unwrap_err();
        assert_eq!(err.code(), "CLASSIFICATION_ERROR");
    }

    #[test]
    fn garbage_reply_falls_back() {
        let classifier = ReplyClassifier::new("I think this is a cactus!");
        let c = classify_or_fallback(&classifier, "https://example.com/cactus.png");
        assert_eq!(c, PlantClassification::fallback());
    }

    #[test]
    fn reply_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reply.json");
        std::fs::write(&path, MONSTERA).unwrap();
        let c = ReplyClassifier::from_file(&path).unwrap().classify("x").unwrap();
        assert_eq!(c.species, "deliciosa");
    }

    #[test]
    fn missing_reply_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = match ReplyClassifier::from_file(dir.path().join("absent.json")) {
            Ok(_) => panic!("absent file should not load"),
            Err(e) => e,
        };
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn fallback_classifier_returns_fixed_record() {
        let c = classify_or_fallback(&FallbackClassifier, "https://example.com/x.png");
        assert_eq!(c.plant_name, "Unknown Plant");
        assert_eq!(c.water_repeat_every, 1);
        assert_eq!(c.water_repeat_unit, "day");
        assert_eq!(c.plant_health, 100);
    }
}

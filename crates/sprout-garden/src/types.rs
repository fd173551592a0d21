use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprout_core::PlantClassification;

use crate::error::{GardenError, Result};

/// A persisted plant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub plant_id: i64,
    /// Opaque key issued by the identity provider.
    pub user_id: String,
    pub plant_name: String,
    pub scientific_name: String,
    pub species: String,
    pub image_url: String,
    /// User-assigned display label, mirrored on the plant's schedule.
    pub plant_pet_name: String,
    /// 0..=100, assigned by the classifier.
    pub plant_health: u8,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
}

/// Fields supplied when a plant is added; ids and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlant {
    pub plant_name: String,
    pub scientific_name: String,
    pub species: String,
    pub image_url: String,
    pub plant_pet_name: String,
    pub plant_health: u8,
}

impl NewPlant {
    /// Combine a classification with what the user supplied.
    pub fn from_classification(
        c: &PlantClassification,
        image_url: impl Into<String>,
        pet_name: impl Into<String>,
    ) -> Self {
        Self {
            plant_name: c.plant_name.clone(),
            scientific_name: c.scientific_name.clone(),
            species: c.species.clone(),
            image_url: image_url.into(),
            plant_pet_name: pet_name.into(),
            plant_health: c.plant_health,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.plant_health > 100 {
            return Err(GardenError::InvalidHealth(self.plant_health));
        }
        Ok(())
    }
}

/// Completion state of a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    /// Waiting to be watered.
    Pending,
    /// Watered; reopened by the next rollover once due again.
    Done,
}

impl ScheduleState {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            ScheduleState::Done
        } else {
            ScheduleState::Pending
        }
    }
}

impl std::fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScheduleState::Pending => "pending",
            ScheduleState::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// A persisted watering schedule, one per plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: i64,
    pub plant_id: i64,
    /// Always equal to the owning plant's `user_id`.
    pub user_id: String,
    /// Copy of the owning plant's pet name.
    pub plant_pet_name: String,
    pub water_is_completed: bool,
    pub water_repeat_every: u32,
    /// Canonical unit name (`day`, `week`, `month`).
    pub water_repeat_unit: String,
    /// Last time the plant was watered.
    pub watering_date: NaiveDate,
    /// Never earlier than `watering_date`.
    pub next_watering_date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

impl Schedule {
    pub fn state(&self) -> ScheduleState {
        ScheduleState::from_completed(self.water_is_completed)
    }
}

/// Ids produced by adopting a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adopted {
    pub plant_id: i64,
    pub schedule_id: i64,
}

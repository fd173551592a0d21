use thiserror::Error;

/// Errors raised by the garden engine. Each variant maps to a stable
/// outcome code via [`GardenError::code`].
#[derive(Debug, Error)]
pub enum GardenError {
    /// The user already tracks the maximum number of plants.
    #[error("Plant quota exceeded for user {user_id}: max {limit}")]
    QuotaExceeded { user_id: String, limit: u32 },

    /// No plant with this id belongs to the user.
    #[error("Plant not found: {plant_id}")]
    PlantNotFound { plant_id: i64 },

    /// No schedule with this id belongs to the user.
    #[error("Schedule not found: {schedule_id}")]
    ScheduleNotFound { schedule_id: i64 },

    /// The plant already has its schedule.
    #[error("Schedule already exists for plant {plant_id}")]
    ScheduleExists { plant_id: i64 },

    #[error("Invalid interval unit: {0}")]
    InvalidIntervalUnit(String),

    #[error("Invalid interval quantity: {0}")]
    InvalidIntervalQuantity(String),

    #[error("Invalid plant health {0}: must be 0-100")]
    InvalidHealth(u8),

    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled connection could be checked out.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl GardenError {
    pub fn code(&self) -> &'static str {
        match self {
            GardenError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            GardenError::PlantNotFound { .. } | GardenError::ScheduleNotFound { .. } => {
                "NOT_FOUND"
            }
            GardenError::ScheduleExists { .. } => "ALREADY_EXISTS",
            GardenError::InvalidIntervalUnit(_) => "INVALID_INTERVAL_UNIT",
            GardenError::InvalidIntervalQuantity(_) => "INVALID_INTERVAL_QUANTITY",
            GardenError::InvalidHealth(_) => "INVALID_HEALTH",
            GardenError::Database(_) | GardenError::Pool(_) => "STORAGE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, GardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_share_a_code() {
        assert_eq!(GardenError::PlantNotFound { plant_id: 1 }.code(), "NOT_FOUND");
        assert_eq!(
            GardenError::ScheduleNotFound { schedule_id: 1 }.code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn sqlite_errors_are_storage_errors() {
        let err: GardenError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }

    #[test]
    fn quota_message_names_the_limit() {
        let err = GardenError::QuotaExceeded {
            user_id: "u1".to_string(),
            limit: 5,
        };
        assert_eq!(err.to_string(), "Plant quota exceeded for user u1: max 5");
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }
}

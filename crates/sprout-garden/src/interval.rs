use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GardenError, Result};

/// Calendar unit of a watering interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for IntervalUnit {
    type Err = GardenError;

    /// Singular and plural forms, ASCII case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(IntervalUnit::Day),
            "week" | "weeks" => Ok(IntervalUnit::Week),
            "month" | "months" => Ok(IntervalUnit::Month),
            _ => Err(GardenError::InvalidIntervalUnit(s.to_string())),
        }
    }
}

impl IntervalUnit {
    /// Advance `base` by `quantity` of this unit.
    ///
    /// Months clamp to the last day of the target month, so Jan 31 + 1 month
    /// lands on Feb 28 or 29.
    pub fn advance(self, base: NaiveDate, quantity: u32) -> Result<NaiveDate> {
        let next = match self {
            IntervalUnit::Day => base.checked_add_days(Days::new(u64::from(quantity))),
            IntervalUnit::Week => base.checked_add_days(Days::new(7 * u64::from(quantity))),
            IntervalUnit::Month => base.checked_add_months(Months::new(quantity)),
        };
        next.ok_or_else(|| {
            GardenError::InvalidIntervalQuantity(format!(
                "{base} + {quantity} {self} is out of range"
            ))
        })
    }
}

/// A validated repeat interval: `every` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    every: u32,
    unit: IntervalUnit,
}

impl Interval {
    pub fn new(every: u32, unit: IntervalUnit) -> Result<Self> {
        if every == 0 {
            return Err(GardenError::InvalidIntervalQuantity(
                "repeat quantity must be greater than zero".to_string(),
            ));
        }
        Ok(Self { every, unit })
    }

    /// Validate a quantity/unit pair as received from a caller.
    pub fn parse(every: u32, unit: &str) -> Result<Self> {
        Self::new(every, unit.parse()?)
    }

    /// Interval suggested by a classification, or one day when the
    /// classifier produced a unit the engine does not know.
    pub fn from_classification(c: &sprout_core::PlantClassification) -> Self {
        match Self::parse(c.water_repeat_every, &c.water_repeat_unit) {
            Ok(interval) => interval,
            Err(e) => {
                warn!(
                    every = c.water_repeat_every,
                    unit = %c.water_repeat_unit,
                    error = %e,
                    "unusable classifier interval, watering daily"
                );
                Self::daily()
            }
        }
    }

    pub fn daily() -> Self {
        Self {
            every: 1,
            unit: IntervalUnit::Day,
        }
    }

    pub fn every(&self) -> u32 {
        self.every
    }

    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    pub fn next_due(&self, base: NaiveDate) -> Result<NaiveDate> {
        self.unit.advance(base, self.every)
    }
}

/// Compute the date `quantity` `unit`s after `base_date`.
///
/// Fails with `InvalidIntervalUnit` for a unit outside day(s)/week(s)/month(s).
pub fn compute_next_due(base_date: NaiveDate, quantity: u32, unit: &str) -> Result<NaiveDate> {
    let unit: IntervalUnit = unit.parse()?;
    unit.advance(base_date, quantity)
}

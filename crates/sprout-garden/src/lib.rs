//! `sprout-garden` — per-user plant tracking with recurring watering
//! schedules, persisted in SQLite.
//!
//! # Overview
//!
//! Each plant owns exactly one schedule. [`manager::GardenManager`] is the
//! only entry point callers need: it checks a pooled connection out per
//! operation and runs every write in a single IMMEDIATE transaction.
//!
//! | Operation            | Atomic unit                                        |
//! |----------------------|----------------------------------------------------|
//! | `add_plant`          | quota count + insert as one conditional statement  |
//! | `adopt_plant`        | quota-checked insert + schedule insert             |
//! | `rename_plant`       | plant pet name + schedule's copy                   |
//! | `delete_plant`       | schedule delete + plant delete, rolled back if the plant is missing |
//! | `complete_schedule`  | read flag, flip it, advance dates on completion    |

pub mod db;
pub mod error;
pub mod interval;
pub mod manager;
pub mod plants;
pub mod schedules;
pub mod types;

pub use error::{GardenError, Result};
pub use interval::{compute_next_due, Interval, IntervalUnit};
pub use manager::GardenManager;
pub use types::{Adopted, NewPlant, Plant, Schedule, ScheduleState};

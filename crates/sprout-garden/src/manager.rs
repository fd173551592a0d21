use chrono::NaiveDate;
use rusqlite::{Transaction, TransactionBehavior};
use sprout_core::SproutConfig;
use tracing::{debug, info, instrument, warn};

use crate::db::{open_pool, DbPool};
use crate::error::{GardenError, Result};
use crate::interval::Interval;
use crate::types::{Adopted, NewPlant, Plant, Schedule, ScheduleState};
use crate::{plants, schedules};

/// Entry point for every garden operation.
///
/// Holds a pool rather than a single connection: each call checks out its
/// own connection, so no in-process lock is held while SQLite does I/O and
/// concurrent callers are serialised by SQLite's write lock alone. Every
/// write runs in one IMMEDIATE transaction that is committed at the end or
/// rolled back when dropped.
pub struct GardenManager {
    pool: DbPool,
    quota: u32,
}

impl GardenManager {
    /// Wrap an already-initialised pool (see [`open_pool`]).
    pub fn new(pool: DbPool, quota: u32) -> Self {
        Self { pool, quota }
    }

    /// Open the database named in `config` and build a manager on it.
    pub fn open(config: &SproutConfig) -> Result<Self> {
        let pool = open_pool(&config.database)?;
        Ok(Self::new(pool, config.garden.plant_quota))
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Run `f` inside an IMMEDIATE transaction, committing only if it succeeds.
    fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ── plants ────────────────────────────────────────────────────────────────

    /// Advisory check for callers that want to stop before collecting plant
    /// details. [`add_plant`](Self::add_plant) enforces the quota on its own.
    #[instrument(skip(self))]
    pub fn can_add_plant(&self, user_id: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let count = plants::count_plants(&conn, user_id)?;
        debug!(count, quota = self.quota, "advisory quota check");
        Ok(count < self.quota)
    }

    /// Insert a plant if the user is still under quota. Returns the new id.
    #[instrument(skip(self, plant), fields(pet_name = %plant.plant_pet_name))]
    pub fn add_plant(&self, user_id: &str, plant: &NewPlant) -> Result<i64> {
        let quota = self.quota;
        let result = self.write(|tx| plants::insert_plant_within_quota(tx, user_id, plant, quota));
        match &result {
            Ok(plant_id) => info!(plant_id, "plant added"),
            Err(GardenError::QuotaExceeded { .. }) => warn!(quota, "plant quota reached"),
            Err(_) => {}
        }
        result
    }

    /// Insert a plant and its schedule as one unit, so the plant is never
    /// visible without its schedule.
    pub fn adopt_plant(
        &self,
        user_id: &str,
        plant: &NewPlant,
        interval: Interval,
    ) -> Result<Adopted> {
        self.adopt_plant_on(user_id, plant, interval, today())
    }

    #[instrument(skip(self, plant), fields(pet_name = %plant.plant_pet_name))]
    pub fn adopt_plant_on(
        &self,
        user_id: &str,
        plant: &NewPlant,
        interval: Interval,
        today: NaiveDate,
    ) -> Result<Adopted> {
        let quota = self.quota;
        let result = self.write(|tx| {
            let plant_id = plants::insert_plant_within_quota(tx, user_id, plant, quota)?;
            let schedule_id = schedules::insert_schedule(tx, user_id, plant_id, interval, today)?;
            Ok(Adopted {
                plant_id,
                schedule_id,
            })
        });
        match &result {
            Ok(a) => info!(plant_id = a.plant_id, schedule_id = a.schedule_id, "plant adopted"),
            Err(GardenError::QuotaExceeded { .. }) => warn!(quota, "plant quota reached"),
            Err(_) => {}
        }
        result
    }

    #[instrument(skip(self))]
    pub fn fetch_plants(&self, user_id: &str) -> Result<Vec<Plant>> {
        let conn = self.pool.get()?;
        plants::list_plants(&conn, user_id)
    }

    #[instrument(skip(self))]
    pub fn get_plant(&self, user_id: &str, plant_id: i64) -> Result<Plant> {
        let conn = self.pool.get()?;
        plants::get_plant(&conn, user_id, plant_id)?.ok_or(GardenError::PlantNotFound { plant_id })
    }

    /// Rename a plant and its schedule's copy of the name in one transaction.
    /// Returns the name read back from the schedule, or from the plant when
    /// it has no schedule yet.
    #[instrument(skip(self))]
    pub fn rename_plant(&self, user_id: &str, plant_id: i64, new_name: &str) -> Result<String> {
        let stored = self.write(|tx| {
            if plants::set_pet_name(tx, user_id, plant_id, new_name)? == 0 {
                return Err(GardenError::PlantNotFound { plant_id });
            }
            schedules::set_pet_name(tx, user_id, plant_id, new_name)?;
            match schedules::schedule_for_plant(tx, user_id, plant_id)? {
                Some(schedule) => Ok(schedule.plant_pet_name),
                None => plants::get_plant(tx, user_id, plant_id)?
                    .map(|plant| plant.plant_pet_name)
                    .ok_or(GardenError::PlantNotFound { plant_id }),
            }
        })?;
        info!("plant renamed");
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub fn update_plant_photo(&self, user_id: &str, plant_id: i64, image_url: &str) -> Result<()> {
        self.write(|tx| {
            if plants::set_image_url(tx, user_id, plant_id, image_url)? == 0 {
                return Err(GardenError::PlantNotFound { plant_id });
            }
            Ok(())
        })?;
        info!("plant photo updated");
        Ok(())
    }

    /// Delete a plant together with its schedule. If the plant is not the
    /// user's, nothing is deleted.
    #[instrument(skip(self))]
    pub fn delete_plant(&self, user_id: &str, plant_id: i64) -> Result<()> {
        let removed_schedules = self.write(|tx| {
            let n = schedules::delete_for_plant(tx, user_id, plant_id)?;
            if plants::delete_plant_row(tx, user_id, plant_id)? == 0 {
                return Err(GardenError::PlantNotFound { plant_id });
            }
            Ok(n)
        })?;
        info!(removed_schedules, "plant deleted");
        Ok(())
    }

    // ── schedules ─────────────────────────────────────────────────────────────

    /// Attach a schedule to a plant that has none yet.
    pub fn create_schedule(&self, user_id: &str, plant_id: i64, interval: Interval) -> Result<i64> {
        self.create_schedule_on(user_id, plant_id, interval, today())
    }

    #[instrument(skip(self))]
    pub fn create_schedule_on(
        &self,
        user_id: &str,
        plant_id: i64,
        interval: Interval,
        today: NaiveDate,
    ) -> Result<i64> {
        let schedule_id =
            self.write(|tx| schedules::insert_schedule(tx, user_id, plant_id, interval, today))?;
        info!(schedule_id, "schedule created");
        Ok(schedule_id)
    }

    /// Schedules that need attention today: watered today or due/overdue.
    pub fn fetch_schedule(&self, user_id: &str) -> Result<Vec<Schedule>> {
        self.fetch_schedule_on(user_id, today())
    }

    #[instrument(skip(self))]
    pub fn fetch_schedule_on(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Schedule>> {
        let conn = self.pool.get()?;
        schedules::list_due(&conn, user_id, today)
    }

    /// Every schedule of the user regardless of due date.
    #[instrument(skip(self))]
    pub fn all_schedules(&self, user_id: &str) -> Result<Vec<Schedule>> {
        let conn = self.pool.get()?;
        schedules::list_schedules(&conn, user_id)
    }

    /// Toggle a schedule's completion flag; see
    /// [`schedules::toggle_completion`] for the date rules.
    pub fn complete_schedule(&self, user_id: &str, schedule_id: i64) -> Result<ScheduleState> {
        self.complete_schedule_on(user_id, schedule_id, today())
    }

    #[instrument(skip(self))]
    pub fn complete_schedule_on(
        &self,
        user_id: &str,
        schedule_id: i64,
        today: NaiveDate,
    ) -> Result<ScheduleState> {
        let state = self
            .write(|tx| schedules::toggle_completion(tx, user_id, schedule_id, today))?
            .ok_or(GardenError::ScheduleNotFound { schedule_id })?;
        info!(%state, "schedule toggled");
        Ok(state)
    }

    /// Reopen completed tasks that have come due again, for all users.
    pub fn roll_over(&self) -> Result<usize> {
        self.roll_over_on(today())
    }

    #[instrument(skip(self))]
    pub fn roll_over_on(&self, today: NaiveDate) -> Result<usize> {
        let reopened = self.write(|tx| schedules::roll_over(tx, today))?;
        if reopened > 0 {
            info!(reopened, "completed schedules rolled over");
        }
        Ok(reopened)
    }
}

/// "Today" follows the operator's local calendar, not UTC.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

//! Schedule record store and the completion state machine.

use chrono::NaiveDate;
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use crate::error::{GardenError, Result};
use crate::interval::{Interval, IntervalUnit};
use crate::types::{Schedule, ScheduleState};

const SCHEDULE_SELECT_SQL: &str = "SELECT schedule_id, plant_id, user_id, plant_pet_name,
            water_is_completed, water_repeat_every, water_repeat_unit,
            watering_date, next_watering_date, created_at, updated_at
     FROM schedules";

pub(crate) fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        schedule_id: row.get(0)?,
        plant_id: row.get(1)?,
        user_id: row.get(2)?,
        plant_pet_name: row.get(3)?,
        water_is_completed: row.get(4)?,
        water_repeat_every: row.get(5)?,
        water_repeat_unit: row.get(6)?,
        watering_date: row.get(7)?,
        next_watering_date: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Create the schedule for an existing plant owned by `user_id`.
///
/// The pet name is copied from the plant row by the same statement, and the
/// task starts out due on `today`. Returns `PlantNotFound` when the plant
/// does not exist for this user and `ScheduleExists` on a second schedule.
pub fn insert_schedule(
    conn: &Connection,
    user_id: &str,
    plant_id: i64,
    interval: Interval,
    today: NaiveDate,
) -> Result<i64> {
    let now = chrono::Utc::now().to_rfc3339();
    let inserted = conn
        .execute(
            "INSERT INTO schedules
             (plant_id, user_id, plant_pet_name, water_is_completed,
              water_repeat_every, water_repeat_unit, watering_date,
              next_watering_date, created_at, updated_at)
             SELECT plant_id, user_id, plant_pet_name, 0, ?3, ?4, ?5, ?5, ?6, ?6
             FROM plants WHERE user_id = ?1 AND plant_id = ?2",
            rusqlite::params![
                user_id,
                plant_id,
                interval.every(),
                interval.unit().to_string(),
                today,
                now,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref f, _)
                if f.code == ErrorCode::ConstraintViolation
                    && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                GardenError::ScheduleExists { plant_id }
            }
            other => GardenError::Database(other),
        })?;
    if inserted == 0 {
        return Err(GardenError::PlantNotFound { plant_id });
    }
    Ok(conn.last_insert_rowid())
}

pub fn get_schedule(
    conn: &Connection,
    user_id: &str,
    schedule_id: i64,
) -> Result<Option<Schedule>> {
    let schedule = conn
        .query_row(
            &format!("{SCHEDULE_SELECT_SQL} WHERE user_id = ?1 AND schedule_id = ?2"),
            rusqlite::params![user_id, schedule_id],
            row_to_schedule,
        )
        .optional()?;
    Ok(schedule)
}

pub fn schedule_for_plant(
    conn: &Connection,
    user_id: &str,
    plant_id: i64,
) -> Result<Option<Schedule>> {
    let schedule = conn
        .query_row(
            &format!("{SCHEDULE_SELECT_SQL} WHERE user_id = ?1 AND plant_id = ?2"),
            rusqlite::params![user_id, plant_id],
            row_to_schedule,
        )
        .optional()?;
    Ok(schedule)
}

/// Every schedule of `user_id`, in creation order.
pub fn list_schedules(conn: &Connection, user_id: &str) -> Result<Vec<Schedule>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SCHEDULE_SELECT_SQL} WHERE user_id = ?1 ORDER BY schedule_id"
    ))?;
    let rows = stmt
        .query_map([user_id], row_to_schedule)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Schedules watered on `today` or whose next watering is due on or before it.
pub fn list_due(conn: &Connection, user_id: &str, today: NaiveDate) -> Result<Vec<Schedule>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SCHEDULE_SELECT_SQL}
         WHERE user_id = ?1 AND (watering_date = ?2 OR next_watering_date <= ?2)
         ORDER BY next_watering_date, schedule_id"
    ))?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, today], row_to_schedule)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Flip the completion flag of one schedule.
///
/// Pending -> Done waters the plant on `today` and pushes the next watering
/// out by the stored interval. Done -> Pending only clears the flag; the
/// dates keep the advance. Returns `None` when no row matches.
pub fn toggle_completion(
    conn: &Connection,
    user_id: &str,
    schedule_id: i64,
    today: NaiveDate,
) -> Result<Option<ScheduleState>> {
    let Some(schedule) = get_schedule(conn, user_id, schedule_id)? else {
        return Ok(None);
    };
    let now = chrono::Utc::now().to_rfc3339();

    let state = match schedule.state() {
        ScheduleState::Pending => {
            let unit: IntervalUnit = schedule.water_repeat_unit.parse()?;
            let next = unit.advance(today, schedule.water_repeat_every)?;
            conn.execute(
                "UPDATE schedules
                 SET water_is_completed = 1, watering_date = ?1,
                     next_watering_date = ?2, updated_at = ?3
                 WHERE schedule_id = ?4",
                rusqlite::params![today, next, now, schedule_id],
            )?;
            debug!(schedule_id, %next, "schedule advanced");
            ScheduleState::Done
        }
        ScheduleState::Done => {
            conn.execute(
                "UPDATE schedules SET water_is_completed = 0, updated_at = ?1
                 WHERE schedule_id = ?2",
                rusqlite::params![now, schedule_id],
            )?;
            ScheduleState::Pending
        }
    };
    Ok(Some(state))
}

/// Mirror a renamed plant's pet name onto its schedule.
pub fn set_pet_name(conn: &Connection, user_id: &str, plant_id: i64, name: &str) -> Result<usize> {
    let now = chrono::Utc::now().to_rfc3339();
    let n = conn.execute(
        "UPDATE schedules SET plant_pet_name = ?1, updated_at = ?2
         WHERE user_id = ?3 AND plant_id = ?4",
        rusqlite::params![name, now, user_id, plant_id],
    )?;
    Ok(n)
}

pub fn delete_for_plant(conn: &Connection, user_id: &str, plant_id: i64) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM schedules WHERE user_id = ?1 AND plant_id = ?2",
        rusqlite::params![user_id, plant_id],
    )?;
    Ok(n)
}

/// Reopen every completed task whose next watering has arrived.
pub fn roll_over(conn: &Connection, today: NaiveDate) -> Result<usize> {
    let now = chrono::Utc::now().to_rfc3339();
    let n = conn.execute(
        "UPDATE schedules SET water_is_completed = 0, updated_at = ?1
         WHERE water_is_completed = 1 AND next_watering_date <= ?2",
        rusqlite::params![now, today],
    )?;
    Ok(n)
}

//! Plant record store. Every function takes a plain `&Connection` so it can
//! run either standalone or inside a caller's transaction.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{GardenError, Result};
use crate::types::{NewPlant, Plant};

const PLANT_SELECT_SQL: &str = "SELECT plant_id, user_id, plant_name, scientific_name, species,
            image_url, plant_pet_name, plant_health, created_at, updated_at
     FROM plants";

pub(crate) fn row_to_plant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Plant> {
    Ok(Plant {
        plant_id: row.get(0)?,
        user_id: row.get(1)?,
        plant_name: row.get(2)?,
        scientific_name: row.get(3)?,
        species: row.get(4)?,
        image_url: row.get(5)?,
        plant_pet_name: row.get(6)?,
        plant_health: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert `plant` for `user_id` only if the user owns fewer than `quota` plants.
///
/// The count and the insert are one statement; run it inside an IMMEDIATE
/// transaction so the write lock is held before the count is taken.
pub fn insert_plant_within_quota(
    conn: &Connection,
    user_id: &str,
    plant: &NewPlant,
    quota: u32,
) -> Result<i64> {
    plant.validate()?;
    let now = chrono::Utc::now().to_rfc3339();
    let inserted = conn.execute(
        "INSERT INTO plants
         (user_id, plant_name, scientific_name, species, image_url,
          plant_pet_name, plant_health, created_at, updated_at)
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8
         WHERE (SELECT COUNT(*) FROM plants WHERE user_id = ?1) < ?9",
        rusqlite::params![
            user_id,
            plant.plant_name,
            plant.scientific_name,
            plant.species,
            plant.image_url,
            plant.plant_pet_name,
            plant.plant_health,
            now,
            quota,
        ],
    )?;
    if inserted == 0 {
        return Err(GardenError::QuotaExceeded {
            user_id: user_id.to_string(),
            limit: quota,
        });
    }
    Ok(conn.last_insert_rowid())
}

pub fn count_plants(conn: &Connection, user_id: &str) -> Result<u32> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM plants WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

pub fn get_plant(conn: &Connection, user_id: &str, plant_id: i64) -> Result<Option<Plant>> {
    let plant = conn
        .query_row(
            &format!("{PLANT_SELECT_SQL} WHERE user_id = ?1 AND plant_id = ?2"),
            rusqlite::params![user_id, plant_id],
            row_to_plant,
        )
        .optional()?;
    Ok(plant)
}

/// All plants owned by `user_id`, oldest first.
pub fn list_plants(conn: &Connection, user_id: &str) -> Result<Vec<Plant>> {
    let mut stmt =
        conn.prepare_cached(&format!("{PLANT_SELECT_SQL} WHERE user_id = ?1 ORDER BY plant_id"))?;
    let plants = stmt
        .query_map([user_id], row_to_plant)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(plants)
}

/// Returns the number of rows changed (0 or 1).
pub fn set_pet_name(conn: &Connection, user_id: &str, plant_id: i64, name: &str) -> Result<usize> {
    let now = chrono::Utc::now().to_rfc3339();
    let n = conn.execute(
        "UPDATE plants SET plant_pet_name = ?1, updated_at = ?2
         WHERE user_id = ?3 AND plant_id = ?4",
        rusqlite::params![name, now, user_id, plant_id],
    )?;
    Ok(n)
}

/// Returns the number of rows changed (0 or 1).
pub fn set_image_url(conn: &Connection, user_id: &str, plant_id: i64, url: &str) -> Result<usize> {
    let now = chrono::Utc::now().to_rfc3339();
    let n = conn.execute(
        "UPDATE plants SET image_url = ?1, updated_at = ?2
         WHERE user_id = ?3 AND plant_id = ?4",
        rusqlite::params![url, now, user_id, plant_id],
    )?;
    Ok(n)
}

/// Returns the number of rows deleted (0 or 1).
pub fn delete_plant_row(conn: &Connection, user_id: &str, plant_id: i64) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM plants WHERE user_id = ?1 AND plant_id = ?2",
        rusqlite::params![user_id, plant_id],
    )?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn fern(pet: &str) -> NewPlant {
        NewPlant {
            plant_name: "Boston Fern".to_string(),
            scientific_name: "Nephrolepis exaltata".to_string(),
            species: "exaltata".to_string(),
            image_url: "https://img.example/fern.png".to_string(),
            plant_pet_name: pet.to_string(),
            plant_health: 90,
        }
    }

    #[test]
    fn insert_stops_at_quota() {
        let conn = conn();
        for i in 0..2 {
            insert_plant_within_quota(&conn, "u1", &fern(&format!("f{i}")), 2).unwrap();
        }
        let err = insert_plant_within_quota(&conn, "u1", &fern("extra"), 2).unwrap_err();
        assert!(matches!(err, GardenError::QuotaExceeded { limit: 2, .. }));
        assert_eq!(count_plants(&conn, "u1").unwrap(), 2);
    }

    #[test]
    fn quota_is_per_user() {
        let conn = conn();
        insert_plant_within_quota(&conn, "u1", &fern("a"), 1).unwrap();
        insert_plant_within_quota(&conn, "u2", &fern("b"), 1).unwrap();
        assert_eq!(count_plants(&conn, "u1").unwrap(), 1);
        assert_eq!(count_plants(&conn, "u2").unwrap(), 1);
    }

    #[test]
    fn other_users_cannot_see_or_touch_a_plant() {
        let conn = conn();
        let id = insert_plant_within_quota(&conn, "u1", &fern("Fernie"), 5).unwrap();
        assert!(get_plant(&conn, "u2", id).unwrap().is_none());
        assert_eq!(set_pet_name(&conn, "u2", id, "Stolen").unwrap(), 0);
        assert_eq!(delete_plant_row(&conn, "u2", id).unwrap(), 0);

        let plant = get_plant(&conn, "u1", id).unwrap().unwrap();
        assert_eq!(plant.plant_pet_name, "Fernie");
    }

    #[test]
    fn image_url_is_mutable() {
        let conn = conn();
        let id = insert_plant_within_quota(&conn, "u1", &fern("Fernie"), 5).unwrap();
        assert_eq!(set_image_url(&conn, "u1", id, "https://img.example/new.png").unwrap(), 1);
        let plant = get_plant(&conn, "u1", id).unwrap().unwrap();
        assert_eq!(plant.image_url, "https://img.example/new.png");
    }

    #[test]
    fn invalid_health_never_reaches_storage() {
        let conn = conn();
        let mut plant = fern("Sick");
        plant.plant_health = 150;
        let err = insert_plant_within_quota(&conn, "u1", &plant, 5).unwrap_err();
        assert_eq!(err.code(), "INVALID_HEALTH");
        assert_eq!(count_plants(&conn, "u1").unwrap(), 0);
    }
}

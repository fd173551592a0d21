use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use sprout_core::config::DatabaseConfig;
use tracing::info;

use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Initialise the garden schema in `conn`. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_plants_table(conn)?;
    create_schedules_table(conn)?;
    Ok(())
}

fn create_plants_table(conn: &Connection) -> Result<()> {
    // AUTOINCREMENT: ids of deleted plants are never handed out again.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS plants (
            plant_id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         TEXT    NOT NULL,
            plant_name      TEXT    NOT NULL,
            scientific_name TEXT    NOT NULL,
            species         TEXT    NOT NULL,
            image_url       TEXT    NOT NULL,
            plant_pet_name  TEXT    NOT NULL,
            plant_health    INTEGER NOT NULL CHECK (plant_health BETWEEN 0 AND 100),
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plants_user ON plants (user_id);",
    )?;
    Ok(())
}

fn create_schedules_table(conn: &Connection) -> Result<()> {
    // Dates are ISO YYYY-MM-DD text so range comparisons work lexicographically.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schedules (
            schedule_id        INTEGER PRIMARY KEY AUTOINCREMENT,
            plant_id           INTEGER NOT NULL UNIQUE REFERENCES plants (plant_id),
            user_id            TEXT    NOT NULL,
            plant_pet_name     TEXT    NOT NULL,
            water_is_completed INTEGER NOT NULL DEFAULT 0,
            water_repeat_every INTEGER NOT NULL CHECK (water_repeat_every > 0),
            water_repeat_unit  TEXT    NOT NULL,
            watering_date      TEXT    NOT NULL,
            next_watering_date TEXT    NOT NULL,
            created_at         TEXT    NOT NULL,
            updated_at         TEXT    NOT NULL,
            CHECK (next_watering_date >= watering_date)
        );
        CREATE INDEX IF NOT EXISTS idx_schedules_user_due
            ON schedules (user_id, next_watering_date);",
    )?;
    Ok(())
}

/// Open a connection pool on `config.path`, creating the file, enabling WAL
/// and running [`init_db`].
///
/// Every pooled connection gets `foreign_keys=ON` and the configured busy
/// timeout, so writers queue on SQLite's lock instead of failing fast.
pub fn open_pool(config: &DatabaseConfig) -> Result<DbPool> {
    ensure_parent_dir(&config.path);
    info!(path = %config.path, pool_size = config.pool_size, "opening SQLite pool");

    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
    });
    let pool = Pool::builder()
        .max_size(config.pool_size.max(1))
        .build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_db(&conn)?;
    info!("garden schema ready");

    Ok(pool)
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}

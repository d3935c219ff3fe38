use std::path::Path;

use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use smartg_core::{
    DeviceId, DeviceRecord, DeviceStatus, NewWorker, RecordStore, StoreError, WorkerId, WorkerRecord,
};

use crate::seed::{demo_devices, demo_workers};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0} not found")]
    Missing(String),
    #[error("unknown device status {0:?}")]
    BadStatus(String),
    #[error("no free worker id left")]
    IdsExhausted,
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(f, msg)) if f.code == ErrorCode::ConstraintViolation => {
                StoreError::Conflict(msg.unwrap_or_else(|| f.to_string()))
            }
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows) => StoreError::NotFound("row".into()),
            DbError::Missing(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// [`RecordStore`] over a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(DbError::from)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(DbError::from)?;
        let store = Self { conn };
        store.init_schema()?;
        info!("opened record store at {}", path.as_ref().display());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(DbError::from)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), DbError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS devices (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                battery REAL NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                occupation TEXT NOT NULL,
                device_id TEXT,
                is_paired INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workers_device ON workers(device_id)",
            [],
        )?;
        Ok(())
    }

    /// Insert the demo roster into an empty database. Returns `false` and does
    /// nothing when any worker or device already exists.
    pub fn seed_demo(&mut self) -> Result<bool, StoreError> {
        Ok(self.seed_demo_inner()?)
    }

    fn seed_demo_inner(&mut self) -> Result<bool, DbError> {
        let existing: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM workers) + (SELECT COUNT(*) FROM devices)",
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            debug!("seed skipped: {existing} records present");
            return Ok(false);
        }

        let tx = self.conn.transaction()?;
        for d in demo_devices() {
            tx.execute(
                "INSERT INTO devices (id, status, battery) VALUES (?1, ?2, ?3)",
                params![d.id.as_str(), d.status.as_str(), d.battery],
            )?;
        }
        for w in demo_workers() {
            tx.execute(
                "INSERT INTO workers (id, name, age, occupation, device_id, is_paired)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    w.id.as_str(),
                    w.name,
                    w.age,
                    w.occupation,
                    w.device_id.as_ref().map(|d| d.as_str()),
                    w.paired
                ],
            )?;
        }
        tx.commit()?;
        info!("seeded demo workers and devices");
        Ok(true)
    }

    /// `W` followed by the last four digits of the millisecond clock, bumped
    /// until it does not collide with an existing worker.
    fn issue_worker_id(&self) -> Result<WorkerId, DbError> {
        let mut n = Utc::now().timestamp_millis().rem_euclid(10_000);
        for _ in 0..10_000 {
            let id = format!("W{n:04}");
            let taken = self
                .conn
                .query_row("SELECT 1 FROM workers WHERE id = ?1", params![id], |_| Ok(()))
                .optional()?
                .is_some();
            if !taken {
                return Ok(WorkerId(id));
            }
            n = (n + 1) % 10_000;
        }
        Err(DbError::IdsExhausted)
    }

    fn fetch_workers_inner(&self) -> Result<Vec<WorkerRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, age, occupation, device_id, is_paired FROM workers ORDER BY id",
        )?;
        let rows = stmt.query_map([], worker_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn fetch_devices_inner(&self) -> Result<Vec<DeviceRecord>, DbError> {
        let mut stmt = self.conn.prepare("SELECT id, status, battery FROM devices ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, f64>(2)?))
        })?;
        let mut devices = Vec::new();
        for row in rows {
            let (id, status, battery) = row?;
            let status = DeviceStatus::parse(&status).ok_or(DbError::BadStatus(status))?;
            devices.push(DeviceRecord { id: DeviceId(id), status, battery });
        }
        Ok(devices)
    }

    fn set_pairing(&mut self, worker: &WorkerId, device: &DeviceId, paired: bool) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        let worker_device = paired.then(|| device.as_str());
        let changed = tx.execute(
            "UPDATE workers SET device_id = ?1, is_paired = ?2 WHERE id = ?3",
            params![worker_device, paired, worker.as_str()],
        )?;
        if changed == 0 {
            return Err(DbError::Missing(format!("worker {worker}")));
        }
        let status = if paired { DeviceStatus::Active } else { DeviceStatus::Inactive };
        let changed = tx.execute(
            "UPDATE devices SET status = ?1 WHERE id = ?2",
            params![status.as_str(), device.as_str()],
        )?;
        if changed == 0 {
            return Err(DbError::Missing(format!("device {device}")));
        }
        tx.commit()?;
        Ok(())
    }
}

fn worker_from_row(row: &Row<'_>) -> rusqlite::Result<WorkerRecord> {
    Ok(WorkerRecord {
        id: WorkerId(row.get(0)?),
        name: row.get(1)?,
        age: row.get(2)?,
        occupation: row.get(3)?,
        device_id: row.get::<_, Option<String>>(4)?.map(DeviceId),
        paired: row.get(5)?,
    })
}

impl RecordStore for SqliteStore {
    fn fetch_workers(&mut self) -> Result<Vec<WorkerRecord>, StoreError> {
        Ok(self.fetch_workers_inner()?)
    }

    fn fetch_devices(&mut self) -> Result<Vec<DeviceRecord>, StoreError> {
        Ok(self.fetch_devices_inner()?)
    }

    fn add_worker(&mut self, new: &NewWorker) -> Result<WorkerRecord, StoreError> {
        let id = self.issue_worker_id()?;
        self.conn
            .execute(
                "INSERT INTO workers (id, name, age, occupation, device_id, is_paired)
                 VALUES (?1, ?2, ?3, ?4, NULL, 0)",
                params![id.as_str(), new.name, new.age, new.occupation],
            )
            .map_err(DbError::from)?;
        Ok(WorkerRecord {
            id,
            name: new.name.clone(),
            age: new.age,
            occupation: new.occupation.clone(),
            device_id: None,
            paired: false,
        })
    }

    fn delete_worker(&mut self, id: &WorkerId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM workers WHERE id = ?1", params![id.as_str()])
            .map_err(DbError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("worker {id}")));
        }
        Ok(())
    }

    fn register_device(&mut self, id: &DeviceId) -> Result<DeviceRecord, StoreError> {
        let record = DeviceRecord::registered(id.clone());
        self.conn
            .execute(
                "INSERT INTO devices (id, status, battery) VALUES (?1, ?2, ?3)",
                params![record.id.as_str(), record.status.as_str(), record.battery],
            )
            .map_err(DbError::from)?;
        Ok(record)
    }

    fn delete_device(&mut self, id: &DeviceId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM devices WHERE id = ?1", params![id.as_str()])
            .map_err(DbError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("device {id}")));
        }
        Ok(())
    }

    fn pair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
        Ok(self.set_pairing(worker, device, true)?)
    }

    fn unpair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
        Ok(self.set_pairing(worker, device, false)?)
    }
}

//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The seeder, simulator and assistant call store methods and never
//! execute SQL directly.

use crate::{
    config::{DbConfig, RetryPolicy},
    error::{FabError, FabResult},
    types::{AlarmId, DeptId, MachineId, ProductId, RowId},
};
use chrono::NaiveDateTime;
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    Connection, OpenFlags, ToSql,
};
use serde::{Deserialize, Serialize};

mod dashboard;
mod history;
mod master;

pub use dashboard::{
    AlarmReading, DailyCount, MachineDirectoryEntry, MachineOutput, NamedTotal, OeeInputs,
};

/// Every table, dependents first. Clearing in this order never violates a
/// foreign key.
pub const TABLES_DEPENDENTS_FIRST: [&str; 7] = [
    "Sensors",
    "Alarms",
    "ProductionLog",
    "Orders",
    "Machines",
    "Departments",
    "Products",
];

pub struct FactoryStore {
    conn:   Connection,
    target: String,
}

impl FactoryStore {
    /// Connect with a fixed-delay retry. Fatal after `retry.attempts` tries.
    pub fn connect(config: &DbConfig, retry: &RetryPolicy) -> FabResult<Self> {
        let target = config.target();
        let attempts = retry.attempts.max(1);
        log::info!("Connecting to {target} as '{}'", config.user);

        let mut attempt = 1;
        loop {
            match Self::try_open(&target) {
                Ok(store) => return Ok(store),
                Err(e) if attempt < attempts => {
                    log::warn!(
                        "Waiting for database ({e}); attempt {attempt}/{attempts}, \
                         retrying in {:?}",
                        retry.delay
                    );
                    std::thread::sleep(retry.delay);
                    attempt += 1;
                }
                Err(source) => {
                    return Err(FabError::StoreUnavailable {
                        target,
                        attempts,
                        source,
                    })
                }
            }
        }
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> FabResult<Self> {
        Ok(Self::try_open(DbConfig::IN_MEMORY)?)
    }

    fn try_open(target: &str) -> Result<Self, rusqlite::Error> {
        let conn = if target == DbConfig::IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open_with_flags(
                target,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )?
        };
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(Self {
            conn,
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Schema initializer. Idempotent; runs on every startup.
    pub fn migrate(&self) -> FabResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_factory.sql"))?;
        Ok(())
    }

    // ── Batches ────────────────────────────────────────────────

    /// Open an explicit transaction. Writes are durable only after
    /// `commit_batch`.
    pub fn begin_batch(&self) -> FabResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit_batch(&self) -> FabResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Roll back the open batch, if any.
    pub fn rollback_batch(&self) -> FabResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    pub fn in_batch(&self) -> bool {
        !self.conn.is_autocommit()
    }

    // ── Reset ──────────────────────────────────────────────────

    /// Delete every row of every table and restart identity counters.
    pub fn reset_all(&self) -> FabResult<()> {
        for table in TABLES_DEPENDENTS_FIRST {
            self.conn.execute(&format!("DELETE FROM {table}"), [])?;
        }
        self.conn.execute(
            "DELETE FROM sqlite_sequence WHERE name IN
                 ('Sensors','Alarms','ProductionLog','Orders','Machines','Departments','Products')",
            [],
        )?;
        log::debug!("All factory tables cleared");
        Ok(())
    }

    pub fn table_count(&self, table: &str) -> FabResult<i64> {
        if !TABLES_DEPENDENTS_FIRST.contains(&table) {
            return Err(FabError::Config(format!("unknown table '{table}'")));
        }
        Ok(self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    }

    /// Row counts for all seven tables, dependents first.
    pub fn table_counts(&self) -> FabResult<Vec<(&'static str, i64)>> {
        TABLES_DEPENDENTS_FIRST
            .iter()
            .map(|t| Ok((*t, self.table_count(t)?)))
            .collect()
    }
}

// ── Rows ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub dept_id: DeptId,
    pub name:    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRow {
    pub machine_id: MachineId,
    pub dept_id:    DeptId,
    pub name:       String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id:      ProductId,
    pub name:            String,
    pub difficulty:      u8,
    pub ideal_rate_kg_h: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Done,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
        }
    }
}

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrderStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Pending" => Ok(Self::Pending),
            "Done" => Ok(Self::Done),
            other => Err(FromSqlError::Other(
                format!("unknown order status '{other}'").into(),
            )),
        }
    }
}

/// `id` is None until the row has been inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id:   Option<RowId>,
    pub customer:   String,
    pub product_id: ProductId,
    pub amount_kg:  i64,
    pub due_date:   NaiveDateTime,
    pub status:     OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRunRow {
    pub log_id:         Option<RowId>,
    pub machine_id:     MachineId,
    pub product_id:     ProductId,
    pub start_time:     NaiveDateTime,
    pub duration_hours: i64,
    pub produced_kg:    i64,
    pub scrapped_kg:    i64,
}

impl ProductionRunRow {
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + chrono::Duration::hours(self.duration_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRow {
    pub alarm_id:         Option<AlarmId>,
    pub machine_id:       MachineId,
    pub code:             String,
    pub description:      String,
    pub start_time:       NaiveDateTime,
    pub end_time:         NaiveDateTime,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRow {
    pub sensor_id:   Option<RowId>,
    pub machine_id:  MachineId,
    pub sensor_type: String,
    pub value:       f64,
    pub alarm_id:    Option<AlarmId>,
    pub timestamp:   NaiveDateTime,
}

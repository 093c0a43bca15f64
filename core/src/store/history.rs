use super::{AlarmRow, FactoryStore, OrderRow, ProductionRunRow, SensorRow};
use crate::{
    error::FabResult,
    types::{AlarmId, RowId},
};
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};

impl FactoryStore {
    // ── Orders ────────────────────────────────────────────────────

    pub fn insert_order(&self, o: &OrderRow) -> FabResult<RowId> {
        self.conn.execute(
            "INSERT INTO Orders (Customer, ProductID, AmountKg, DueDate, Status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![o.customer, o.product_id, o.amount_kg, o.due_date, o.status],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn orders(&self) -> FabResult<Vec<OrderRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT OrderID, Customer, ProductID, AmountKg, DueDate, Status
             FROM Orders ORDER BY OrderID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(OrderRow {
                    order_id:   Some(r.get(0)?),
                    customer:   r.get(1)?,
                    product_id: r.get(2)?,
                    amount_kg:  r.get(3)?,
                    due_date:   r.get(4)?,
                    status:     r.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Production log ────────────────────────────────────────────

    pub fn insert_production_run(&self, p: &ProductionRunRow) -> FabResult<RowId> {
        self.conn.execute(
            "INSERT INTO ProductionLog
                 (MachineID, ProductID, StartTime, DurationHours, ProducedKg, ScrappedKg)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                p.machine_id,
                p.product_id,
                p.start_time,
                p.duration_hours,
                p.produced_kg,
                p.scrapped_kg,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn production_runs(&self) -> FabResult<Vec<ProductionRunRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT LogID, MachineID, ProductID, StartTime, DurationHours, ProducedKg, ScrappedKg
             FROM ProductionLog ORDER BY LogID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(ProductionRunRow {
                    log_id:         Some(r.get(0)?),
                    machine_id:     r.get(1)?,
                    product_id:     r.get(2)?,
                    start_time:     r.get(3)?,
                    duration_hours: r.get(4)?,
                    produced_kg:    r.get(5)?,
                    scrapped_kg:    r.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The row-count guard that decides whether provisioning reseeds.
    pub fn production_count(&self) -> FabResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM ProductionLog", [], |r| r.get(0))?)
    }

    pub fn max_production_start(&self) -> FabResult<Option<NaiveDateTime>> {
        let latest = self
            .conn
            .query_row("SELECT MAX(StartTime) FROM ProductionLog", [], |r| {
                r.get::<_, Option<NaiveDateTime>>(0)
            })
            .optional()?
            .flatten();
        Ok(latest)
    }

    // ── Alarms ────────────────────────────────────────────────────

    pub fn insert_alarm(&self, a: &AlarmRow) -> FabResult<AlarmId> {
        self.conn.execute(
            "INSERT INTO Alarms
                 (MachineID, AlarmCode, Description, StartTime, EndTime, DurationMinutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                a.machine_id,
                a.code,
                a.description,
                a.start_time,
                a.end_time,
                a.duration_minutes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn alarms(&self) -> FabResult<Vec<AlarmRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT AlarmID, MachineID, AlarmCode, Description, StartTime, EndTime, DurationMinutes
             FROM Alarms ORDER BY AlarmID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(AlarmRow {
                    alarm_id:         Some(r.get(0)?),
                    machine_id:       r.get(1)?,
                    code:             r.get(2)?,
                    description:      r.get(3)?,
                    start_time:       r.get(4)?,
                    end_time:         r.get(5)?,
                    duration_minutes: r.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Sensors ───────────────────────────────────────────────────

    pub fn insert_sensor_reading(&self, s: &SensorRow) -> FabResult<RowId> {
        self.conn.execute(
            "INSERT INTO Sensors (MachineID, SensorType, Value, AlarmID, Timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![s.machine_id, s.sensor_type, s.value, s.alarm_id, s.timestamp],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn sensor_readings(&self) -> FabResult<Vec<SensorRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT SensorID, MachineID, SensorType, Value, AlarmID, Timestamp
             FROM Sensors ORDER BY SensorID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(SensorRow {
                    sensor_id:   Some(r.get(0)?),
                    machine_id:  r.get(1)?,
                    sensor_type: r.get(2)?,
                    value:       r.get(3)?,
                    alarm_id:    r.get(4)?,
                    timestamp:   r.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

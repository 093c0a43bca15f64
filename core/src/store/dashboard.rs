//! Read-only aggregates behind the dashboard views and the assistant.
//!
//! Every query is keyed by a `DateRange`; timestamps are compared on the
//! half-open bounds `[from 00:00, to + 1 day 00:00)`.

use super::FactoryStore;
use crate::{
    error::FabResult,
    types::{DateRange, MachineId},
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::params;
use serde::{Deserialize, Serialize};

/// A label with an aggregated integer (count, kg or minutes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTotal {
    pub name:  String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day:   NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineOutput {
    pub name:        String,
    pub produced_kg: i64,
    pub scrapped_kg: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDirectoryEntry {
    pub machine_id: MachineId,
    pub name:       String,
    pub department: String,
}

/// Raw sums feeding the OEE calculation for one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OeeInputs {
    pub produced_kg:   i64,
    pub scrapped_kg:   i64,
    pub run_hours:     i64,
    pub alarm_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmReading {
    pub start_time:  NaiveDateTime,
    pub description: String,
    pub sensor_type: String,
    pub value:       f64,
}

impl FactoryStore {
    fn named_totals(
        &self,
        sql: &str,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<NamedTotal>> {
        let (lo, hi) = range.bounds();
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![lo, hi, limit], |r| {
                Ok(NamedTotal {
                    name:  r.get(0)?,
                    total: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Alarm descriptions by frequency.
    pub fn top_alarm_causes(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<NamedTotal>> {
        self.named_totals(
            "SELECT Description, COUNT(*) AS n FROM Alarms
             WHERE StartTime >= ?1 AND StartTime < ?2
             GROUP BY Description ORDER BY n DESC, Description LIMIT ?3",
            range,
            limit,
        )
    }

    /// Machines by number of alarms raised.
    pub fn alarms_per_machine(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<NamedTotal>> {
        self.named_totals(
            "SELECT m.Name, COUNT(*) AS n FROM Alarms a
             JOIN Machines m ON a.MachineID = m.MachineID
             WHERE a.StartTime >= ?1 AND a.StartTime < ?2
             GROUP BY m.Name ORDER BY n DESC, m.Name LIMIT ?3",
            range,
            limit,
        )
    }

    /// Products by good output (kg).
    pub fn production_by_product(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<NamedTotal>> {
        self.named_totals(
            "SELECT p.Name, SUM(pl.ProducedKg) AS kg FROM ProductionLog pl
             JOIN Products p ON pl.ProductID = p.ProductID
             WHERE pl.StartTime >= ?1 AND pl.StartTime < ?2
             GROUP BY p.Name ORDER BY kg DESC, p.Name LIMIT ?3",
            range,
            limit,
        )
    }

    /// Alarm descriptions by accumulated downtime (minutes).
    pub fn alarm_downtime_by_cause(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<NamedTotal>> {
        self.named_totals(
            "SELECT Description, SUM(DurationMinutes) AS t FROM Alarms
             WHERE StartTime >= ?1 AND StartTime < ?2
             GROUP BY Description ORDER BY t DESC, Description LIMIT ?3",
            range,
            limit,
        )
    }

    /// Machines by good output, with their scrap.
    pub fn production_by_machine(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<MachineOutput>> {
        let (lo, hi) = range.bounds();
        let mut stmt = self.conn.prepare(
            "SELECT m.Name, SUM(pl.ProducedKg) AS kg, SUM(pl.ScrappedKg)
             FROM ProductionLog pl JOIN Machines m ON pl.MachineID = m.MachineID
             WHERE pl.StartTime >= ?1 AND pl.StartTime < ?2
             GROUP BY m.Name ORDER BY kg DESC, m.Name LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![lo, hi, limit], |r| {
                Ok(MachineOutput {
                    name:        r.get(0)?,
                    produced_kg: r.get(1)?,
                    scrapped_kg: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Alarms per calendar day, newest first.
    pub fn alarm_trend(&self, range: &DateRange) -> FabResult<Vec<DailyCount>> {
        let (lo, hi) = range.bounds();
        let mut stmt = self.conn.prepare(
            "SELECT date(StartTime) AS d, COUNT(*) FROM Alarms
             WHERE StartTime >= ?1 AND StartTime < ?2
             GROUP BY d ORDER BY d DESC",
        )?;
        let rows = stmt
            .query_map(params![lo, hi], |r| {
                Ok(DailyCount {
                    day:   r.get(0)?,
                    count: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn machine_directory(&self) -> FabResult<Vec<MachineDirectoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.MachineID, m.Name, d.Name FROM Machines m
             JOIN Departments d ON m.DeptID = d.DeptID
             ORDER BY m.MachineID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(MachineDirectoryEntry {
                    machine_id: r.get(0)?,
                    name:       r.get(1)?,
                    department: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// None when the machine logged no production in the range.
    pub fn machine_oee_inputs(
        &self,
        machine_id: MachineId,
        range: &DateRange,
    ) -> FabResult<Option<OeeInputs>> {
        let (lo, hi) = range.bounds();
        let (produced, scrapped, hours): (Option<i64>, Option<i64>, Option<i64>) =
            self.conn.query_row(
                "SELECT SUM(ProducedKg), SUM(ScrappedKg), SUM(DurationHours)
                 FROM ProductionLog
                 WHERE MachineID = ?1 AND StartTime >= ?2 AND StartTime < ?3",
                params![machine_id, lo, hi],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?;
        let Some(produced_kg) = produced else {
            return Ok(None);
        };
        let alarm_minutes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(DurationMinutes), 0) FROM Alarms
             WHERE MachineID = ?1 AND StartTime >= ?2 AND StartTime < ?3",
            params![machine_id, lo, hi],
            |r| r.get(0),
        )?;
        Ok(Some(OeeInputs {
            produced_kg,
            scrapped_kg: scrapped.unwrap_or(0),
            run_hours: hours.unwrap_or(0),
            alarm_minutes,
        }))
    }

    /// Alarms joined with their sensor readings, newest first.
    pub fn machine_alarm_readings(
        &self,
        machine_id: MachineId,
        range: &DateRange,
        limit: u32,
    ) -> FabResult<Vec<AlarmReading>> {
        let (lo, hi) = range.bounds();
        let mut stmt = self.conn.prepare(
            "SELECT a.StartTime, a.Description, s.SensorType, s.Value
             FROM Alarms a JOIN Sensors s ON a.AlarmID = s.AlarmID
             WHERE a.MachineID = ?1 AND a.StartTime >= ?2 AND a.StartTime < ?3
             ORDER BY a.StartTime DESC, a.AlarmID DESC LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(params![machine_id, lo, hi, limit], |r| {
                Ok(AlarmReading {
                    start_time:  r.get(0)?,
                    description: r.get(1)?,
                    sensor_type: r.get(2)?,
                    value:       r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

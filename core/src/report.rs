//! Dashboard views composed from the read-only queries.

use crate::{
    error::{FabError, FabResult},
    oee::OeeFigures,
    store::{AlarmReading, DailyCount, FactoryStore, NamedTotal},
    types::{DateRange, MachineId},
};
use serde::{Deserialize, Serialize};

pub const DOWNTIME_CAUSE_LIMIT: u32 = 10;
pub const DETAIL_READING_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmReport {
    pub range:             DateRange,
    /// Newest day first.
    pub trend:             Vec<DailyCount>,
    /// Minutes per cause, longest first.
    pub downtime_by_cause: Vec<NamedTotal>,
}

impl AlarmReport {
    pub fn total_alarms(&self) -> i64 {
        self.trend.iter().map(|d| d.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineOee {
    pub machine_id: MachineId,
    pub name:       String,
    pub department: String,
    pub figures:    OeeFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDetail {
    pub machine_id: MachineId,
    pub name:       String,
    pub readings:   Vec<AlarmReading>,
}

pub fn alarm_report(store: &FactoryStore, range: &DateRange) -> FabResult<AlarmReport> {
    Ok(AlarmReport {
        range:             *range,
        trend:             store.alarm_trend(range)?,
        downtime_by_cause: store.alarm_downtime_by_cause(range, DOWNTIME_CAUSE_LIMIT)?,
    })
}

/// OEE per machine, in directory order. Machines without production in
/// the range are left out.
pub fn oee_board(store: &FactoryStore, range: &DateRange) -> FabResult<Vec<MachineOee>> {
    let mut board = Vec::new();
    for entry in store.machine_directory()? {
        let Some(inputs) = store.machine_oee_inputs(entry.machine_id, range)? else {
            continue;
        };
        board.push(MachineOee {
            machine_id: entry.machine_id,
            name:       entry.name,
            department: entry.department,
            figures:    OeeFigures::compute(&inputs),
        });
    }
    Ok(board)
}

pub fn machine_detail(
    store: &FactoryStore,
    machine_id: MachineId,
    range: &DateRange,
) -> FabResult<MachineDetail> {
    let machine = store
        .machine(machine_id)?
        .ok_or(FabError::UnknownMachine { machine_id })?;
    Ok(MachineDetail {
        machine_id,
        name: machine.name,
        readings: store.machine_alarm_readings(machine_id, range, DETAIL_READING_LIMIT)?,
    })
}

//! Facts emitted by the day generators.
//!
//! Generators report what they wrote as events; the engine folds them into
//! the run's `GenerationSummary`. Events never drive further writes.

use crate::{
    clock::DayKind,
    store::OrderStatus,
    types::{AlarmId, MachineId, ProductId, RowId},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    OrderPlaced {
        order_id:   RowId,
        product_id: ProductId,
        amount_kg:  i64,
        status:     OrderStatus,
    },
    RunLogged {
        log_id:      RowId,
        machine_id:  MachineId,
        product_id:  ProductId,
        produced_kg: i64,
        scrapped_kg: i64,
    },
    AlarmRaised {
        alarm_id:   AlarmId,
        machine_id: MachineId,
        code:       String,
    },
    SensorRecorded {
        sensor_id: RowId,
        alarm_id:  AlarmId,
    },
}

/// End-of-run totals for one history walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub start_date:      Option<NaiveDate>,
    pub last_day:        Option<NaiveDate>,
    pub now:             Option<NaiveDateTime>,
    pub past_days:       u64,
    pub future_days:     u64,
    pub orders:          u64,
    pub pending_orders:  u64,
    pub production_runs: u64,
    pub alarms:          u64,
    pub sensor_readings: u64,
    pub produced_kg:     i64,
    pub scrapped_kg:     i64,
    pub commits:         u64,
}

impl GenerationSummary {
    pub fn record(&mut self, event: &HistoryEvent) {
        match event {
            HistoryEvent::OrderPlaced { status, .. } => {
                self.orders += 1;
                if *status == OrderStatus::Pending {
                    self.pending_orders += 1;
                }
            }
            HistoryEvent::RunLogged {
                produced_kg,
                scrapped_kg,
                ..
            } => {
                self.production_runs += 1;
                self.produced_kg += produced_kg;
                self.scrapped_kg += scrapped_kg;
            }
            HistoryEvent::AlarmRaised { .. } => self.alarms += 1,
            HistoryEvent::SensorRecorded { .. } => self.sensor_readings += 1,
        }
    }

    pub fn record_day(&mut self, day: NaiveDate, kind: DayKind) {
        if self.start_date.is_none() {
            self.start_date = Some(day);
        }
        self.last_day = Some(day);
        match kind {
            DayKind::Past => self.past_days += 1,
            DayKind::Future => self.future_days += 1,
        }
    }
}

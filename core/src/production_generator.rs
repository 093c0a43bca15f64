//! Production runs, and the alarms and sensor readings they cause.
//!
//! Only past days produce anything here. Per machine and day:
//!   1. the machine idles with `machine_skip_probability`;
//!   2. otherwise it runs one random product for 4–16 hours from midnight;
//!   3. the run may raise one alarm, which always carries one vibration
//!      reading stamped at the alarm's start.

use crate::{
    config::SimulationParams,
    error::{FabError, FabResult},
    event::HistoryEvent,
    generator::{DayGenerator, SimDay},
    rng::StreamRng,
    seeder::{MasterData, ProductProfile},
    store::{AlarmRow, FactoryStore, ProductionRunRow, SensorRow},
    types::MachineId,
};
use chrono::Duration;

pub const VIBRATION_SENSOR: &str = "Vibration";

/// Split `hours × rate` into good and scrapped mass.
/// Returns `(produced, scrapped)`; they always sum to the base.
pub fn split_output(hours: i64, ideal_rate_kg_h: i64, scrap_fraction: f64) -> (i64, i64) {
    let base = hours * ideal_rate_kg_h;
    let scrapped = ((base as f64) * scrap_fraction).floor().max(0.0) as i64;
    let scrapped = scrapped.min(base);
    (base - scrapped, scrapped)
}

pub struct ProductionGenerator {
    machines:  Vec<MachineId>,
    products:  Vec<ProductProfile>,
    params:    SimulationParams,
    /// Idle roll, product, hours, scrap.
    rng:       StreamRng,
    /// Alarm roll and everything about the alarm and its reading.
    alarm_rng: StreamRng,
}

impl ProductionGenerator {
    pub fn new(
        master: &MasterData,
        params: SimulationParams,
        rng: StreamRng,
        alarm_rng: StreamRng,
    ) -> Self {
        Self {
            machines: master.machines.iter().map(|m| m.machine_id).collect(),
            products: master.products.clone(),
            params,
            rng,
            alarm_rng,
        }
    }

    fn run_machine(
        &mut self,
        machine_id: MachineId,
        day: &SimDay,
        store: &FactoryStore,
        events: &mut Vec<HistoryEvent>,
    ) -> FabResult<()> {
        if self.rng.chance(self.params.machine_skip_probability) {
            return Ok(());
        }
        let product = self
            .rng
            .pick(&self.products)
            .cloned()
            .ok_or(FabError::MasterDataMissing { table: "Products" })?;

        let (lo, hi) = self.params.run_hours;
        let hours = self.rng.int_inclusive(lo, hi);
        let fraction = self.rng.uniform(
            self.params.scrap_fraction_min,
            self.params.scrap_ceiling(product.dust_prone),
        );
        let (produced_kg, scrapped_kg) = split_output(hours, product.ideal_rate_kg_h, fraction);

        let run = ProductionRunRow {
            log_id: None,
            machine_id,
            product_id: product.product_id,
            start_time: day.start,
            duration_hours: hours,
            produced_kg,
            scrapped_kg,
        };
        let log_id = store.insert_production_run(&run)?;
        events.push(HistoryEvent::RunLogged {
            log_id,
            machine_id,
            product_id: product.product_id,
            produced_kg,
            scrapped_kg,
        });

        if self
            .alarm_rng
            .chance(self.params.alarm_probability(product.difficulty))
        {
            self.raise_alarm(&run, &product, store, events)?;
        }
        Ok(())
    }

    fn raise_alarm(
        &mut self,
        run: &ProductionRunRow,
        product: &ProductProfile,
        store: &FactoryStore,
        events: &mut Vec<HistoryEvent>,
    ) -> FabResult<()> {
        let offset_hours = self.alarm_rng.int_inclusive(1, run.duration_hours);
        let start_time = run.start_time + Duration::hours(offset_hours);
        let (lo, hi) = self.params.alarm_minutes;
        let duration_minutes = self.alarm_rng.int_inclusive(lo, hi);
        let spec = product.fault.alarm();

        let alarm = AlarmRow {
            alarm_id: None,
            machine_id: run.machine_id,
            code: spec.code.to_string(),
            description: spec.description.to_string(),
            start_time,
            end_time: start_time + Duration::minutes(duration_minutes),
            duration_minutes,
        };
        let alarm_id = store.insert_alarm(&alarm)?;
        events.push(HistoryEvent::AlarmRaised {
            alarm_id,
            machine_id: run.machine_id,
            code: alarm.code.clone(),
        });

        let (lo, hi) = self.params.vibration_range;
        let reading = SensorRow {
            sensor_id: None,
            machine_id: run.machine_id,
            sensor_type: VIBRATION_SENSOR.to_string(),
            value: self.alarm_rng.uniform(lo, hi),
            alarm_id: Some(alarm_id),
            timestamp: start_time,
        };
        let sensor_id = store.insert_sensor_reading(&reading)?;
        events.push(HistoryEvent::SensorRecorded {
            sensor_id,
            alarm_id,
        });
        Ok(())
    }
}

impl DayGenerator for ProductionGenerator {
    fn name(&self) -> &'static str {
        "production"
    }

    fn generate(&mut self, day: &SimDay, store: &FactoryStore) -> FabResult<Vec<HistoryEvent>> {
        // Production facts never exist for future days.
        if day.is_future() {
            return Ok(vec![]);
        }
        let mut events = Vec::new();
        let machines = self.machines.clone();
        for machine_id in machines {
            self.run_machine(machine_id, day, store, &mut events)?;
        }
        Ok(events)
    }
}

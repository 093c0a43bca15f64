//! The history simulator: walks the calendar and drives the generators.
//!
//! EXECUTION ORDER (fixed):
//!   1. Order generator       (every day)
//!   2. Production generator  (past days only; alarms and sensors inline)
//!
//! RULES:
//!   - Generators execute in registration order, once per simulated day.
//!   - All randomness flows through the RngBank.
//!   - "now" is fixed for the whole walk; it is read once by the caller.
//!   - Writes happen inside batches; a failure rolls back the open batch.

use crate::{
    clock::SimCalendar,
    config::{CommitPolicy, FactoryConfig, SimulationParams},
    error::{FabError, FabResult},
    event::GenerationSummary,
    generator::{DayGenerator, SimDay},
    order_generator::OrderGenerator,
    production_generator::ProductionGenerator,
    rng::{RngBank, StreamSlot},
    seeder::MasterData,
    store::FactoryStore,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub struct HistorySimulator {
    params:     SimulationParams,
    generators: Vec<Box<dyn DayGenerator>>,
}

impl HistorySimulator {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            generators: Vec::new(),
        }
    }

    /// Build a fully wired simulator with both generators registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: &FactoryConfig, master: &MasterData, seed: u64) -> FabResult<Self> {
        config.simulation.validate()?;
        let params = config.simulation.clone();
        let bank = RngBank::new(seed);
        let mut sim = HistorySimulator::new(params.clone());

        // Orders before production; never reordered.
        sim.register(Box::new(OrderGenerator::new(
            config.catalog.customers.clone(),
            master,
            params.clone(),
            bank.for_slot(StreamSlot::Orders),
        )));
        sim.register(Box::new(ProductionGenerator::new(
            master,
            params,
            bank.for_slot(StreamSlot::Production),
            bank.for_slot(StreamSlot::Alarms),
        )));
        Ok(sim)
    }

    /// Register a generator. Call in the documented execution order.
    pub fn register(&mut self, generator: Box<dyn DayGenerator>) {
        self.generators.push(generator);
    }

    /// Walk from the start date through `now + future_days`.
    pub fn run(
        &mut self,
        store: &FactoryStore,
        now: NaiveDateTime,
    ) -> FabResult<GenerationSummary> {
        self.params.validate()?;
        if store.in_batch() {
            return Err(FabError::Config(
                "history walk needs a store without an open batch".into(),
            ));
        }
        let mut calendar = SimCalendar::new(self.params.start_date, now, self.params.future_days);
        let mut summary = GenerationSummary {
            now: Some(now),
            ..GenerationSummary::default()
        };
        log::info!(
            "Simulating {} -> {} (now = {now})",
            self.params.start_date,
            calendar.end.date()
        );

        store.begin_batch()?;
        if let Err(e) = self.walk(store, &mut calendar, &mut summary) {
            if let Err(rollback) = store.rollback_batch() {
                log::warn!("Rollback after failed walk also failed: {rollback}");
            }
            return Err(e);
        }
        store.commit_batch()?;
        summary.commits += 1;

        log::info!(
            "Generation complete: {} orders, {} runs, {} alarms over {} days",
            summary.orders,
            summary.production_runs,
            summary.alarms,
            summary.past_days + summary.future_days
        );
        Ok(summary)
    }

    fn walk(
        &mut self,
        store: &FactoryStore,
        calendar: &mut SimCalendar,
        summary: &mut GenerationSummary,
    ) -> FabResult<()> {
        while calendar.in_horizon() {
            let date = calendar.current_day;
            let day = SimDay::new(date, calendar.classify(date));

            for generator in &mut self.generators {
                let events = generator.generate(&day, store)?;
                log::trace!("{} wrote {} rows for {date}", generator.name(), events.len());
                for event in &events {
                    summary.record(event);
                }
            }
            summary.record_day(date, day.kind);

            let next = calendar.advance();
            if calendar.in_horizon() && self.commit_due(next) {
                store.commit_batch()?;
                summary.commits += 1;
                log::debug!("Committed history through {date}");
                store.begin_batch()?;
            }
        }
        Ok(())
    }

    /// Whether the batch closes before simulating `next`.
    fn commit_due(&self, next: NaiveDate) -> bool {
        match self.params.commit_policy {
            CommitPolicy::Monthly => next.day() == 1,
            CommitPolicy::Daily => true,
            CommitPolicy::Once => false,
        }
    }
}

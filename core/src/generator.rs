//! Day generator trait.
//!
//! RULE: Every producer of history rows implements DayGenerator.
//! The engine calls generate() on each registered generator
//! in registration order, once per simulated day.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    clock::DayKind,
    error::FabResult,
    event::HistoryEvent,
    store::FactoryStore,
    types::day_start,
};
use chrono::{NaiveDate, NaiveDateTime};

/// The simulated calendar day handed to every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimDay {
    pub date:  NaiveDate,
    pub kind:  DayKind,
    /// Midnight at the start of `date`.
    pub start: NaiveDateTime,
}

impl SimDay {
    pub fn new(date: NaiveDate, kind: DayKind) -> Self {
        Self {
            date,
            kind,
            start: day_start(date),
        }
    }

    pub fn is_future(&self) -> bool {
        self.kind == DayKind::Future
    }
}

/// The contract every generator must fulfil.
pub trait DayGenerator {
    /// Unique stable name for this generator.
    fn name(&self) -> &'static str;

    /// Called once per simulated day by the engine, inside an open batch.
    ///
    /// Returns the facts written, in write order.
    fn generate(&mut self, day: &SimDay, store: &FactoryStore) -> FabResult<Vec<HistoryEvent>>;
}

//! Question answering over the factory data.
//!
//! Questions the router recognises are answered straight from an aggregate
//! query. Everything else is wrapped in a context prompt built from the
//! store and handed to a [`TextGenerator`].

pub mod llm;
pub mod router;

pub use llm::{OllamaClient, TextGenerator};
pub use router::{route, ChartQuery, ContextNeeds, Route, CHART_LIMIT};

use crate::{
    error::{FabError, FabResult},
    store::FactoryStore,
    table::Table,
    types::{DateRange, MachineId},
};
use serde::{Deserialize, Serialize};

pub const CONTEXT_ALARM_LIMIT: u32 = 5;
pub const CONTEXT_PRODUCTION_LIMIT: u32 = 10;
pub const MACHINE_READINGS_IN_PROMPT: usize = 5;
pub const MACHINE_READINGS_LIMIT: u32 = 50;
pub const UNREACHABLE_REPLY: &str = "Could not reach the assistant engine.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Table { title: String, table: Table },
    Text { text: String },
}

impl Answer {
    fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

pub struct Assistant<'a> {
    store:     &'a FactoryStore,
    generator: &'a dyn TextGenerator,
}

impl<'a> Assistant<'a> {
    pub fn new(store: &'a FactoryStore, generator: &'a dyn TextGenerator) -> Self {
        Self { store, generator }
    }

    pub fn ask(&self, prompt: &str, range: &DateRange) -> FabResult<Answer> {
        let departments: Vec<String> = self
            .store
            .departments()?
            .into_iter()
            .map(|d| d.name)
            .collect();

        match route(prompt, &departments) {
            Route::Chart { query } => {
                let table = self.chart(query, range)?;
                Ok(Answer::Table {
                    title: query.title().to_string(),
                    table,
                })
            }
            Route::Narrative { needs } => {
                let full_prompt = self.context_prompt(prompt, needs, range)?;
                Ok(self.generate(&full_prompt))
            }
        }
    }

    /// Free-text analysis of one machine from its newest alarm readings.
    pub fn analyse_machine(
        &self,
        machine_id: MachineId,
        question: &str,
        range: &DateRange,
    ) -> FabResult<Answer> {
        let machine = self
            .store
            .machine(machine_id)?
            .ok_or(FabError::UnknownMachine { machine_id })?;
        let mut readings = self
            .store
            .machine_alarm_readings(machine_id, range, MACHINE_READINGS_LIMIT)?;
        readings.truncate(MACHINE_READINGS_IN_PROMPT);

        let alarm_context = if readings.is_empty() {
            "No alarms.".to_string()
        } else {
            Table::from_readings(&readings).to_string()
        };
        let prompt = format!(
            "Analyse {}. Alarm data:\n{alarm_context}\nQuestion: {question}",
            machine.name
        );
        Ok(self.generate(&prompt))
    }

    fn chart(&self, query: ChartQuery, range: &DateRange) -> FabResult<Table> {
        let totals = match query {
            ChartQuery::TopAlarmCauses => self.store.top_alarm_causes(range, CHART_LIMIT)?,
            ChartQuery::WorstMachines => self.store.alarms_per_machine(range, CHART_LIMIT)?,
            ChartQuery::ProductionByProduct => {
                self.store.production_by_product(range, CHART_LIMIT)?
            }
        };
        let (label, value) = query.columns();
        Ok(Table::from_totals(label, value, &totals))
    }

    /// The full prompt sent for a narrative answer.
    pub fn context_prompt(
        &self,
        question: &str,
        needs: ContextNeeds,
        range: &DateRange,
    ) -> FabResult<String> {
        let mut context = String::new();
        if needs.machine_list {
            let directory = self.store.machine_directory()?;
            context.push_str(&format!(
                "\nMACHINE LIST:\n{}",
                Table::from_directory(&directory)
            ));
        }
        if needs.production {
            let output = self
                .store
                .production_by_machine(range, CONTEXT_PRODUCTION_LIMIT)?;
            context.push_str(&format!(
                "\nPRODUCTION DATA (kg):\n{}",
                Table::from_machine_output(&output)
            ));
        }
        let alarms = self.store.top_alarm_causes(range, CONTEXT_ALARM_LIMIT)?;
        context.push_str(&format!(
            "\nTOP ALARMS:\n{}",
            Table::from_totals("Description", "Count", &alarms)
        ));

        Ok(format!(
            "You are the operations manager of a candy factory. \
             Answer using only the factory data below ({} to {}).\n\
             {context}\n\n\
             Question: {question}\n\
             Do not guess machine names that are not listed in the data.",
            range.from, range.to
        ))
    }

    fn generate(&self, prompt: &str) -> Answer {
        match self.generator.generate(prompt) {
            Ok(text) => Answer::text(text),
            Err(e) => {
                log::warn!("Text generation failed: {e}");
                Answer::text(UNREACHABLE_REPLY)
            }
        }
    }
}

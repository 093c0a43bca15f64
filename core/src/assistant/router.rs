//! Keyword routing of free-text questions.
//!
//! A question either maps onto one fixed aggregate query (answered with a
//! table) or falls through to a narrative answer, in which case the router
//! decides which data sections to put in front of the text generator.

use serde::{Deserialize, Serialize};

pub const CHART_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartQuery {
    TopAlarmCauses,
    WorstMachines,
    ProductionByProduct,
}

impl ChartQuery {
    pub fn title(&self) -> &'static str {
        match self {
            Self::TopAlarmCauses => "Top alarm causes",
            Self::WorstMachines => "Machines with most faults",
            Self::ProductionByProduct => "Production volume",
        }
    }

    /// Column headers of the resulting table.
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            Self::TopAlarmCauses => ("Description", "Count"),
            Self::WorstMachines => ("Machine", "Count"),
            Self::ProductionByProduct => ("Product", "ProducedKg"),
        }
    }
}

/// Which data sections a narrative answer needs. Top alarm causes are
/// always included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextNeeds {
    pub machine_list: bool,
    pub production:   bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Chart { query: ChartQuery },
    Narrative { needs: ContextNeeds },
}

const RANKING_WORDS: [&str; 4] = ["top", "most", "common", "count"];
const FAULT_WORDS: [&str; 4] = ["most alarms", "worst", "most faults", "problem"];
const OUTPUT_WORDS: [&str; 3] = ["produced", "production", "made"];
const BEST_WORDS: [&str; 3] = ["most", "top", "best"];
const DIRECTORY_WORDS: [&str; 3] = ["which", "exist", "department"];
const PERFORMANCE_WORDS: [&str; 6] = [
    "produced",
    "capacity",
    "worst",
    "best",
    "efficiency",
    "scrap",
];

fn any_of(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Route a question. Matching is case-insensitive substring matching;
/// `departments` are department names that also trigger the machine list.
pub fn route(prompt: &str, departments: &[String]) -> Route {
    let text = prompt.to_lowercase();

    if text.contains("alarm") && any_of(&text, &RANKING_WORDS) {
        return Route::Chart {
            query: ChartQuery::TopAlarmCauses,
        };
    }
    if text.contains("machine") && any_of(&text, &FAULT_WORDS) {
        return Route::Chart {
            query: ChartQuery::WorstMachines,
        };
    }
    if any_of(&text, &OUTPUT_WORDS) && any_of(&text, &BEST_WORDS) {
        return Route::Chart {
            query: ChartQuery::ProductionByProduct,
        };
    }

    let names_department = departments
        .iter()
        .any(|d| !d.is_empty() && text.contains(&d.to_lowercase()));
    Route::Narrative {
        needs: ContextNeeds {
            machine_list: any_of(&text, &DIRECTORY_WORDS) || names_department,
            production:   any_of(&text, &PERFORMANCE_WORDS),
        },
    }
}

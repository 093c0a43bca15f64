//! Overall Equipment Effectiveness.
//!
//! availability × quality × a fixed performance factor. Alarm minutes count
//! as downtime on top of the logged run hours.

use crate::store::OeeInputs;
use serde::{Deserialize, Serialize};

pub const PERFORMANCE_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeFigures {
    /// Fractions in [0, 1].
    pub availability: f64,
    pub quality:      f64,
    pub performance:  f64,
    /// Percent, 0–100.
    pub oee:          f64,
}

impl OeeFigures {
    pub fn compute(inputs: &OeeInputs) -> Self {
        let run_minutes = (inputs.run_hours * 60) as f64;
        let downtime = inputs.alarm_minutes as f64;
        let planned = run_minutes + downtime;
        let availability = if planned > 0.0 { run_minutes / planned } else { 1.0 };

        let total = (inputs.produced_kg + inputs.scrapped_kg) as f64;
        let quality = if total > 0.0 {
            inputs.produced_kg as f64 / total
        } else {
            1.0
        };

        Self {
            availability,
            quality,
            performance: PERFORMANCE_FACTOR,
            oee: availability * quality * PERFORMANCE_FACTOR * 100.0,
        }
    }
}

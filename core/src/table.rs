//! Plain-text tables for prompt context and terminal output.

use crate::store::{AlarmReading, DailyCount, MachineDirectoryEntry, MachineOutput, NamedTotal};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows:    Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn from_totals(label: &str, value: &str, totals: &[NamedTotal]) -> Self {
        let mut table = Self::new([label, value]);
        for t in totals {
            table.push_row(vec![t.name.clone(), t.total.to_string()]);
        }
        table
    }

    pub fn from_daily(counts: &[DailyCount]) -> Self {
        let mut table = Self::new(["Day", "Alarms"]);
        for c in counts {
            table.push_row(vec![c.day.to_string(), c.count.to_string()]);
        }
        table
    }

    pub fn from_machine_output(rows: &[MachineOutput]) -> Self {
        let mut table = Self::new(["Machine", "ProducedKg", "ScrappedKg"]);
        for r in rows {
            table.push_row(vec![
                r.name.clone(),
                r.produced_kg.to_string(),
                r.scrapped_kg.to_string(),
            ]);
        }
        table
    }

    pub fn from_directory(entries: &[MachineDirectoryEntry]) -> Self {
        let mut table = Self::new(["Machine", "Department"]);
        for e in entries {
            table.push_row(vec![e.name.clone(), e.department.clone()]);
        }
        table
    }

    pub fn from_readings(readings: &[AlarmReading]) -> Self {
        let mut table = Self::new(["StartTime", "Description", "SensorType", "Value"]);
        for r in readings {
            table.push_row(vec![
                r.start_time.to_string(),
                r.description.clone(),
                r.sensor_type.clone(),
                format!("{:.2}", r.value),
            ]);
        }
        table
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{c:<width$}", width = widths[i]))
                .collect();
            writeln!(f, "{}", padded.join("  ").trim_end())
        };
        line(f, &self.headers)?;
        for row in &self.rows {
            line(f, row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_aligned() {
        let table = Table::from_totals(
            "Description",
            "Count",
            &[
                NamedTotal { name: "General machine fault".into(), total: 12 },
                NamedTotal { name: "A".into(), total: 3 },
            ],
        );
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Description            Count");
        assert_eq!(lines[2], "A                      3");
    }

    #[test]
    fn empty_table_renders_header_only() {
        let table = Table::new(["Machine", "Department"]);
        assert!(table.is_empty());
        assert_eq!(table.to_string(), "Machine  Department\n");
    }
}

use crate::{
    catalog::Catalog,
    error::{FabError, FabResult},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

// ── Store connection ───────────────────────────────────────────────

/// Connection parameters, passed explicitly to `FactoryStore::connect`.
///
/// The store is SQLite: `server` is the directory holding the database
/// file and `database_name` its stem. `server == ":memory:"` opens a
/// private in-memory database.
#[derive(Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub server:        String,
    pub user:          String,
    pub password:      String,
    pub database_name: String,
}

impl DbConfig {
    pub const IN_MEMORY: &'static str = ":memory:";

    pub fn in_memory() -> Self {
        Self {
            server: Self::IN_MEMORY.into(),
            ..Self::default()
        }
    }

    /// Read `DB_SERVER`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, falling back to
    /// the defaults. Only the binary calls this; the library never reads env.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, fallback: String| std::env::var(key).unwrap_or(fallback);
        Self {
            server:        var("DB_SERVER", defaults.server),
            user:          var("DB_USER", defaults.user),
            password:      var("DB_PASSWORD", defaults.password),
            database_name: var("DB_NAME", defaults.database_name),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.server == Self::IN_MEMORY
    }

    /// Path handed to SQLite.
    pub fn target(&self) -> String {
        if self.is_in_memory() {
            Self::IN_MEMORY.to_string()
        } else {
            format!("{}/{}.db", self.server.trim_end_matches('/'), self.database_name)
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            server:        ".".into(),
            user:          "sa".into(),
            password:      String::new(),
            database_name: "CandyDB".into(),
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database_name", &self.database_name)
            .finish()
    }
}

/// Fixed-delay retry for the initial connection. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay:    Duration,
}

impl RetryPolicy {
    pub fn no_delay() -> Self {
        Self {
            delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay:    Duration::from_secs(10),
        }
    }
}

// ── History generation ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit when the walk crosses into a new month, and once at the end.
    Monthly,
    /// Commit after every simulated day.
    Daily,
    /// One transaction for the whole walk.
    Once,
}

/// A run never spills into the next day.
pub const MAX_RUN_HOURS: i64 = 24;
pub const MAX_ALARM_MINUTES: i64 = 24 * 60;
pub const MAX_DUE_OFFSET_DAYS: i64 = 366;
pub const MAX_FUTURE_DAYS: i64 = 3_660;

/// Empirical generation constants. None of these are derived; they only
/// shape the synthetic history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub start_date:                NaiveDate,
    pub future_days:               i64,
    pub order_probability:         f64,
    pub order_amount_kg:           (i64, i64),
    pub due_offset_days:           (i64, i64),
    pub machine_skip_probability:  f64,
    pub run_hours:                 (i64, i64),
    pub scrap_fraction_min:        f64,
    pub scrap_ceiling_ordinary:    f64,
    pub scrap_ceiling_dust:        f64,
    pub alarm_base_probability:    f64,
    pub alarm_per_difficulty:      f64,
    pub alarm_minutes:             (i64, i64),
    pub vibration_range:           (f64, f64),
    pub reseed_threshold:          i64,
    pub commit_policy:             CommitPolicy,
}

impl SimulationParams {
    /// `0.10 + 0.05 × difficulty` with the defaults: 0.15 ..= 0.35.
    pub fn alarm_probability(&self, difficulty: u8) -> f64 {
        self.alarm_base_probability + self.alarm_per_difficulty * f64::from(difficulty)
    }

    pub fn validate(&self) -> FabResult<()> {
        let probability = |name: &str, p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(FabError::Config(format!("{name} = {p} is not a probability")))
            }
        };
        let ordered = |name: &str, (lo, hi): (i64, i64)| {
            if lo <= hi {
                Ok(())
            } else {
                Err(FabError::Config(format!("{name}: {lo} > {hi}")))
            }
        };
        probability("order_probability", self.order_probability)?;
        probability("machine_skip_probability", self.machine_skip_probability)?;
        probability("alarm_probability(5)", self.alarm_probability(5))?;
        ordered("order_amount_kg", self.order_amount_kg)?;
        ordered("due_offset_days", self.due_offset_days)?;
        ordered("run_hours", self.run_hours)?;
        ordered("alarm_minutes", self.alarm_minutes)?;
        let within = |name: &str, (lo, hi): (i64, i64), min: i64, max: i64| {
            if lo >= min && hi <= max {
                Ok(())
            } else {
                Err(FabError::Config(format!(
                    "{name}: {lo}..={hi} must lie within {min}..={max}"
                )))
            }
        };
        within("run_hours", self.run_hours, 1, MAX_RUN_HOURS)?;
        within("due_offset_days", self.due_offset_days, 0, MAX_DUE_OFFSET_DAYS)?;
        within("alarm_minutes", self.alarm_minutes, 0, MAX_ALARM_MINUTES)?;
        within("future_days", (self.future_days, self.future_days), 0, MAX_FUTURE_DAYS)?;

        let min = self.scrap_fraction_min;
        for (name, ceiling) in [
            ("scrap_ceiling_ordinary", self.scrap_ceiling_ordinary),
            ("scrap_ceiling_dust", self.scrap_ceiling_dust),
        ] {
            if !(0.0 <= min && min <= ceiling && ceiling <= 1.0) {
                return Err(FabError::Config(format!(
                    "{name}: scrap fractions must satisfy 0 <= {min} <= {ceiling} <= 1"
                )));
            }
        }
        if self.vibration_range.0 > self.vibration_range.1 {
            return Err(FabError::Config("vibration_range is inverted".into()));
        }
        Ok(())
    }

    /// Upper (exclusive) bound of the scrap fraction.
    pub fn scrap_ceiling(&self, dust_prone: bool) -> f64 {
        if dust_prone {
            self.scrap_ceiling_dust
        } else {
            self.scrap_ceiling_ordinary
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            start_date:               NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            future_days:              30,
            order_probability:        0.4,
            order_amount_kg:          (1_000, 20_000),
            due_offset_days:          (5, 14),
            machine_skip_probability: 0.2,
            run_hours:                (4, 16),
            scrap_fraction_min:       0.01,
            scrap_ceiling_ordinary:   0.02,
            scrap_ceiling_dust:       0.15,
            alarm_base_probability:   0.10,
            alarm_per_difficulty:     0.05,
            alarm_minutes:            (10, 120),
            vibration_range:          (5.0, 15.0),
            reseed_threshold:         50,
            commit_policy:            CommitPolicy::Monthly,
        }
    }
}

// ── Text generation ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint:     String,
    pub model:        String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint:     "http://127.0.0.1:11434/api/generate".into(),
            model:        "llama3".into(),
            timeout_secs: 120,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub catalog:    Catalog,
    pub simulation: SimulationParams,
    pub assistant:  AssistantConfig,
}

impl FactoryConfig {
    /// Built-in catalog and constants.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Load from a JSON file. Missing sections fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: FactoryConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.catalog.validate()?;
        config.simulation.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_probability_spans_difficulty_scale() {
        let p = SimulationParams::default();
        assert!((p.alarm_probability(1) - 0.15).abs() < 1e-12);
        assert!((p.alarm_probability(5) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn default_params_validate_and_bad_ones_do_not() {
        SimulationParams::default().validate().unwrap();
        let bad = SimulationParams {
            run_hours: (0, 16),
            ..SimulationParams::default()
        };
        assert!(bad.validate().is_err());
        let inverted = SimulationParams {
            due_offset_days: (14, 5),
            ..SimulationParams::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn each_scrap_ceiling_is_capped_at_one() {
        let dust = SimulationParams {
            scrap_ceiling_dust: 3.0,
            ..SimulationParams::default()
        };
        assert!(matches!(dust.validate(), Err(FabError::Config(_))));
        let ordinary = SimulationParams {
            scrap_ceiling_ordinary: 1.5,
            ..SimulationParams::default()
        };
        assert!(ordinary.validate().is_err());
        let below_min = SimulationParams {
            scrap_ceiling_dust: 0.005,
            ..SimulationParams::default()
        };
        assert!(below_min.validate().is_err());
    }

    #[test]
    fn oversized_horizons_are_rejected() {
        let far = SimulationParams {
            future_days: 1_000_000_000_000_000_000,
            ..SimulationParams::default()
        };
        assert!(matches!(far.validate(), Err(FabError::Config(_))));
        let long_due = SimulationParams {
            due_offset_days: (5, i64::MAX),
            ..SimulationParams::default()
        };
        assert!(long_due.validate().is_err());
        let long_run = SimulationParams {
            run_hours: (4, 25),
            ..SimulationParams::default()
        };
        assert!(long_run.validate().is_err());
        let edge = SimulationParams {
            future_days: MAX_FUTURE_DAYS,
            run_hours: (1, MAX_RUN_HOURS),
            ..SimulationParams::default()
        };
        edge.validate().unwrap();
    }

    #[test]
    fn file_target_joins_server_and_name() {
        let cfg = DbConfig {
            server: "/var/lib/candy/".into(),
            ..DbConfig::default()
        };
        assert_eq!(cfg.target(), "/var/lib/candy/CandyDB.db");
        assert_eq!(DbConfig::in_memory().target(), ":memory:");
    }

    #[test]
    fn debug_never_prints_password() {
        let cfg = DbConfig {
            password: "CandyFactory2025!".into(),
            ..DbConfig::default()
        };
        assert!(!format!("{cfg:?}").contains("CandyFactory2025!"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FactoryConfig =
            serde_json::from_str(r#"{"simulation":{"future_days":7}}"#).unwrap();
        assert_eq!(cfg.simulation.future_days, 7);
        assert_eq!(cfg.simulation.reseed_threshold, 50);
        assert_eq!(cfg.catalog, Catalog::standard());
    }
}

use std::env;
use std::time::Duration;

/// Scheduling settings for `lumenrank worker`, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    pub interval_secs: u64,
    pub run_on_start: bool,
    pub timeout_secs: u64,
    pub formula_version: String,
    pub initiated_by: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
            run_on_start: true,
            timeout_secs: 120,
            formula_version: lumenrank_core::model::DEFAULT_FORMULA_VERSION.to_string(),
            initiated_by: "worker".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("WORKER_INTERVAL_SEC") {
            if let Ok(n) = v.trim().parse::<u64>() {
                if n > 0 {
                    cfg.interval_secs = n;
                }
            }
        }
        if let Some(v) = lookup("WORKER_RUN_ON_START") {
            if let Some(b) = parse_bool(&v) {
                cfg.run_on_start = b;
            }
        }
        if let Some(v) = lookup("SCOREJOB_TIMEOUT_SEC") {
            if let Ok(n) = v.trim().parse() {
                cfg.timeout_secs = n;
            }
        }
        if let Some(v) = lookup("SCORING_FORMULA_VERSION") {
            if !v.trim().is_empty() {
                cfg.formula_version = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("SCORING_INITIATED_BY") {
            if !v.trim().is_empty() {
                cfg.initiated_by = v.trim().to_string();
            }
        }
        cfg
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Normalization bound tables, keyed by formula version and metric.

use super::normalize;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MaxLumens,
    MaxCandela,
    #[serde(rename = "beam_distance_m")]
    BeamDistance,
    #[serde(rename = "runtime_high_min")]
    RuntimeHigh,
    #[serde(rename = "runtime_medium_min")]
    RuntimeMedium,
    #[serde(rename = "price_usd")]
    Price,
    Durability,
}

impl Metric {
    /// Metrics that take their score from a bound table.
    pub const BOUNDED: [Metric; 6] = [
        Metric::MaxLumens,
        Metric::MaxCandela,
        Metric::BeamDistance,
        Metric::RuntimeHigh,
        Metric::RuntimeMedium,
        Metric::Price,
    ];

    /// Key used in the `raw` section of a breakdown.
    pub fn raw_key(&self) -> &'static str {
        match self {
            Metric::MaxLumens => "max_lumens",
            Metric::MaxCandela => "max_candela",
            Metric::BeamDistance => "beam_distance_m",
            Metric::RuntimeHigh => "runtime_high_min",
            Metric::RuntimeMedium => "runtime_medium_min",
            Metric::Price => "price_usd",
            Metric::Durability => "durability",
        }
    }

    /// Key used in the `normalized` and `weighted` sections; price drops its unit suffix there.
    pub fn score_key(&self) -> &'static str {
        match self {
            Metric::Price => "price",
            other => other.raw_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormKind {
    HigherLog,
    HigherLinear,
    LowerLinear,
}

/// For [`NormKind::LowerLinear`] `floor` is the best value and `cap` the worst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub kind: NormKind,
    pub floor: f64,
    pub cap: f64,
}

impl MetricBounds {
    pub const fn new(kind: NormKind, floor: f64, cap: f64) -> Self {
        Self { kind, floor, cap }
    }

    pub fn normalize(&self, v: f64) -> f64 {
        match self.kind {
            NormKind::HigherLog => normalize::higher_log(v, self.floor, self.cap),
            NormKind::HigherLinear => normalize::higher_linear(v, self.floor, self.cap),
            NormKind::LowerLinear => normalize::lower_linear(v, self.floor, self.cap),
        }
    }

    fn validate(&self, metric: Metric) -> Result<(), ConfigError> {
        if !self.floor.is_finite() || !self.cap.is_finite() {
            return Err(ConfigError(format!(
                "bounds for {} must be finite",
                metric.raw_key()
            )));
        }
        if self.cap <= self.floor {
            return Err(ConfigError(format!(
                "bounds for {}: cap ({}) must exceed floor ({})",
                metric.raw_key(),
                self.cap,
                self.floor
            )));
        }
        if self.kind != NormKind::LowerLinear && self.floor <= 0.0 {
            return Err(ConfigError(format!(
                "bounds for {}: floor must be positive, got {}",
                metric.raw_key(),
                self.floor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormulaSet {
    pub bounds: BTreeMap<Metric, MetricBounds>,
}

impl FormulaSet {
    /// The `v1` bound table.
    pub fn v1() -> Self {
        let bounds = [
            (Metric::MaxLumens, MetricBounds::new(NormKind::HigherLog, 100.0, 5000.0)),
            (Metric::MaxCandela, MetricBounds::new(NormKind::HigherLog, 1000.0, 120000.0)),
            (Metric::BeamDistance, MetricBounds::new(NormKind::HigherLog, 60.0, 700.0)),
            (Metric::RuntimeHigh, MetricBounds::new(NormKind::HigherLog, 20.0, 300.0)),
            (Metric::RuntimeMedium, MetricBounds::new(NormKind::HigherLog, 60.0, 900.0)),
            (Metric::Price, MetricBounds::new(NormKind::LowerLinear, 20.0, 300.0)),
        ];
        Self {
            bounds: bounds.into_iter().collect(),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricBounds> {
        self.bounds.get(&metric)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bounds.contains_key(&Metric::Durability) {
            return Err(ConfigError(
                "durability is a composite metric and takes no bounds".into(),
            ));
        }
        for metric in Metric::BOUNDED {
            match self.bounds.get(&metric) {
                Some(b) => b.validate(metric)?,
                None => {
                    return Err(ConfigError(format!(
                        "missing bounds for metric {}",
                        metric.raw_key()
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Bound sets by formula version, with a default used for unknown versions.
#[derive(Debug, Clone)]
pub struct FormulaRegistry {
    default_version: String,
    fallback: FormulaSet,
    sets: BTreeMap<String, FormulaSet>,
}

impl Default for FormulaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormulaRegistry {
    pub fn builtin() -> Self {
        let default_version = crate::model::DEFAULT_FORMULA_VERSION.to_string();
        let mut sets = BTreeMap::new();
        sets.insert(default_version.clone(), FormulaSet::v1());
        Self {
            default_version,
            fallback: FormulaSet::v1(),
            sets,
        }
    }

    pub fn default_version(&self) -> &str {
        &self.default_version
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn get(&self, version: &str) -> Option<&FormulaSet> {
        self.sets.get(version)
    }

    pub fn insert(&mut self, version: &str, set: FormulaSet) -> Result<(), ConfigError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(ConfigError("formula version must not be blank".into()));
        }
        set.validate()
            .map_err(|e| ConfigError(format!("formula {}: {}", version, e.0)))?;
        if version == self.default_version {
            self.fallback = set.clone();
        }
        self.sets.insert(version.to_string(), set);
        Ok(())
    }

    /// Returns the set for `version`, or the default set when the version is unknown.
    pub fn resolve(&self, version: &str) -> &FormulaSet {
        match self.sets.get(version) {
            Some(set) => set,
            None => {
                tracing::warn!(
                    event = "formula.fallback",
                    requested = %version,
                    fallback = %self.default_version,
                    "unknown formula version, using default bounds"
                );
                &self.fallback
            }
        }
    }
}

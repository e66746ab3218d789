//! Ordered weighted-mean stages. A stage may consume earlier stages as inputs.

use super::formula::Metric;
use crate::model::ProfileSlug;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageId {
    Throw,
    Flood,
    Tactical,
    Edc,
    Performance,
    Value,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Throw => "throw",
            StageId::Flood => "flood",
            StageId::Tactical => "tactical",
            StageId::Edc => "edc",
            StageId::Performance => "performance",
            StageId::Value => "value",
        }
    }

    /// The persisted profile this stage produces; `None` for intermediates.
    pub fn profile(&self) -> Option<ProfileSlug> {
        match self {
            StageId::Throw => Some(ProfileSlug::Throw),
            StageId::Flood => Some(ProfileSlug::Flood),
            StageId::Tactical => Some(ProfileSlug::Tactical),
            StageId::Edc => Some(ProfileSlug::Edc),
            StageId::Value => Some(ProfileSlug::Value),
            StageId::Performance => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Metric(Metric),
    Stage(StageId),
}

impl Input {
    pub fn key(&self) -> &'static str {
        match self {
            Input::Metric(m) => m.score_key(),
            Input::Stage(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: StageId,
    pub terms: Vec<(Input, f64)>,
}

impl Stage {
    fn new(id: StageId, terms: &[(Input, f64)]) -> Self {
        Self {
            id,
            terms: terms.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn v1() -> Self {
        use Input::{Metric as M, Stage as S};
        Self {
            stages: vec![
                Stage::new(
                    StageId::Throw,
                    &[
                        (M(Metric::MaxCandela), 0.45),
                        (M(Metric::BeamDistance), 0.30),
                        (M(Metric::RuntimeHigh), 0.15),
                        (M(Metric::Durability), 0.10),
                    ],
                ),
                Stage::new(
                    StageId::Flood,
                    &[
                        (M(Metric::MaxLumens), 0.50),
                        (M(Metric::RuntimeMedium), 0.25),
                        (M(Metric::Price), 0.15),
                        (M(Metric::Durability), 0.10),
                    ],
                ),
                Stage::new(
                    StageId::Tactical,
                    &[
                        (M(Metric::MaxCandela), 0.30),
                        (M(Metric::RuntimeHigh), 0.20),
                        (M(Metric::Durability), 0.20),
                        (S(StageId::Throw), 0.20),
                        (M(Metric::Price), 0.10),
                    ],
                ),
                Stage::new(
                    StageId::Edc,
                    &[
                        (M(Metric::RuntimeMedium), 0.30),
                        (S(StageId::Flood), 0.20),
                        (M(Metric::Durability), 0.15),
                        (M(Metric::MaxLumens), 0.15),
                        (M(Metric::Price), 0.20),
                    ],
                ),
                Stage::new(
                    StageId::Performance,
                    &[
                        (M(Metric::MaxLumens), 0.35),
                        (M(Metric::MaxCandela), 0.25),
                        (M(Metric::RuntimeHigh), 0.20),
                        (M(Metric::Durability), 0.20),
                    ],
                ),
                Stage::new(
                    StageId::Value,
                    &[(S(StageId::Performance), 0.60), (M(Metric::Price), 0.40)],
                ),
            ],
        }
    }

    /// Builds a pipeline from explicit stages, rejecting any ordering violation.
    pub fn from_stages(stages: Vec<Stage>) -> anyhow::Result<Self> {
        let p = Self { stages };
        p.validate()?;
        Ok(p)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Every stage input must be a stage evaluated earlier; ids are unique.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for stage in &self.stages {
            for (input, _) in &stage.terms {
                if let Input::Stage(dep) = input {
                    if !seen.contains(dep) {
                        anyhow::bail!(
                            "stage {} depends on {} which is not evaluated before it",
                            stage.id.as_str(),
                            dep.as_str()
                        );
                    }
                }
            }
            if !seen.insert(stage.id) {
                anyhow::bail!("stage {} is declared twice", stage.id.as_str());
            }
        }
        Ok(())
    }
}

/// Weighted mean over terms with positive value and weight; 0 when nothing qualifies.
///
/// Included contributions (value × weight, 3 decimals) are recorded in `contributions`.
pub fn weighted_mean(
    terms: impl IntoIterator<Item = (&'static str, f64, f64)>,
    contributions: &mut BTreeMap<String, f64>,
) -> f64 {
    let mut total = 0.0;
    let mut total_weight = 0.0;
    for (name, value, weight) in terms {
        if value <= 0.0 || weight <= 0.0 {
            continue;
        }
        total += value * weight;
        total_weight += weight;
        contributions.insert(name.to_string(), round3(value * weight));
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    total / total_weight
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

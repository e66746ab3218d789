use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FORMULA_VERSION: &str = "v1";
pub const DEFAULT_INITIATED_BY: &str = "scorejob";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default)]
    pub run_label: String,
    #[serde(default)]
    pub formula_version: String,
    #[serde(default)]
    pub initiated_by: String,
}

impl RunOptions {
    /// Fills blank or whitespace-only fields with their defaults.
    pub fn with_defaults(mut self, now: DateTime<Utc>) -> Self {
        if self.run_label.trim().is_empty() {
            self.run_label = format!("batch-{}", now.format("%Y%m%d-%H%M%S"));
        }
        if self.formula_version.trim().is_empty() {
            self.formula_version = DEFAULT_FORMULA_VERSION.to_string();
        }
        if self.initiated_by.trim().is_empty() {
            self.initiated_by = DEFAULT_INITIATED_BY.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// The closed set of scoring profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSlug {
    Tactical,
    Edc,
    Value,
    Throw,
    Flood,
}

impl ProfileSlug {
    pub const ALL: [ProfileSlug; 5] = [
        ProfileSlug::Tactical,
        ProfileSlug::Edc,
        ProfileSlug::Value,
        ProfileSlug::Throw,
        ProfileSlug::Flood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSlug::Tactical => "tactical",
            ProfileSlug::Edc => "edc",
            ProfileSlug::Value => "value",
            ProfileSlug::Throw => "throw",
            ProfileSlug::Flood => "flood",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn display_name(&self) -> String {
        let title = match self {
            ProfileSlug::Edc => "EDC",
            ProfileSlug::Tactical => "Tactical",
            ProfileSlug::Value => "Value",
            ProfileSlug::Throw => "Throw",
            ProfileSlug::Flood => "Flood",
        };
        format!("{} Score", title)
    }
}

impl std::fmt::Display for ProfileSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of one active catalog item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRow {
    pub flashlight_id: i64,
    pub max_lumens: Option<f64>,
    pub max_candela: Option<f64>,
    pub beam_distance_m: Option<f64>,
    pub runtime_medium_min: Option<f64>,
    pub runtime_high_min: Option<f64>,
    pub waterproof_rating: Option<String>,
    pub impact_resistance_m: Option<f64>,
    pub price_usd: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutput {
    pub tactical: f64,
    pub edc: f64,
    pub value: f64,
    pub throw: f64,
    pub flood: f64,
}

impl ScoreOutput {
    pub fn get(&self, slug: ProfileSlug) -> f64 {
        match slug {
            ProfileSlug::Tactical => self.tactical,
            ProfileSlug::Edc => self.edc,
            ProfileSlug::Value => self.value,
            ProfileSlug::Throw => self.throw,
            ProfileSlug::Flood => self.flood,
        }
    }

    pub(crate) fn set(&mut self, slug: ProfileSlug, score: f64) {
        match slug {
            ProfileSlug::Tactical => self.tactical = score,
            ProfileSlug::Edc => self.edc = score,
            ProfileSlug::Value => self.value = score,
            ProfileSlug::Throw => self.throw = score,
            ProfileSlug::Flood => self.flood = score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRow {
    pub id: i64,
    pub run_label: String,
    pub formula_version: String,
    pub status: RunStatus,
    pub initiated_by: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScore {
    pub rank: i64,
    pub score: f64,
    pub profile: ProfileSlug,
    pub flashlight_id: i64,
    pub name: String,
}

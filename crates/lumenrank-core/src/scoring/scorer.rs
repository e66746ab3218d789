use super::formula::{FormulaSet, Metric};
use super::normalize;
use super::pipeline::{round3, weighted_mean, Input, Pipeline, StageId};
use crate::model::{ScoreOutput, SpecRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WATERPROOF_WEIGHT: f64 = 0.65;
const IMPACT_WEIGHT: f64 = 0.35;
const IMPACT_FLOOR_M: f64 = 1.0;
const IMPACT_CAP_M: f64 = 3.0;

/// Audit record persisted next to every score. Not used for re-scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub raw: BTreeMap<String, f64>,
    pub normalized: BTreeMap<String, f64>,
    pub weighted: BTreeMap<String, BTreeMap<String, f64>>,
    pub formula_version: String,
}

impl Breakdown {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub scores: ScoreOutput,
    pub breakdown: Breakdown,
}

pub struct Scorer<'a> {
    formula: &'a FormulaSet,
    pipeline: Pipeline,
}

impl<'a> Scorer<'a> {
    pub fn new(formula: &'a FormulaSet) -> anyhow::Result<Self> {
        Self::with_pipeline(formula, Pipeline::v1())
    }

    pub fn with_pipeline(formula: &'a FormulaSet, pipeline: Pipeline) -> anyhow::Result<Self> {
        pipeline.validate()?;
        formula.validate()?;
        Ok(Self { formula, pipeline })
    }

    pub fn compute_scores(&self, row: &SpecRow, formula_version: &str) -> ScoreCard {
        let mut breakdown = Breakdown {
            formula_version: formula_version.to_string(),
            ..Default::default()
        };

        let mut normalized: BTreeMap<Metric, f64> = BTreeMap::new();
        for metric in Metric::BOUNDED {
            let Some(v) = raw_value(row, metric).filter(|v| v.is_finite() && *v > 0.0) else {
                continue;
            };
            let Some(bounds) = self.formula.get(metric) else {
                continue;
            };
            let n = bounds.normalize(v);
            breakdown.raw.insert(metric.raw_key().to_string(), v);
            breakdown.normalized.insert(metric.score_key().to_string(), n);
            normalized.insert(metric, n);
        }

        let durability = durability_score(
            row.waterproof_rating.as_deref(),
            row.impact_resistance_m.unwrap_or(0.0),
        );
        let key = Metric::Durability.raw_key().to_string();
        breakdown.raw.insert(key.clone(), durability);
        breakdown.normalized.insert(key, durability);
        normalized.insert(Metric::Durability, durability);

        let mut stage_scores: BTreeMap<StageId, f64> = BTreeMap::new();
        let mut scores = ScoreOutput::default();
        for stage in self.pipeline.stages() {
            let terms = stage.terms.iter().map(|(input, weight)| {
                let value = match input {
                    Input::Metric(m) => normalized.get(m).copied().unwrap_or(0.0),
                    Input::Stage(s) => stage_scores.get(s).copied().unwrap_or(0.0),
                };
                (input.key(), value, *weight)
            });
            let mut contributions = BTreeMap::new();
            let score = weighted_mean(terms, &mut contributions);
            if !contributions.is_empty() {
                breakdown
                    .weighted
                    .insert(stage.id.as_str().to_string(), contributions);
            }
            stage_scores.insert(stage.id, score);
            if let Some(slug) = stage.id.profile() {
                scores.set(slug, round3(score));
            }
        }

        ScoreCard { scores, breakdown }
    }
}

fn raw_value(row: &SpecRow, metric: Metric) -> Option<f64> {
    match metric {
        Metric::MaxLumens => row.max_lumens,
        Metric::MaxCandela => row.max_candela,
        Metric::BeamDistance => row.beam_distance_m,
        Metric::RuntimeHigh => row.runtime_high_min,
        Metric::RuntimeMedium => row.runtime_medium_min,
        Metric::Price => row.price_usd,
        Metric::Durability => None,
    }
}

/// Ingress-protection tier; unrecognized or missing ratings score 30.
pub fn waterproof_tier(rating: Option<&str>) -> f64 {
    let rating = rating.map(|r| r.trim().to_ascii_uppercase()).unwrap_or_default();
    match rating.as_str() {
        "IPX4" | "IP54" | "IP64" => 55.0,
        "IPX6" | "IP66" => 70.0,
        "IPX7" | "IP67" => 85.0,
        "IPX8" | "IP68" => 95.0,
        _ => 30.0,
    }
}

pub fn durability_score(waterproof: Option<&str>, impact_m: f64) -> f64 {
    let impact = if impact_m > 0.0 {
        normalize::higher_linear(impact_m, IMPACT_FLOOR_M, IMPACT_CAP_M)
    } else {
        0.0
    };
    waterproof_tier(waterproof) * WATERPROOF_WEIGHT + impact * IMPACT_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileSlug;

    fn reference_row() -> SpecRow {
        SpecRow {
            flashlight_id: 1,
            max_lumens: Some(1800.0),
            max_candela: Some(45000.0),
            beam_distance_m: Some(420.0),
            runtime_medium_min: Some(240.0),
            runtime_high_min: Some(95.0),
            waterproof_rating: Some("IP68".into()),
            impact_resistance_m: Some(1.5),
            price_usd: Some(89.99),
        }
    }

    #[test]
    fn reference_item_scores_in_range() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let card = scorer.compute_scores(&reference_row(), "v1");

        for slug in ProfileSlug::ALL {
            let s = card.scores.get(slug);
            assert!(s > 0.0 && s <= 100.0, "{slug} = {s}");
        }
        assert_eq!(card.breakdown.formula_version, "v1");
    }

    #[test]
    fn scores_are_rounded_to_three_decimals() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let card = scorer.compute_scores(&reference_row(), "v1");
        for slug in ProfileSlug::ALL {
            let s = card.scores.get(slug);
            assert_eq!(s, round3(s));
        }
    }

    #[test]
    fn durability_tiers() {
        assert_eq!(waterproof_tier(Some("ipx8")), 95.0);
        assert_eq!(waterproof_tier(Some(" IP67 ")), 85.0);
        assert_eq!(waterproof_tier(Some("IP66")), 70.0);
        assert_eq!(waterproof_tier(Some("IP54")), 55.0);
        assert_eq!(waterproof_tier(Some("splashproof")), 30.0);
        assert_eq!(waterproof_tier(None), 30.0);

        // IP68 with 1.5 m drop: 95*0.65 + 25*0.35
        assert!((durability_score(Some("IP68"), 1.5) - 70.5).abs() < 1e-9);
        assert!((durability_score(None, 0.0) - 19.5).abs() < 1e-9);
        assert!((durability_score(Some("IPX8"), 5.0) - 96.75).abs() < 1e-9);
    }

    #[test]
    fn throw_matches_hand_computed_value() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let row = reference_row();
        let card = scorer.compute_scores(&row, "v1");

        let candela = normalize::higher_log(45000.0, 1000.0, 120000.0);
        let beam = normalize::higher_log(420.0, 60.0, 700.0);
        let high = normalize::higher_log(95.0, 20.0, 300.0);
        let dur = durability_score(Some("IP68"), 1.5);
        let expected = 0.45 * candela + 0.30 * beam + 0.15 * high + 0.10 * dur;
        assert!((card.scores.throw - round3(expected)).abs() < 1e-9);
    }

    #[test]
    fn missing_metrics_shrink_the_denominator() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let row = SpecRow {
            flashlight_id: 7,
            max_candela: Some(120000.0),
            waterproof_rating: Some("IPX8".into()),
            impact_resistance_m: Some(3.0),
            ..Default::default()
        };
        let card = scorer.compute_scores(&row, "v1");

        // only candela (100) and durability (96.75) qualify: (0.45*100 + 0.10*96.75) / 0.55
        assert!((card.scores.throw - 99.409).abs() < 1e-9, "{}", card.scores.throw);
        let throw = &card.breakdown.weighted["throw"];
        assert_eq!(throw.len(), 2);
        assert!(!throw.contains_key("beam_distance_m"));
    }

    #[test]
    fn normalized_map_tracks_positive_raw_values() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let row = SpecRow {
            flashlight_id: 3,
            max_lumens: Some(1000.0),
            max_candela: Some(0.0),
            beam_distance_m: None,
            runtime_high_min: Some(-4.0),
            price_usd: Some(45.0),
            ..Default::default()
        };
        let card = scorer.compute_scores(&row, "v1");
        let n = &card.breakdown.normalized;

        assert!(n.contains_key("max_lumens"));
        assert!(n.contains_key("price"));
        assert!(n.contains_key("durability"));
        assert!(!n.contains_key("max_candela"));
        assert!(!n.contains_key("beam_distance_m"));
        assert!(!n.contains_key("runtime_high_min"));
        assert!(!n.contains_key("runtime_medium_min"));
        assert_eq!(card.breakdown.raw["price_usd"], 45.0);
    }

    #[test]
    fn derived_stages_feed_dependent_profiles() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let card = scorer.compute_scores(&reference_row(), "v1");
        let w = &card.breakdown.weighted;

        assert!(w["tactical"].contains_key("throw"));
        assert!(w["edc"].contains_key("flood"));
        assert!(w["value"].contains_key("performance"));
        assert!(w.contains_key("performance"));
    }

    #[test]
    fn breakdown_serializes_with_expected_sections() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let card = scorer.compute_scores(&reference_row(), "v7");
        let json: serde_json::Value =
            serde_json::from_str(&card.breakdown.to_json().unwrap()).unwrap();

        for key in ["raw", "normalized", "weighted"] {
            assert!(json[key].is_object(), "missing {key}");
        }
        assert_eq!(json["formula_version"], "v7");
    }

    #[test]
    fn empty_row_only_has_durability_signal() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let card = scorer.compute_scores(&SpecRow::default(), "v1");

        // durability alone carries every stage that references it
        assert_eq!(card.scores.throw, 19.5);
        assert_eq!(card.scores.flood, 19.5);
        assert_eq!(card.scores.tactical, 19.5);
        assert_eq!(card.scores.edc, 19.5);
        assert_eq!(card.scores.value, 19.5);
    }

    #[test]
    fn non_finite_values_are_treated_as_missing() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();
        let row = SpecRow {
            max_lumens: Some(f64::INFINITY),
            max_candela: Some(f64::NAN),
            impact_resistance_m: Some(f64::INFINITY),
            ..reference_row()
        };
        let card = scorer.compute_scores(&row, "v1");

        assert!(!card.breakdown.raw.contains_key("max_lumens"));
        assert!(!card.breakdown.normalized.contains_key("max_candela"));
        for slug in ProfileSlug::ALL {
            assert!(card.scores.get(slug).is_finite());
        }

        let json = card.breakdown.to_json().unwrap();
        let back: Breakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card.breakdown);
    }

    #[test]
    fn scores_stay_in_range_across_bound_edges() {
        let formula = FormulaSet::v1();
        let scorer = Scorer::new(&formula).unwrap();

        // below floor, at floor, between, at cap, far above cap
        let lumens = [50.0, 100.0, 800.0, 5000.0, 1e6];
        let candela = [10.0, 1000.0, 30000.0, 120000.0, 1e8];
        let beam = [1.0, 60.0, 300.0, 700.0, 1e5];
        let high = [1.0, 20.0, 90.0, 300.0, 1e5];
        let medium = [1.0, 60.0, 240.0, 900.0, 1e5];
        // below best, at best, at worst, above worst
        let prices = [1.0, 20.0, 300.0, 5000.0];
        let ratings = [None, Some("IPX4"), Some("IP66"), Some("IPX7"), Some("IP68"), Some("none")];
        let impacts = [0.0, 2.0, 10.0];

        let mut checked = 0;
        for &max_lumens in &lumens {
            for &max_candela in &candela {
                for &beam_distance_m in &beam {
                    for &runtime_high_min in &high {
                        for &runtime_medium_min in &medium {
                            for &price_usd in &prices {
                                for rating in ratings {
                                    for &impact in &impacts {
                                        let row = SpecRow {
                                            flashlight_id: 1,
                                            max_lumens: Some(max_lumens),
                                            max_candela: Some(max_candela),
                                            beam_distance_m: Some(beam_distance_m),
                                            runtime_high_min: Some(runtime_high_min),
                                            runtime_medium_min: Some(runtime_medium_min),
                                            waterproof_rating: rating.map(str::to_string),
                                            impact_resistance_m: Some(impact),
                                            price_usd: Some(price_usd),
                                        };
                                        let card = scorer.compute_scores(&row, "v1");
                                        for slug in ProfileSlug::ALL {
                                            let s = card.scores.get(slug);
                                            assert!(
                                                (0.0..=100.0).contains(&s),
                                                "{slug} = {s} for {row:?}"
                                            );
                                            assert_eq!(s, round3(s), "{slug} for {row:?}");
                                        }
                                        checked += 1;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 5 * 5 * 5 * 5 * 5 * 4 * 6 * 3);
    }
}

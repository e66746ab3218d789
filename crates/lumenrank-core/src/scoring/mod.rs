pub mod formula;
pub mod normalize;
pub mod pipeline;
pub mod scorer;

pub use formula::{FormulaRegistry, FormulaSet, Metric, MetricBounds, NormKind};
pub use pipeline::{Pipeline, StageId};
pub use scorer::{Breakdown, ScoreCard, Scorer};

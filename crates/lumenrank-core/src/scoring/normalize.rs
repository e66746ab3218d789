//! Pure 0..=100 normalizers. Degenerate bounds yield 0 ("no signal"), never an error.

fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Linear "higher is better": 0 at or below `floor`, 100 at or above `cap`.
pub fn higher_linear(v: f64, floor: f64, cap: f64) -> f64 {
    if floor <= 0.0 || cap <= floor {
        return 0.0;
    }
    clamp01((v - floor) / (cap - floor)) * 100.0
}

/// Same as [`higher_linear`] but linear in log space, for metrics spanning orders of magnitude.
pub fn higher_log(v: f64, floor: f64, cap: f64) -> f64 {
    if v <= 0.0 || floor <= 0.0 || cap <= floor {
        return 0.0;
    }
    clamp01((v.ln() - floor.ln()) / (cap.ln() - floor.ln())) * 100.0
}

/// Inverted linear: 100 at `best`, 0 at `worst`.
pub fn lower_linear(v: f64, best: f64, worst: f64) -> f64 {
    if worst <= best {
        return 0.0;
    }
    (1.0 - clamp01((v - best) / (worst - best))) * 100.0
}

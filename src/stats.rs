/// Summary statistics over the numeric cells of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
}

impl Summary {
    /// Reduce `values`, ignoring NaN cells. `None` when nothing numeric remains.
    pub fn of(values: &[f64]) -> Option<Summary> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values.iter().filter(|v| !v.is_nan()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        Some(Summary {
            min,
            mean: sum / count as f64,
            max,
            sum,
            count,
        })
    }

    /// `(suffix, value)` pairs in the order they are written to the whiteboard.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("_min", self.min),
            ("_mean", self.mean),
            ("_max", self.max),
            ("_sum", self.sum),
        ]
    }
}

/// Outcome of one statistics pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsReport {
    pub summarized: usize,
    pub skipped: usize,
}

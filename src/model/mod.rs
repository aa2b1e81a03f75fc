use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub t60: f64,
    pub identifier: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    pub records: Vec<ScoreRecord>,
    pub files_read: usize,
    pub files_skipped: usize,
    pub rows_dropped: usize,
    pub duplicate_keys: usize,
}

impl ScoreTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub pearson: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
    pub rmse: f64,
    pub n_pairs: usize,
    pub left_only_keys: usize,
    pub right_only_keys: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeveneRow {
    pub t60: f64,
    pub statistic: f64,
    pub p_value: f64,
}

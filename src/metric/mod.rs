use thiserror::Error;

pub mod basic;
pub mod prep;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("unknown metric: {0} (available: snr, envcorr)")]
    UnknownMetric(String),
    #[error("sample rate mismatch: clean {clean} Hz vs degraded {degraded} Hz")]
    SampleRateMismatch { clean: u32, degraded: u32 },
    #[error("silent signal; peak normalization undefined")]
    SilentSignal,
}

#[derive(Debug, Clone, Copy)]
pub struct PrepPolicy {
    pub normalize: bool,
    pub tile: bool,
}

// Intrusive intelligibility metrics plug in here; the pipeline owns file
// pairing, alignment, and signal prep, the scorer owns the number.
pub trait Scorer: Sync + std::fmt::Debug {
    fn id(&self) -> &'static str;
    fn prep(&self) -> PrepPolicy;
    fn score(&self, clean: &[f32], degraded: &[f32], sample_rate: u32) -> Result<f64, MetricError>;
}

pub fn resolve(name: &str) -> Result<Box<dyn Scorer>, MetricError> {
    match name {
        "snr" => Ok(Box::new(basic::SnrScorer)),
        "envcorr" => Ok(Box::new(basic::EnvCorrScorer)),
        other => Err(MetricError::UnknownMetric(other.to_string())),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/metric/tests.rs"]
mod tests;

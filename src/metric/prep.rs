use crate::metric::MetricError;

// Degraded length is the reference; the clean signal is padded with zeros or
// truncated to match.
pub fn align_to(samples: &[f32], target_len: usize) -> Vec<f32> {
    let mut out = samples.to_vec();
    if out.len() > target_len {
        out.truncate(target_len);
    } else {
        out.resize(target_len, 0.0);
    }
    out
}

pub fn peak_normalize(samples: &[f32]) -> Result<Vec<f32>, MetricError> {
    let peak = samples.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    if peak == 0.0 {
        return Err(MetricError::SilentSignal);
    }
    Ok(samples.iter().map(|v| v / peak).collect())
}

// Duration is measured after alignment, in seconds.
pub fn repeat_count(seconds: f64) -> usize {
    if seconds <= 5.0 { 10 } else { 5 }
}

pub fn tile(samples: &[f32], count: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len() * count);
    for _ in 0..count {
        out.extend_from_slice(samples);
    }
    out
}

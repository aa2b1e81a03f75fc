use crate::metric::{MetricError, PrepPolicy, Scorer};

const POWER_FLOOR: f64 = 1e-10;

// Global SNR of the degraded signal against the clean reference, in dB.
// Pad-only prep, the profile intrusive time-domain metrics expect.
#[derive(Debug)]
pub struct SnrScorer;

impl Scorer for SnrScorer {
    fn id(&self) -> &'static str {
        "snr"
    }

    fn prep(&self) -> PrepPolicy {
        PrepPolicy {
            normalize: false,
            tile: false,
        }
    }

    fn score(&self, clean: &[f32], degraded: &[f32], _sample_rate: u32) -> Result<f64, MetricError> {
        let len = clean.len().min(degraded.len());
        if len == 0 {
            return Ok(0.0);
        }
        let mut signal_power = 0.0f64;
        let mut noise_power = 0.0f64;
        for i in 0..len {
            let r = clean[i] as f64;
            let d = (clean[i] - degraded[i]) as f64;
            signal_power += r * r;
            noise_power += d * d;
        }
        if noise_power > POWER_FLOOR {
            Ok(10.0 * (signal_power / noise_power).log10())
        } else {
            Ok(f64::INFINITY)
        }
    }
}

// Correlation of 20 ms amplitude envelopes. Normalize-and-tile prep, the
// profile loudness-invariant window metrics expect.
#[derive(Debug)]
pub struct EnvCorrScorer;

impl Scorer for EnvCorrScorer {
    fn id(&self) -> &'static str {
        "envcorr"
    }

    fn prep(&self) -> PrepPolicy {
        PrepPolicy {
            normalize: true,
            tile: true,
        }
    }

    fn score(&self, clean: &[f32], degraded: &[f32], sample_rate: u32) -> Result<f64, MetricError> {
        let window = (sample_rate as usize / 50).max(1);
        let env_clean = envelope(clean, window);
        let env_degraded = envelope(degraded, window);
        Ok(correlation(&env_clean, &env_degraded))
    }
}

fn envelope(signal: &[f32], window: usize) -> Vec<f64> {
    signal
        .chunks(window)
        .map(|w| w.iter().map(|x| x.abs() as f64).sum::<f64>() / w.len() as f64)
        .collect()
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let mean_a = a[..len].iter().sum::<f64>() / len as f64;
    let mean_b = b[..len].iter().sum::<f64>() / len as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..len {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a > POWER_FLOOR && var_b > POWER_FLOOR {
        cov / (var_a.sqrt() * var_b.sqrt())
    } else {
        0.0
    }
}

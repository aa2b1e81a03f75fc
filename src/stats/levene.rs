use crate::stats::dist::f_sf;
use crate::stats::{StatError, mean, median};

#[derive(Debug, Clone, Copy)]
pub struct LeveneTest {
    pub statistic: f64,
    pub p_value: f64,
}

// Median-centered Levene (Brown-Forsythe) over k groups.
pub fn levene_median(groups: &[&[f64]]) -> Result<LeveneTest, StatError> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        let a = groups.first().map_or(0, |g| g.len());
        let b = groups.get(1).map_or(0, |g| g.len());
        return Err(StatError::TooFewValues(a, b));
    }

    let n_total: usize = groups.iter().map(|g| g.len()).sum();

    // Absolute deviations from each group's median.
    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let center = median(g);
            g.iter().map(|v| (v - center).abs()).collect()
        })
        .collect();

    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / n_total as f64;

    let mut numerator = 0.0;
    for (z, zbar) in deviations.iter().zip(&group_means) {
        let d = zbar - grand_mean;
        numerator += z.len() as f64 * d * d;
    }
    let mut denominator = 0.0;
    for (z, zbar) in deviations.iter().zip(&group_means) {
        for v in z {
            let d = v - zbar;
            denominator += d * d;
        }
    }
    if denominator == 0.0 {
        return Err(StatError::ZeroSpread);
    }

    let df1 = (k - 1) as f64;
    let df2 = (n_total - k) as f64;
    let statistic = (df2 / df1) * numerator / denominator;
    let p_value = f_sf(statistic, df1, df2);
    Ok(LeveneTest { statistic, p_value })
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/levene.rs"]
mod tests;

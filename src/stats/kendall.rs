use crate::stats::dist::normal_sf;

#[derive(Debug, Clone, Copy)]
pub struct KendallTest {
    pub tau: f64,
    pub p_value: f64,
}

impl KendallTest {
    fn undefined() -> Self {
        KendallTest {
            tau: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

// Kendall's tau-c with the asymptotic tie-corrected normal p-value. The
// class-count correction keeps the statistic meaningful when the two folders
// carry different numbers of distinct score levels.
pub fn kendall_tau_c(x: &[f64], y: &[f64]) -> KendallTest {
    let n = x.len();
    if n < 2 || n != y.len() {
        return KendallTest::undefined();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        match x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => {
                y[a].partial_cmp(&y[b]).unwrap_or(std::cmp::Ordering::Equal)
            }
            other => other,
        }
    });
    let xs: Vec<f64> = order.iter().map(|&i| x[i]).collect();
    let ys: Vec<f64> = order.iter().map(|&i| y[i]).collect();

    let (xtie, x0, x1, distinct_x) = tie_stats(&xs);
    let mut ys_sorted = ys.clone();
    ys_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let (ytie, y0, y1, distinct_y) = tie_stats(&ys_sorted);

    let nf = n as f64;
    let tot = 0.5 * nf * (nf - 1.0);
    if xtie == tot || ytie == tot {
        return KendallTest::undefined();
    }

    let ntie = joint_tie_pairs(&xs, &ys);
    let mut inv_input = ys;
    let mut buf = Vec::with_capacity(n);
    let dis = count_inversions(&mut inv_input, &mut buf) as f64;
    let con_minus_dis = tot - xtie - ytie + ntie - 2.0 * dis;

    let m = distinct_x.min(distinct_y) as f64;
    let tau = (2.0 * con_minus_dis / (nf * nf * (m - 1.0) / m)).clamp(-1.0, 1.0);

    let m_pairs = nf * (nf - 1.0);
    let tie_term = if n > 2 {
        x0 * y0 / (9.0 * m_pairs * (nf - 2.0))
    } else {
        0.0
    };
    let var =
        (m_pairs * (2.0 * nf + 5.0) - x1 - y1) / 18.0 + 2.0 * xtie * ytie / m_pairs + tie_term;
    let p_value = if var > 0.0 {
        let z = con_minus_dis / var.sqrt();
        (2.0 * normal_sf(z.abs())).clamp(0.0, 1.0)
    } else if con_minus_dis == 0.0 {
        1.0
    } else {
        f64::NAN
    };

    KendallTest { tau, p_value }
}

// For each run of t equal values: pairs t(t-1)/2, plus the two higher-order
// tie sums the variance formula needs. Input must be sorted.
fn tie_stats(sorted: &[f64]) -> (f64, f64, f64, usize) {
    let mut pairs = 0.0;
    let mut sum0 = 0.0;
    let mut sum1 = 0.0;
    let mut distinct = 0usize;
    let mut i = 0usize;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        pairs += 0.5 * t * (t - 1.0);
        sum0 += t * (t - 1.0) * (t - 2.0);
        sum1 += t * (t - 1.0) * (2.0 * t + 5.0);
        distinct += 1;
        i = j;
    }
    (pairs, sum0, sum1, distinct)
}

fn joint_tie_pairs(xs: &[f64], ys: &[f64]) -> f64 {
    let mut pairs = 0.0;
    let mut i = 0usize;
    while i < xs.len() {
        let mut j = i + 1;
        while j < xs.len() && xs[j] == xs[i] && ys[j] == ys[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        pairs += 0.5 * t * (t - 1.0);
        i = j;
    }
    pairs
}

// Stable mergesort counting strict descents; equal neighbors are not swaps.
fn count_inversions(values: &mut [f64], buf: &mut Vec<f64>) -> u64 {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let mid = n / 2;
    let mut count = count_inversions(&mut values[..mid], buf);
    count += count_inversions(&mut values[mid..], buf);

    buf.clear();
    {
        let (left, right) = values.split_at(mid);
        let mut i = 0usize;
        let mut j = 0usize;
        while i < left.len() && j < right.len() {
            if left[i] <= right[j] {
                buf.push(left[i]);
                i += 1;
            } else {
                count += (left.len() - i) as u64;
                buf.push(right[j]);
                j += 1;
            }
        }
        buf.extend_from_slice(&left[i..]);
        buf.extend_from_slice(&right[j..]);
    }
    values.copy_from_slice(buf);
    count
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/kendall.rs"]
mod tests;

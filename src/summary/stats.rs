//! Plain descriptive-statistics kernels over already-cleaned values.
//!
//! Missing cells are dropped by the callers; every function here returns
//! `None` when its statistic is undefined or not finite for the input.

use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64).filter(|m| m.is_finite())
}

/// Sample standard deviation (denominator `n - 1`).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt()).filter(|s| s.is_finite())
}

/// Quantile of already sorted values, linear interpolation between the
/// closest ranks at position `p * (n - 1)`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson product-moment correlation of paired observations.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = mean(&xs[..n])?;
    let my = mean(&ys[..n])?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let r = sxy / (sxx * syy).sqrt();
    if sxx == 0.0 || syy == 0.0 || !r.is_finite() {
        return None;
    }
    Some(r.clamp(-1.0, 1.0))
}

/// Cramér's V of paired categorical observations.
///
/// Undefined when either side has fewer than two distinct levels.
pub fn cramers_v(pairs: &[(&str, &str)]) -> Option<f64> {
    let n = pairs.len();
    if n == 0 {
        return None;
    }

    let mut cells: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut rows: BTreeMap<&str, usize> = BTreeMap::new();
    let mut cols: BTreeMap<&str, usize> = BTreeMap::new();
    for &(a, b) in pairs {
        *cells.entry((a, b)).or_default() += 1;
        *rows.entry(a).or_default() += 1;
        *cols.entry(b).or_default() += 1;
    }

    let k = rows.len().min(cols.len());
    if k < 2 {
        return None;
    }

    let total = n as f64;
    let mut chi2 = 0.0;
    for (&a, &row_total) in &rows {
        for (&b, &col_total) in &cols {
            let expected = row_total as f64 * col_total as f64 / total;
            let observed = cells.get(&(a, b)).copied().unwrap_or(0) as f64;
            chi2 += (observed - expected).powi(2) / expected;
        }
    }

    Some((chi2 / (total * (k - 1) as f64)).sqrt().clamp(0.0, 1.0))
}

/// Correlation ratio η of a numeric variable grouped by a categorical one.
pub fn correlation_ratio(pairs: &[(&str, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let grand = pairs.iter().map(|(_, y)| y).sum::<f64>() / pairs.len() as f64;
    if !grand.is_finite() {
        return None;
    }

    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for &(g, y) in pairs {
        let entry = groups.entry(g).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += y;
    }

    let ss_total: f64 = pairs.iter().map(|(_, y)| (y - grand).powi(2)).sum();
    if ss_total == 0.0 {
        return None;
    }
    let ss_between: f64 = groups
        .values()
        .map(|&(count, sum)| {
            let group_mean = sum / count as f64;
            count as f64 * (group_mean - grand).powi(2)
        })
        .sum();

    let eta = (ss_between / ss_total).sqrt();
    eta.is_finite().then(|| eta.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn mean_and_std_of_known_values() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        // population std is 2; sample std is sqrt(32 / 7)
        assert!(close(sample_std(&v).unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn quantiles_interpolate_between_ranks() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&v, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&v, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.75), Some(7.0));
    }

    #[test]
    fn pearson_detects_linear_relations() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        let down: Vec<f64> = x.iter().map(|v| 10.0 - 2.0 * v).collect();
        assert_eq!(pearson(&x, &up), Some(1.0));
        assert_eq!(pearson(&x, &down), Some(-1.0));
        assert_eq!(pearson(&x, &[3.0; 5]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn cramers_v_bounds() {
        let same = [("a", "a"), ("a", "a"), ("b", "b"), ("b", "b")];
        assert_eq!(cramers_v(&same), Some(1.0));

        let independent = [("a", "x"), ("a", "y"), ("b", "x"), ("b", "y")];
        assert_eq!(cramers_v(&independent), Some(0.0));

        let single_level = [("a", "x"), ("a", "y")];
        assert_eq!(cramers_v(&single_level), None);
    }

    #[test]
    fn correlation_ratio_bounds() {
        let separated = [("a", 1.0), ("a", 1.0), ("b", 3.0), ("b", 3.0)];
        assert_eq!(correlation_ratio(&separated), Some(1.0));

        let unrelated = [("a", 1.0), ("a", 3.0), ("b", 1.0), ("b", 3.0)];
        assert_eq!(correlation_ratio(&unrelated), Some(0.0));

        assert_eq!(correlation_ratio(&[("a", 2.0), ("b", 2.0)]), None);
    }

    #[test]
    fn infinite_inputs_give_no_statistic() {
        let v = [1.0, f64::INFINITY, 3.0];
        assert_eq!(mean(&v), None);
        assert_eq!(sample_std(&v), None);
        assert_eq!(pearson(&v, &[1.0, 2.0, 3.0]), None);
        assert_eq!(
            correlation_ratio(&[("a", 1.0), ("a", f64::INFINITY), ("b", 3.0)]),
            None
        );
        // sums that overflow are not finite either
        assert_eq!(mean(&[f64::MAX, f64::MAX]), None);
    }
}

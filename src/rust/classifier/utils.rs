/// Scales `values` to unit L2 norm in place. A zero vector is left as is.
pub(crate) fn l2_normalize(values: &mut [f64]) {
    let norm = values.iter().map(|&x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}

/// Numerically stable `ln(sum(exp(x)))`.
pub(crate) fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|&x| (x - max).exp()).sum::<f64>().ln()
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

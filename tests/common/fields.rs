/// Row-major constant image.
pub fn constant_rows(width: usize, height: usize, value: f64) -> Vec<Vec<f64>> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    vec![vec![value; width]; height]
}

/// Brightness ramp along the columns, from 0.2 to 0.8.
pub fn column_ramp_rows(width: usize, height: usize) -> Vec<Vec<f64>> {
    assert!(width > 1 && height > 0, "ramp needs at least two columns");
    (0..height)
        .map(|_| {
            (0..width)
                .map(|c| 0.2 + 0.6 * c as f64 / (width - 1) as f64)
                .collect()
        })
        .collect()
}

pub fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Standard deviation over mean.
pub fn relative_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    variance(values).sqrt() / mean.abs()
}

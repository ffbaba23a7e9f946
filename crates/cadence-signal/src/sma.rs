//! Simple moving average.

/// Arithmetic mean over each full window of `period` values.
///
/// Output index `i` corresponds to input index `period - 1 + i`; input
/// shorter than the window yields an empty vector.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    assert!(period > 0, "Period must be greater than 0");

    if data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    let period_f64 = period as f64;

    // Initial sum
    let mut sum: f64 = data[..period].iter().sum();
    result.push(sum / period_f64);

    // Sliding window
    for i in period..data.len() {
        sum = sum - data[i - period] + data[i];
        result.push(sum / period_f64);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[1] - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[2] - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(sma(&data, 5).is_empty());
    }

    #[test]
    fn test_sma_exact_window() {
        let data = vec![2.0, 4.0, 6.0];
        let result = sma(&data, 3);
        assert_eq!(result.len(), 1);
        assert!((result[0] - 4.0).abs() < 1e-10);
    }
}

//! Regression metrics
//!
//! Decoding quality is reported as variance accounted for (VAF), the
//! coefficient-of-determination-style metric conventional in neural
//! decoding work.

/// Variance accounted for: 1 - SS_res / SS_tot.
///
/// Equals 1.0 when predictions match targets exactly; unbounded below, and
/// negative when the model predicts worse than the target mean.
pub fn vaf(y_true: &[f32], y_pred: &[f32]) -> f32 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }

    let mean: f32 = y_true.iter().sum::<f32>() / y_true.len() as f32;

    let ss_res: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (p - t).powi(2))
        .sum();
    let ss_tot: f32 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot < f32::EPSILON {
        // Constant target: perfect predictions get 1, anything else 0
        return if ss_res < f32::EPSILON { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}

/// Mean squared error.
pub fn mse(y_true: &[f32], y_pred: &[f32]) -> f32 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }

    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (p - t).powi(2))
        .sum::<f32>()
        / y_true.len() as f32
}

/// Root mean squared error.
pub fn rmse(y_true: &[f32], y_pred: &[f32]) -> f32 {
    mse(y_true, y_pred).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vaf_perfect_prediction() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!((vaf(&y, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vaf_mean_prediction_is_zero() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let mean_pred = [2.5; 4];
        assert!(vaf(&y, &mean_pred).abs() < 1e-6);
    }

    #[test]
    fn test_vaf_can_be_negative() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let bad = [4.0, 3.0, 2.0, 1.0];
        assert!(vaf(&y, &bad) < 0.0);
    }

    #[test]
    fn test_mse_and_rmse() {
        let y_true = [0.0, 0.0, 0.0, 0.0];
        let y_pred = [2.0, 2.0, 2.0, 2.0];
        assert!((mse(&y_true, &y_pred) - 4.0).abs() < 1e-6);
        assert!((rmse(&y_true, &y_pred) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(vaf(&[], &[]), 0.0);
        assert_eq!(mse(&[], &[]), 0.0);
    }
}

//! Sliding-window framing of a recording
//!
//! Turns a (time x channels) neural series and a paired scalar target series
//! into fixed-length overlapping windows for sequence-to-one regression. The
//! target of each window is aligned to the window's last time step: the last
//! neural bin counts toward the same-time prediction.

use super::DataError;
use ndarray::{Array1, Array2, Array3};

/// Frame a neural series into overlapping windows of `seq_length` steps.
///
/// Returns windows of shape `(T - L + 1, channels, L)` in channel-major
/// order, and one target per window taken from `target[i + L - 1]`. Output
/// ordering matches input chronological order, so a plain prefix/suffix
/// split of the result is a leakage-free chronological train/test split.
///
/// Pure function: no randomization, identical inputs give identical outputs.
pub fn sliding_windows(
    neural: &Array2<f32>,
    target: &Array1<f32>,
    seq_length: usize,
) -> Result<(Array3<f32>, Array1<f32>), DataError> {
    let (steps, channels) = neural.dim();

    if target.len() != steps {
        return Err(DataError::LengthMismatch {
            neural: steps,
            target: target.len(),
        });
    }
    if seq_length == 0 || seq_length > steps {
        return Err(DataError::BadWindowLength {
            seq_length,
            series_length: steps,
        });
    }

    let samples = steps - seq_length + 1;

    let mut x = Array3::zeros((samples, channels, seq_length));
    for i in 0..samples {
        for c in 0..channels {
            for t in 0..seq_length {
                x[[i, c, t]] = neural[[i + t, c]];
            }
        }
    }

    let y = target.slice(ndarray::s![seq_length - 1..]).to_owned();

    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_series(steps: usize, channels: usize) -> (Array2<f32>, Array1<f32>) {
        // neural[t, c] = t * 10 + c, target[t] = t
        let neural = Array2::from_shape_fn((steps, channels), |(t, c)| (t * 10 + c) as f32);
        let target = Array1::from_shape_fn(steps, |t| t as f32);
        (neural, target)
    }

    #[test]
    fn test_window_count() {
        let (neural, target) = ramp_series(200, 4);
        let (x, y) = sliding_windows(&neural, &target, 50).unwrap();
        assert_eq!(x.dim(), (151, 4, 50));
        assert_eq!(y.len(), 151);
    }

    #[test]
    fn test_window_alignment() {
        let (neural, target) = ramp_series(30, 3);
        let (x, y) = sliding_windows(&neural, &target, 10).unwrap();

        for i in 0..x.dim().0 {
            // Last column of window i holds neural row i + L - 1
            for c in 0..3 {
                assert_eq!(x[[i, c, 9]], neural[[i + 9, c]]);
            }
            // Target i is the series value at the window's last step
            assert_eq!(y[i], target[i + 9]);
        }
    }

    #[test]
    fn test_channel_major_order() {
        let (neural, target) = ramp_series(20, 2);
        let (x, _) = sliding_windows(&neural, &target, 5).unwrap();

        // x[i, c, t] = neural[i + t, c]
        assert_eq!(x[[3, 1, 2]], neural[[5, 1]]);
        assert_eq!(x[[0, 0, 0]], neural[[0, 0]]);
    }

    #[test]
    fn test_window_length_of_one() {
        let (neural, target) = ramp_series(10, 2);
        let (x, y) = sliding_windows(&neural, &target, 1).unwrap();
        assert_eq!(x.dim(), (10, 2, 1));
        assert_eq!(y[0], target[0]);
    }

    #[test]
    fn test_rejects_bad_window_length() {
        let (neural, target) = ramp_series(10, 2);
        assert!(matches!(
            sliding_windows(&neural, &target, 11),
            Err(DataError::BadWindowLength { .. })
        ));
        assert!(matches!(
            sliding_windows(&neural, &target, 0),
            Err(DataError::BadWindowLength { .. })
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let (neural, _) = ramp_series(10, 2);
        let target = Array1::zeros(9);
        assert!(matches!(
            sliding_windows(&neural, &target, 5),
            Err(DataError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_deterministic() {
        let (neural, target) = ramp_series(40, 3);
        let (x1, y1) = sliding_windows(&neural, &target, 8).unwrap();
        let (x2, y2) = sliding_windows(&neural, &target, 8).unwrap();
        assert_eq!(x1, x2);
        assert_eq!(y1, y2);
    }
}

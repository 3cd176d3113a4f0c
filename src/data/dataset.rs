//! Chronological batching over framed windows
//!
//! Batches are served strictly in chronological order. Shuffling would leak
//! future context into the training split, so there is none.

use ndarray::{s, Array1, Array3};

/// Dataset of framed windows with their regression targets.
#[derive(Debug, Clone)]
pub struct WindowDataset {
    /// Windows, shape (samples, channels, seq_length)
    features: Array3<f32>,
    /// One target per window
    targets: Array1<f32>,
    batch_size: usize,
    current_index: usize,
}

/// One batch of windows.
#[derive(Debug, Clone)]
pub struct WindowBatch {
    /// Input windows [batch_size, channels, seq_length]
    pub features: Array3<f32>,
    /// Targets [batch_size]
    pub targets: Array1<f32>,
}

impl WindowDataset {
    /// Create a dataset over framed windows.
    ///
    /// Panics if the number of windows and targets disagree or the batch
    /// size is zero.
    pub fn new(features: Array3<f32>, targets: Array1<f32>, batch_size: usize) -> Self {
        assert_eq!(features.dim().0, targets.len());
        assert!(batch_size > 0);
        Self {
            features,
            targets,
            batch_size,
            current_index: 0,
        }
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the dataset holds no windows.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of batches per pass (last batch may be short).
    pub fn num_batches(&self) -> usize {
        (self.len() + self.batch_size - 1) / self.batch_size
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of channels per window.
    pub fn num_channels(&self) -> usize {
        self.features.dim().1
    }

    /// Window length in time steps.
    pub fn seq_length(&self) -> usize {
        self.features.dim().2
    }

    /// All targets in chronological order.
    pub fn targets(&self) -> &Array1<f32> {
        &self.targets
    }

    /// Rewind batch iteration to the first window.
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    /// Next chronological batch, or `None` when the pass is complete.
    pub fn next_batch(&mut self) -> Option<WindowBatch> {
        if self.current_index >= self.len() {
            return None;
        }

        let start = self.current_index;
        let end = (start + self.batch_size).min(self.len());
        self.current_index = end;

        Some(WindowBatch {
            features: self.features.slice(s![start..end, .., ..]).to_owned(),
            targets: self.targets.slice(s![start..end]).to_owned(),
        })
    }

    /// Split into train and test sets at `train_prop` of the windows.
    ///
    /// The earliest fraction trains, the remainder tests; window order is
    /// preserved on both sides so no future sample ever reaches training.
    pub fn split_chronological(&self, train_prop: f64) -> (Self, Self) {
        let split = ((self.len() as f64) * train_prop) as usize;
        let split = split.min(self.len());

        let train = Self::new(
            self.features.slice(s![..split, .., ..]).to_owned(),
            self.targets.slice(s![..split]).to_owned(),
            self.batch_size,
        );
        let test = Self::new(
            self.features.slice(s![split.., .., ..]).to_owned(),
            self.targets.slice(s![split..]).to_owned(),
            self.batch_size,
        );
        (train, test)
    }
}

impl Iterator for WindowDataset {
    type Item = WindowBatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_dataset(n: usize, batch_size: usize) -> WindowDataset {
        // target[i] = i, feature windows filled with the window index
        let features = Array3::from_shape_fn((n, 2, 4), |(i, _, _)| i as f32);
        let targets = Array1::from_shape_fn(n, |i| i as f32);
        WindowDataset::new(features, targets, batch_size)
    }

    #[test]
    fn test_batches_cover_all_windows() {
        let mut ds = indexed_dataset(100, 32);
        assert_eq!(ds.num_batches(), 4);

        let mut total = 0;
        while let Some(batch) = ds.next_batch() {
            total += batch.targets.len();
        }
        assert_eq!(total, 100);
    }

    #[test]
    fn test_batches_are_chronological() {
        let mut ds = indexed_dataset(10, 3);
        let mut seen = Vec::new();
        while let Some(batch) = ds.next_batch() {
            seen.extend(batch.targets.iter().copied());
        }
        let expected: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_reset_restarts_pass() {
        let mut ds = indexed_dataset(5, 2);
        assert!(ds.next_batch().is_some());
        ds.reset();
        let first = ds.next_batch().unwrap();
        assert_eq!(first.targets[0], 0.0);
    }

    #[test]
    fn test_chronological_split() {
        let ds = indexed_dataset(151, 1);
        let (train, test) = ds.split_chronological(0.9);

        assert_eq!(train.len(), 135);
        assert_eq!(test.len(), 16);
        // Boundary: last train window precedes first test window
        assert_eq!(train.targets()[train.len() - 1], 134.0);
        assert_eq!(test.targets()[0], 135.0);
    }
}

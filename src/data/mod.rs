//! Data loading and preparation
//!
//! - `mat` - Reading neural/kinematic recordings from MATLAB `.mat` files
//! - `windows` - Sliding-window framing of the recording
//! - `dataset` - Chronological batching over the framed windows

pub mod dataset;
pub mod mat;
pub mod windows;

pub use dataset::{WindowBatch, WindowDataset};
pub use mat::Recording;
pub use windows::sliding_windows;

use thiserror::Error;

/// Which variables of the recording to decode, and how to frame them.
///
/// Defaults mirror the reference rat-kinematics runs: decode kinematic
/// column 3 of `KINdat` from `APdat`, 50 bins per window, 90% train.
#[derive(Debug, Clone)]
pub struct DecodingConfig {
    /// Name of the neural-signal matrix in the `.mat` file (time x channels)
    pub neural_var: String,
    /// Name of the decoding-signal matrix (time x signal columns)
    pub decoding_var: String,
    /// Name of the label array naming each signal column, if any
    pub labels_var: Option<String>,
    /// Signal column to decode (FCR, FCU, ECR etc.)
    pub signal: usize,
    /// Fraction of windows used for training; the remainder tests
    pub train_prop: f64,
    /// Number of neural bins looked at before each prediction
    pub seq_length: usize,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            neural_var: "APdat".to_string(),
            decoding_var: "KINdat".to_string(),
            labels_var: Some("KINlabels".to_string()),
            signal: 3,
            train_prop: 0.90,
            seq_length: 50,
        }
    }
}

/// Errors produced while loading or framing a recording.
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be opened or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `.mat` file could not be parsed
    #[error("failed to parse .mat file: {0}")]
    Mat(String),

    /// A named variable is missing from the file
    #[error("variable '{0}' not found in .mat file")]
    VariableNotFound(String),

    /// A variable is not a 2-D matrix
    #[error("variable '{name}' is not a 2-D matrix (got {ndim} dimensions)")]
    NotAMatrix { name: String, ndim: usize },

    /// Requested decoding column does not exist
    #[error("signal column {signal} out of range (decoding matrix has {columns} columns)")]
    SignalOutOfRange { signal: usize, columns: usize },

    /// Window length incompatible with the series length
    #[error("window length {seq_length} invalid for series of length {series_length}")]
    BadWindowLength {
        seq_length: usize,
        series_length: usize,
    },

    /// Neural and decoding series disagree on the number of time steps
    #[error("series length mismatch: neural has {neural} time steps, target has {target}")]
    LengthMismatch { neural: usize, target: usize },
}

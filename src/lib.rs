//! # Kinematic TCN
//!
//! Decoding continuous kinematic signals (limb position/velocity) from
//! multi-channel neural spike recordings with a Temporal Convolutional
//! Network (TCN).
//!
//! ## Modules
//!
//! - `data` - Loading `.mat` recordings and sliding-window dataset construction
//! - `model` - TCN architecture, training and evaluation
//! - `utils` - Regression metrics (VAF, MSE, RMSE)

pub mod data;
pub mod model;
pub mod utils;

// Re-export commonly used types
pub use data::{sliding_windows, DataError, DecodingConfig, Recording, WindowBatch, WindowDataset};
pub use model::{Tcn, TcnConfig, TemporalBlock, TrainingConfig, TrainingResult};

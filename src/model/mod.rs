//! TCN architecture, training and evaluation
//!
//! - `config` - Model and training configuration
//! - `tcn` - Causal dilated residual convolution stack
//! - `training` - Supervised regression loop with VAF evaluation

pub mod config;
pub mod tcn;
pub mod training;

pub use config::{OptimizerKind, TcnConfig, TrainingConfig};
pub use tcn::{Tcn, TemporalBlock};
pub use training::{
    effective_lr, evaluate_model, predict, train_model, EvaluationMetrics, TrainingResult,
};

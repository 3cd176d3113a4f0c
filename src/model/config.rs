//! Model and training configuration

use serde::{Deserialize, Serialize};

/// Architecture of the causal dilated convolution stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcnConfig {
    /// Number of neural input channels
    pub input_channels: usize,
    /// Output size (1 for scalar regression)
    pub output_size: usize,
    /// Output channel count of each residual block; length = network depth
    pub channel_sizes: Vec<usize>,
    /// Convolution kernel size
    pub kernel_size: usize,
    /// Dropout applied inside each block
    pub dropout: f64,
}

impl Default for TcnConfig {
    fn default() -> Self {
        Self {
            input_channels: 1,
            output_size: 1,
            channel_sizes: vec![25; 8],
            kernel_size: 7,
            dropout: 0.05,
        }
    }
}

impl TcnConfig {
    /// Config for decoding `input_channels` neural channels into one scalar.
    pub fn new(input_channels: usize) -> Self {
        Self {
            input_channels,
            ..Default::default()
        }
    }

    /// Use `levels` blocks of `hidden` channels each.
    #[must_use]
    pub fn with_hidden(mut self, hidden: usize, levels: usize) -> Self {
        self.channel_sizes = vec![hidden; levels];
        self
    }

    /// Set the explicit per-block channel sizes.
    #[must_use]
    pub fn with_channel_sizes(mut self, channel_sizes: Vec<usize>) -> Self {
        self.channel_sizes = channel_sizes;
        self
    }

    /// Set the convolution kernel size.
    #[must_use]
    pub fn with_kernel_size(mut self, kernel_size: usize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    /// Set the dropout rate.
    #[must_use]
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Network depth (number of residual blocks).
    pub fn levels(&self) -> usize {
        self.channel_sizes.len()
    }

    /// Input channel count of block `i`: the raw input for block 0, the
    /// previous block's output otherwise.
    pub fn block_input_channels(&self, i: usize) -> usize {
        if i == 0 {
            self.input_channels
        } else {
            self.channel_sizes[i - 1]
        }
    }

    /// Receptive field in time steps.
    ///
    /// With dilation 2^i at block i and two convolutions per block:
    /// 1 + 2 * (K - 1) * (2^N - 1).
    pub fn receptive_field(&self) -> usize {
        let dilation_sum: usize = (0..self.levels()).map(|i| 1usize << i).sum();
        1 + 2 * (self.kernel_size - 1) * dilation_sum
    }

    /// Reject configurations the network cannot be built from.
    pub fn validate(&self) -> Result<(), String> {
        if self.input_channels == 0 {
            return Err("input_channels must be positive".to_string());
        }
        if self.output_size == 0 {
            return Err("output_size must be positive".to_string());
        }
        if self.channel_sizes.is_empty() {
            return Err("channel_sizes must name at least one block".to_string());
        }
        if self.channel_sizes.iter().any(|&c| c == 0) {
            return Err("channel sizes must be positive".to_string());
        }
        if self.kernel_size == 0 {
            return Err("kernel_size must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err("dropout must be in [0, 1)".to_string());
        }
        Ok(())
    }
}

/// Gradient-based optimizer to train with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Adam with default moment coefficients
    Adam,
    /// Plain stochastic gradient descent
    Sgd,
}

/// Hyperparameters of the training loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Upper epoch limit
    pub epochs: usize,
    /// Windows per gradient step
    pub batch_size: usize,
    /// Initial learning rate; decays by 10x every 10 epochs
    pub learning_rate: f64,
    /// Optimizer to use
    pub optimizer: OptimizerKind,
    /// Gradient-norm clip threshold; `None` disables clipping
    pub grad_clip: Option<f64>,
    /// Evaluate test VAF every this many batches
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 6,
            batch_size: 1,
            learning_rate: 2e-3,
            optimizer: OptimizerKind::Adam,
            grad_clip: None,
            log_interval: 100,
        }
    }
}

//! Temporal Convolutional Network for sequence-to-one regression
//!
//! A stack of residual blocks of causal dilated 1D convolutions. Block i uses
//! dilation 2^i, so the receptive field grows exponentially with depth and
//! long-range temporal dependencies cost few parameters.
//!
//! Causality: each convolution pads both sides by (kernel_size - 1) *
//! dilation and the trailing padding is chomped off afterwards, so the
//! output at time t depends only on inputs at times <= t.

use super::config::TcnConfig;
use burn::nn::{
    conv::{Conv1d, Conv1dConfig},
    Dropout, DropoutConfig, Initializer, Linear, LinearConfig, PaddingConfig1d, Relu,
};
use burn::prelude::*;

/// Standard deviation for the N(0, sigma^2) weight init; small weights keep
/// early training of deep dilated stacks stable.
const INIT_STD: f64 = 0.01;

fn weight_init() -> Initializer {
    Initializer::Normal {
        mean: 0.0,
        std: INIT_STD,
    }
}

/// Residual block of two causal dilated convolutions.
///
/// ```text
/// input -> conv1 -> chomp -> relu -> dropout
///       -> conv2 -> chomp -> relu -> dropout -> (+) -> relu -> output
///   |                                            ^
///   +------------- (1x1 conv if channels differ) +
/// ```
#[derive(Module, Debug)]
pub struct TemporalBlock<B: Backend> {
    conv1: Conv1d<B>,
    conv2: Conv1d<B>,
    dropout: Dropout,
    /// 1x1 projection for the residual path when in/out channels differ
    downsample: Option<Conv1d<B>>,
    activation: Relu,
}

impl<B: Backend> TemporalBlock<B> {
    /// Build a block with the given dilation.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        dilation: usize,
        dropout: f64,
        device: &B::Device,
    ) -> Self {
        let padding = (kernel_size - 1) * dilation;

        let conv1 = Conv1dConfig::new(in_channels, out_channels, kernel_size)
            .with_dilation(dilation)
            .with_padding(PaddingConfig1d::Explicit(padding))
            .with_initializer(weight_init())
            .init(device);

        let conv2 = Conv1dConfig::new(out_channels, out_channels, kernel_size)
            .with_dilation(dilation)
            .with_padding(PaddingConfig1d::Explicit(padding))
            .with_initializer(weight_init())
            .init(device);

        let downsample = if in_channels != out_channels {
            Some(
                Conv1dConfig::new(in_channels, out_channels, 1)
                    .with_initializer(weight_init())
                    .init(device),
            )
        } else {
            None
        };

        Self {
            conv1,
            conv2,
            dropout: DropoutConfig::new(dropout).init(),
            downsample,
            activation: Relu::new(),
        }
    }

    /// Forward pass; output time length equals input time length.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [_, _, seq_len] = x.dims();

        let out = self.conv1.forward(x.clone());
        let out = chomp(out, seq_len);
        let out = self.activation.forward(out);
        let out = self.dropout.forward(out);

        let out = self.conv2.forward(out);
        let out = chomp(out, seq_len);
        let out = self.activation.forward(out);
        let out = self.dropout.forward(out);

        let residual = match &self.downsample {
            Some(conv) => conv.forward(x),
            None => x,
        };

        self.activation.forward(out + residual)
    }
}

/// Truncate the trailing padding so the convolution stays causal.
fn chomp<B: Backend>(x: Tensor<B, 3>, seq_len: usize) -> Tensor<B, 3> {
    let [batch, channels, _] = x.dims();
    x.slice([0..batch, 0..channels, 0..seq_len])
}

/// The full decoder: residual stack plus a linear read-out of the final
/// time step. No activation after the read-out; the output is a raw scalar.
#[derive(Module, Debug)]
pub struct Tcn<B: Backend> {
    blocks: Vec<TemporalBlock<B>>,
    head: Linear<B>,
}

impl<B: Backend> Tcn<B> {
    /// Build the network described by `config`.
    pub fn new(config: &TcnConfig, device: &B::Device) -> Self {
        let blocks = (0..config.levels())
            .map(|i| {
                TemporalBlock::new(
                    config.block_input_channels(i),
                    config.channel_sizes[i],
                    config.kernel_size,
                    1 << i,
                    config.dropout,
                    device,
                )
            })
            .collect();

        let last_channels = *config
            .channel_sizes
            .last()
            .expect("channel_sizes must not be empty");
        let head = LinearConfig::new(last_channels, config.output_size)
            .with_initializer(weight_init())
            .init(device);

        Self { blocks, head }
    }

    /// Run the residual stack only: (batch, C, L) -> (batch, channels, L).
    pub fn forward_features(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut out = x;
        for block in &self.blocks {
            out = block.forward(out);
        }
        out
    }

    /// Full forward pass: (batch, C, L) -> (batch, output_size).
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let out = self.forward_features(x);

        // Only the feature vector at the last time step feeds the read-out
        let [batch, channels, seq_len] = out.dims();
        let last: Tensor<B, 2> = out
            .slice([0..batch, 0..channels, seq_len - 1..seq_len])
            .reshape([batch, channels]);

        self.head.forward(last)
    }

    /// Number of residual blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

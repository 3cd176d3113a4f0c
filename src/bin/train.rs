//! Train a TCN kinematic decoder on a `.mat` recording
//!
//! Example:
//! ```bash
//! cargo run --release --bin train -- \
//!     --file data/N5_171016_NoObstacles_s_matrices.mat --signal 3 --epochs 6
//! ```

use anyhow::Result;
use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::Backend as BackendTrait;
use clap::Parser;
use kinematic_tcn::data::{sliding_windows, DecodingConfig, Recording, WindowDataset};
use kinematic_tcn::model::{train_model, OptimizerKind, Tcn, TcnConfig, TrainingConfig};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

type Backend = Autodiff<NdArray<f32>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sequence regression - rat kinematic data")]
struct Args {
    /// Input .mat file with neural and kinematic matrices
    #[arg(
        short,
        long,
        default_value = "data/N5_171016_NoObstacles_s_matrices.mat"
    )]
    file: PathBuf,

    /// Name of the neural-signal matrix
    #[arg(long, default_value = "APdat")]
    neural_var: String,

    /// Name of the decoding-signal matrix (EMGdat / KINdat)
    #[arg(long, default_value = "KINdat")]
    decoding_var: String,

    /// Name of the label array naming the decoding columns
    #[arg(long, default_value = "KINlabels")]
    labels_var: String,

    /// Decoding column to predict (FCR, FCU, ECR etc.)
    #[arg(long, default_value_t = 3)]
    signal: usize,

    /// Fraction of windows used for training
    #[arg(long, default_value_t = 0.90)]
    train_prop: f64,

    /// Number of neural bins looked at before each prediction
    #[arg(long, default_value_t = 50)]
    seq_len: usize,

    /// Batch size
    #[arg(short, long, default_value_t = 1)]
    batch_size: usize,

    /// Use CUDA
    #[arg(long)]
    cuda: bool,

    /// Dropout applied to layers
    #[arg(long, default_value_t = 0.05)]
    dropout: f64,

    /// Gradient clip threshold; negative disables clipping
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    clip: f64,

    /// Upper epoch limit
    #[arg(short, long, default_value_t = 6)]
    epochs: usize,

    /// Convolution kernel size
    #[arg(short, long, default_value_t = 7)]
    ksize: usize,

    /// Number of residual levels
    #[arg(short, long, default_value_t = 8)]
    levels: usize,

    /// Report interval in batches
    #[arg(long, default_value_t = 100)]
    log_interval: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 2e-3)]
    lr: f64,

    /// Optimizer to use
    #[arg(long, value_enum, default_value = "adam")]
    optim: OptimizerKind,

    /// Number of hidden units per level
    #[arg(long, default_value_t = 25)]
    nhid: usize,

    /// Random seed
    #[arg(long, default_value_t = 1111)]
    seed: u64,

    /// Permute windows (accepted for compatibility; training is chronological)
    #[arg(long)]
    permute: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{:?}", args);

    if args.cuda {
        warn!("CUDA requested but this build runs on the CPU ndarray backend");
    }
    if args.permute {
        warn!("--permute has no effect: windows are framed chronologically");
    }

    Backend::seed(args.seed);
    let device = Default::default();

    let decoding = DecodingConfig {
        neural_var: args.neural_var.clone(),
        decoding_var: args.decoding_var.clone(),
        labels_var: Some(args.labels_var.clone()),
        signal: args.signal,
        train_prop: args.train_prop,
        seq_length: args.seq_len,
    };

    // Load the recording and pick the regression target
    let recording = Recording::load(&args.file, &decoding)?;
    match recording.label(decoding.signal) {
        Some(label) => info!("decoding signal column {} ({})", decoding.signal, label),
        None => info!("decoding signal column {}", decoding.signal),
    }
    info!(
        "{} time steps, {} neural channels",
        recording.num_steps(),
        recording.num_channels()
    );
    let target = recording.decoding_column(decoding.signal)?;

    // Frame into windows and split chronologically
    let (windows, targets) = sliding_windows(&recording.neural, &target, decoding.seq_length)?;
    let dataset = WindowDataset::new(windows, targets, args.batch_size);
    let (mut train, mut test) = dataset.split_chronological(decoding.train_prop);
    info!(
        "{} windows of {} x {}: {} train, {} test",
        dataset.len(),
        dataset.num_channels(),
        dataset.seq_length(),
        train.len(),
        test.len()
    );

    // Build the network
    let model_config = TcnConfig::new(recording.num_channels())
        .with_hidden(args.nhid, args.levels)
        .with_kernel_size(args.ksize)
        .with_dropout(args.dropout);
    model_config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "TCN: {} levels of {} channels, kernel {}, receptive field {} bins",
        args.levels,
        args.nhid,
        args.ksize,
        model_config.receptive_field()
    );

    let model: Tcn<Backend> = Tcn::new(&model_config, &device);

    let training = TrainingConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.lr,
        optimizer: args.optim,
        grad_clip: (args.clip > 0.0).then_some(args.clip),
        log_interval: args.log_interval,
    };

    let (_model, result) = train_model(model, &mut train, &mut test, &training, &device);

    let best = result
        .test_vaf
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    info!("best test VAF: {:.4}", best);

    Ok(())
}

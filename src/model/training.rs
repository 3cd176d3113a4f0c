//! Supervised regression loop with VAF evaluation
//!
//! Iterates the training windows chronologically, minimizes squared error
//! against the target aligned to each window's last time step, and reports
//! variance-accounted-for on the held-out tail of the recording.

use super::config::{OptimizerKind, TrainingConfig};
use super::tcn::Tcn;
use crate::data::{WindowBatch, WindowDataset};
use crate::utils::metrics::{mse, vaf};
use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor, TensorData};
use tracing::{debug, info};

/// Histories collected over a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingResult {
    /// Mean training loss per epoch
    pub train_losses: Vec<f32>,
    /// Training-set VAF per epoch
    pub train_vaf: Vec<f32>,
    /// Test-set VAF per epoch
    pub test_vaf: Vec<f32>,
    /// Test-set VAF sampled every `log_interval` batches
    pub running_test_vaf: Vec<f32>,
}

/// Evaluation metrics on one dataset.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationMetrics {
    /// Variance accounted for
    pub vaf: f32,
    /// Mean squared error
    pub mse: f32,
}

/// Effective learning rate at (0-based) epoch `epoch`: the initial rate
/// decayed by a factor of 10 every 10 epochs.
pub fn effective_lr(initial: f64, epoch: usize) -> f64 {
    initial / 10f64.powi((epoch / 10) as i32)
}

/// Train `model` on `train`, evaluating against `test` along the way.
///
/// The optimizer is selected by name, as the original runs did.
pub fn train_model<B: AutodiffBackend>(
    model: Tcn<B>,
    train: &mut WindowDataset,
    test: &mut WindowDataset,
    config: &TrainingConfig,
    device: &B::Device,
) -> (Tcn<B>, TrainingResult) {
    let clipping = config
        .grad_clip
        .map(|clip| GradientClippingConfig::Norm(clip as f32));

    match config.optimizer {
        OptimizerKind::Adam => {
            let optimizer = AdamConfig::new().with_grad_clipping(clipping).init();
            run_training(model, train, test, config, device, optimizer)
        }
        OptimizerKind::Sgd => {
            let optimizer = SgdConfig::new().with_gradient_clipping(clipping).init();
            run_training(model, train, test, config, device, optimizer)
        }
    }
}

fn run_training<B: AutodiffBackend, O: Optimizer<Tcn<B>, B>>(
    model: Tcn<B>,
    train: &mut WindowDataset,
    test: &mut WindowDataset,
    config: &TrainingConfig,
    device: &B::Device,
    mut optimizer: O,
) -> (Tcn<B>, TrainingResult) {
    info!(
        "training for {} epochs: {} train windows, {} test windows, batch size {}",
        config.epochs,
        train.len(),
        test.len(),
        config.batch_size
    );

    let mut model = model;
    let mut result = TrainingResult::default();

    for epoch in 0..config.epochs {
        let lr = effective_lr(config.learning_rate, epoch);

        train.reset();
        let mut loss_sum = 0.0;
        let mut batch_count = 0usize;

        while let Some(batch) = train.next_batch() {
            let (features, targets) = batch_to_tensors::<B>(&batch, device);

            let output: Tensor<B, 1> = model.forward(features).squeeze(1);
            let loss = (output - targets).powf_scalar(2.0).mean();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(lr, model, grads);

            loss_sum += loss.into_scalar().elem::<f32>();
            batch_count += 1;

            if batch_count % config.log_interval == 0 && !test.is_empty() {
                let metrics = evaluate_model(&model, test, device);
                debug!(
                    "epoch {} batch {}: test VAF {:.4}",
                    epoch + 1,
                    batch_count,
                    metrics.vaf
                );
                result.running_test_vaf.push(metrics.vaf);
            }
        }

        let train_loss = loss_sum / batch_count.max(1) as f32;
        let train_metrics = evaluate_model(&model, train, device);
        let test_metrics = evaluate_model(&model, test, device);

        result.train_losses.push(train_loss);
        result.train_vaf.push(train_metrics.vaf);
        result.test_vaf.push(test_metrics.vaf);

        info!(
            "Epoch {}/{}: loss={:.6}, train VAF={:.4}, test VAF={:.4}, lr={:.2e}",
            epoch + 1,
            config.epochs,
            train_loss,
            train_metrics.vaf,
            test_metrics.vaf,
            lr
        );
    }

    (model, result)
}

/// Run the model over a dataset with dropout disabled.
pub fn predict<B: AutodiffBackend>(
    model: &Tcn<B>,
    dataset: &mut WindowDataset,
    device: &B::Device,
) -> Vec<f32> {
    let model = model.valid();

    dataset.reset();
    let mut predictions = Vec::with_capacity(dataset.len());

    while let Some(batch) = dataset.next_batch() {
        let (features, _) = batch_to_tensors::<B::InnerBackend>(&batch, device);
        let output: Tensor<B::InnerBackend, 1> = model.forward(features).squeeze(1);
        let values: Vec<f32> = output.into_data().to_vec().unwrap();
        predictions.extend(values);
    }

    predictions
}

/// VAF and MSE of the model's predictions over a dataset.
pub fn evaluate_model<B: AutodiffBackend>(
    model: &Tcn<B>,
    dataset: &mut WindowDataset,
    device: &B::Device,
) -> EvaluationMetrics {
    let predictions = predict(model, dataset, device);
    let targets = dataset.targets().as_slice().expect("contiguous targets");

    EvaluationMetrics {
        vaf: vaf(targets, &predictions),
        mse: mse(targets, &predictions),
    }
}

/// Host arrays to device tensors.
fn batch_to_tensors<B: Backend>(
    batch: &WindowBatch,
    device: &B::Device,
) -> (Tensor<B, 3>, Tensor<B, 1>) {
    let (samples, channels, seq_length) = batch.features.dim();

    let features = Tensor::from_data(
        TensorData::new(
            batch.features.iter().copied().collect::<Vec<f32>>(),
            [samples, channels, seq_length],
        ),
        device,
    );
    let targets = Tensor::from_data(
        TensorData::new(batch.targets.to_vec(), [batch.targets.len()]),
        device,
    );

    (features, targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sliding_windows;
    use crate::model::config::TcnConfig;
    use burn::backend::Autodiff;
    use burn_ndarray::NdArray;
    use ndarray::{Array1, Array2};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_effective_lr_schedule() {
        let r = 2e-3;
        for epoch in 0..10 {
            assert_eq!(effective_lr(r, epoch), r);
        }
        assert!((effective_lr(r, 10) - r / 10.0).abs() < 1e-12);
        assert!((effective_lr(r, 19) - r / 10.0).abs() < 1e-12);
        assert!((effective_lr(r, 20) - r / 100.0).abs() < 1e-12);
    }

    fn tiny_datasets() -> (WindowDataset, WindowDataset) {
        // Sinusoidal target driven by two phase-shifted channels
        let steps = 60;
        let neural = Array2::from_shape_fn((steps, 2), |(t, c)| {
            ((t as f32) * 0.3 + c as f32).sin()
        });
        let target = Array1::from_shape_fn(steps, |t| ((t as f32) * 0.3).sin());

        let (x, y) = sliding_windows(&neural, &target, 8).unwrap();
        WindowDataset::new(x, y, 4).split_chronological(0.8)
    }

    #[test]
    fn test_training_smoke() {
        let device = Default::default();
        let config = TcnConfig::new(2)
            .with_hidden(4, 2)
            .with_kernel_size(3)
            .with_dropout(0.0);
        let model: Tcn<TestBackend> = Tcn::new(&config, &device);

        let (mut train, mut test) = tiny_datasets();
        let training = TrainingConfig {
            epochs: 2,
            batch_size: 4,
            learning_rate: 1e-2,
            log_interval: 100,
            ..Default::default()
        };

        let (model, result) = train_model(model, &mut train, &mut test, &training, &device);

        assert_eq!(result.train_losses.len(), 2);
        assert_eq!(result.test_vaf.len(), 2);
        assert!(result.train_losses.iter().all(|l| l.is_finite()));

        let predictions = predict(&model, &mut test, &device);
        assert_eq!(predictions.len(), test.len());
    }

    #[test]
    fn test_gradient_clipping_config_accepted() {
        let device = Default::default();
        let config = TcnConfig::new(2)
            .with_hidden(4, 1)
            .with_kernel_size(3)
            .with_dropout(0.0);
        let model: Tcn<TestBackend> = Tcn::new(&config, &device);

        let (mut train, mut test) = tiny_datasets();
        let training = TrainingConfig {
            epochs: 1,
            batch_size: 8,
            grad_clip: Some(0.5),
            optimizer: OptimizerKind::Sgd,
            ..Default::default()
        };

        let (_, result) = train_model(model, &mut train, &mut test, &training, &device);
        assert!(result.train_losses[0].is_finite());
    }
}

//! Gradient-eligibility update: ordinary gradient descent split open so the
//! eligibility traces can be blended into the gradients *before* the
//! optimizer applies them. Traces here assign credit to directions in
//! parameter space visited by earlier states, so there is one trace tensor
//! per trainable parameter tensor, shaped identically.

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

use crate::ai::networks::{ValueNetwork, ValueNetworkConfig};
use crate::ai::state_encoding::{features_tensor, targets_tensor};
use crate::error::TrainingError;

pub type InferBackend = NdArray<f32>;
pub type TrainBackend = Autodiff<InferBackend>;

/// Eligibility accumulators for one linear layer, shaped like its weight
/// and (optional) bias.
pub(crate) struct ParamTraces {
    pub(crate) weight: Tensor<InferBackend, 2>,
    pub(crate) bias: Option<Tensor<InferBackend, 1>>,
}

/// Minibatch/epoch conveniences layered over the core update step.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub epochs: usize,
    pub minibatch_size: usize,
    pub validation_fraction: f32,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            epochs: 1,
            minibatch_size: 1,
            validation_fraction: 0.0,
        }
    }
}

/// Value network plus optimizer plus per-parameter eligibility traces.
///
/// `fit` performs the split step: forward pass for a squared-error loss,
/// backward pass for raw gradients, per-tensor trace correction
/// `g += lr * delta * e`, a single optimizer step with the corrected
/// gradients, then the trace advance `e = gamma * lambda * e + g` using the
/// corrected gradient (deliberately source-literal; see DESIGN.md).
pub struct SplitGd {
    network: ValueNetwork<TrainBackend>,
    optimizer: burn::optim::adaptor::OptimizerAdaptor<
        burn::optim::Adam,
        ValueNetwork<TrainBackend>,
        TrainBackend,
    >,
    traces: Vec<ParamTraces>,
    learning_rate: f64,
    discount_factor: f32,
    trace_decay: f32,
    td_error: f32,
    options: FitOptions,
    device: <TrainBackend as Backend>::Device,
    rng: StdRng,
}

impl SplitGd {
    pub fn new(
        net_config: &ValueNetworkConfig,
        learning_rate: f64,
        discount_factor: f32,
        trace_decay: f32,
        options: FitOptions,
    ) -> Self {
        let device = Default::default();
        let network: ValueNetwork<TrainBackend> = net_config.init(&device);
        let optimizer = AdamConfig::new().init();
        let traces = Self::zero_traces(&network);

        SplitGd {
            network,
            optimizer,
            traces,
            learning_rate,
            discount_factor,
            trace_decay,
            td_error: 0.0,
            options,
            device,
            rng: StdRng::from_os_rng(),
        }
    }

    fn zero_traces(network: &ValueNetwork<TrainBackend>) -> Vec<ParamTraces> {
        network
            .layers()
            .map(|layer| ParamTraces {
                weight: layer.weight.val().inner().zeros_like(),
                bias: layer.bias.as_ref().map(|b| b.val().inner().zeros_like()),
            })
            .collect()
    }

    /// Executed when the owning critic computes a fresh TD-error.
    pub fn set_td_error(&mut self, td_error: f32) {
        self.td_error = td_error;
    }

    /// Re-zero every trace accumulator, keeping shapes aligned with the
    /// current parameters.
    pub fn reset_traces(&mut self) {
        self.traces = Self::zero_traces(&self.network);
    }

    /// Value prediction for one encoded state.
    pub fn value(&self, features: &[f32]) -> f32 {
        self.predict(&[features.to_vec()])[0]
    }

    /// Batched value predictions on the inference backend (no autodiff).
    pub fn predict(&self, rows: &[Vec<f32>]) -> Vec<f32> {
        let model = self.network.valid();
        let input = features_tensor::<InferBackend>(rows, &Default::default());
        model
            .forward(input)
            .into_data()
            .to_vec()
            .expect("f32 prediction tensor extraction")
    }

    /// Train toward the given regression targets. Returns the last
    /// minibatch loss. A non-finite loss aborts with a fatal error.
    pub fn fit(&mut self, features: &[Vec<f32>], targets: &[f32]) -> Result<f32, TrainingError> {
        let (train_x, train_y, val_x, val_y) = self.split_training_data(features, targets);

        let mbs = self.options.minibatch_size.min(train_x.len()).max(1);
        let steps_per_epoch = (train_x.len() / mbs).max(1);
        let mut last_loss = 0.0;

        for _ in 0..self.options.epochs {
            for _ in 0..steps_per_epoch {
                let (batch_x, batch_y) = self.sample_minibatch(&train_x, &train_y, mbs);
                let inputs = features_tensor::<TrainBackend>(&batch_x, &self.device);
                let targets = targets_tensor::<TrainBackend>(&batch_y, &self.device);
                last_loss = self.train_minibatch(inputs, targets)?;
            }
        }

        if !val_x.is_empty() {
            let predictions = self.predict(&val_x);
            let val_loss: f32 = predictions
                .iter()
                .zip(&val_y)
                .map(|(p, t)| (p - t) * (p - t))
                .sum::<f32>()
                / val_x.len() as f32;
            log::debug!("validation loss: {:.6} ({} samples)", val_loss, val_x.len());
        }

        Ok(last_loss)
    }

    /// One split gradient-descent step on a prepared minibatch.
    fn train_minibatch(
        &mut self,
        inputs: Tensor<TrainBackend, 2>,
        targets: Tensor<TrainBackend, 2>,
    ) -> Result<f32, TrainingError> {
        // Forward pass: squared-error loss against the regression targets.
        let predictions = self.network.forward(inputs);
        let diff = predictions - targets;
        let loss = (diff.clone() * diff).mean();

        let loss_val: f32 = loss
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];
        if !loss_val.is_finite() {
            return Err(TrainingError::NonFiniteLoss(loss_val));
        }

        // Backward pass: raw gradients, not yet applied.
        let grads = loss.backward();

        // Blend the eligibility traces into the gradients, collect the
        // corrected set for the optimizer, and advance each trace with the
        // corrected gradient.
        let correction = self.learning_rate as f32 * self.td_error;
        let decay = self.discount_factor * self.trace_decay;
        let mut corrected = GradientsParams::new();
        let mut next_traces = Vec::with_capacity(self.traces.len());

        for (layer, trace) in self.network.layers().zip(self.traces.iter()) {
            let raw_w = layer
                .weight
                .val()
                .grad(&grads)
                .unwrap_or_else(|| trace.weight.zeros_like());
            let corr_w = raw_w + trace.weight.clone().mul_scalar(correction);
            corrected.register::<InferBackend, 2>(layer.weight.id, corr_w.clone());
            let next_w = trace.weight.clone().mul_scalar(decay) + corr_w;

            let next_b = match (&layer.bias, &trace.bias) {
                (Some(bias), Some(trace_b)) => {
                    let raw_b = bias
                        .val()
                        .grad(&grads)
                        .unwrap_or_else(|| trace_b.zeros_like());
                    let corr_b = raw_b + trace_b.clone().mul_scalar(correction);
                    corrected.register::<InferBackend, 1>(bias.id, corr_b.clone());
                    Some(trace_b.clone().mul_scalar(decay) + corr_b)
                }
                _ => None,
            };

            next_traces.push(ParamTraces {
                weight: next_w,
                bias: next_b,
            });
        }
        self.traces = next_traces;

        // Optimizer step: consumes the network, returns the updated one.
        self.network =
            self.optimizer
                .step(self.learning_rate, self.network.clone(), corrected);

        Ok(loss_val)
    }

    fn sample_minibatch(
        &mut self,
        features: &[Vec<f32>],
        targets: &[f32],
        mbs: usize,
    ) -> (Vec<Vec<f32>>, Vec<f32>) {
        let mut batch_x = Vec::with_capacity(mbs);
        let mut batch_y = Vec::with_capacity(mbs);
        for _ in 0..mbs {
            let i = self.rng.random_range(0..features.len());
            batch_x.push(features[i].clone());
            batch_y.push(targets[i]);
        }
        (batch_x, batch_y)
    }

    /// Hold out `validation_fraction` of the batch, shuffled; the training
    /// split is never left empty.
    fn split_training_data(
        &mut self,
        features: &[Vec<f32>],
        targets: &[f32],
    ) -> (Vec<Vec<f32>>, Vec<f32>, Vec<Vec<f32>>, Vec<f32>) {
        let len = features.len();
        let held_out = (self.options.validation_fraction * len as f32).round() as usize;
        if held_out == 0 || held_out >= len {
            return (features.to_vec(), targets.to_vec(), Vec::new(), Vec::new());
        }

        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);

        let (val_idx, train_idx) = order.split_at(held_out);
        let pick = |idx: &[usize]| -> (Vec<Vec<f32>>, Vec<f32>) {
            (
                idx.iter().map(|&i| features[i].clone()).collect(),
                idx.iter().map(|&i| targets[i]).collect(),
            )
        };
        let (val_x, val_y) = pick(val_idx);
        let (train_x, train_y) = pick(train_idx);
        (train_x, train_y, val_x, val_y)
    }

    #[cfg(test)]
    pub(crate) fn traces(&self) -> &[ParamTraces] {
        &self.traces
    }

    #[cfg(test)]
    pub(crate) fn network(&self) -> &ValueNetwork<TrainBackend> {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_gd() -> SplitGd {
        SplitGd::new(
            &ValueNetworkConfig::new(6, vec![4, 3]),
            1e-2,
            0.9,
            0.9,
            FitOptions::default(),
        )
    }

    fn sample_row() -> Vec<f32> {
        vec![1.0, 0.0, 1.0, 1.0, 0.0, 1.0]
    }

    #[test]
    fn test_traces_match_parameter_shapes_and_are_zero() {
        let mut gd = small_gd();
        gd.set_td_error(1.5);
        gd.fit(&[sample_row()], &[3.0]).unwrap();
        gd.reset_traces();

        for (layer, trace) in gd.network().layers().zip(gd.traces().iter()) {
            assert_eq!(trace.weight.shape().dims, layer.weight.val().shape().dims);
            let weight: Vec<f32> = trace.weight.clone().into_data().to_vec().unwrap();
            assert!(weight.iter().all(|&v| v == 0.0));

            let bias = layer.bias.as_ref().expect("linear layers carry biases");
            let trace_b = trace.bias.as_ref().expect("bias trace present");
            assert_eq!(trace_b.shape().dims, bias.val().shape().dims);
            let bias_data: Vec<f32> = trace_b.clone().into_data().to_vec().unwrap();
            assert!(bias_data.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_fit_advances_traces() {
        let mut gd = small_gd();
        gd.fit(&[sample_row()], &[100.0]).unwrap();

        // The output bias gradient is 2 * (prediction - target) / batch,
        // which cannot vanish against a target this far away, so at least
        // the last trace must have moved off zero.
        let last = gd.traces().last().unwrap();
        let bias: Vec<f32> = last
            .bias
            .as_ref()
            .unwrap()
            .clone()
            .into_data()
            .to_vec()
            .unwrap();
        assert!(bias.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_fit_converges_toward_target() {
        let mut gd = small_gd();
        let rows = vec![sample_row()];
        let first = gd.fit(&rows, &[2.0]).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = gd.fit(&rows, &[2.0]).unwrap();
        }
        assert!(
            last < first,
            "loss should shrink: first {} last {}",
            first,
            last
        );
    }

    #[test]
    fn test_non_finite_target_is_fatal() {
        let mut gd = small_gd();
        let err = gd.fit(&[sample_row()], &[f32::NAN]).unwrap_err();
        assert!(matches!(err, TrainingError::NonFiniteLoss(_)));
    }

    #[test]
    fn test_validation_split_keeps_training_nonempty() {
        let mut gd = SplitGd::new(
            &ValueNetworkConfig::new(6, vec![4]),
            1e-2,
            0.9,
            0.9,
            FitOptions {
                validation_fraction: 0.5,
                ..Default::default()
            },
        );
        let rows: Vec<Vec<f32>> = (0..4).map(|_| sample_row()).collect();
        let targets = vec![1.0, 2.0, 3.0, 4.0];
        let (train_x, train_y, val_x, val_y) = gd.split_training_data(&rows, &targets);
        assert_eq!(train_x.len(), 2);
        assert_eq!(val_x.len(), 2);
        assert_eq!(train_x.len(), train_y.len());
        assert_eq!(val_x.len(), val_y.len());
    }

    #[test]
    fn test_predict_batch_length() {
        let gd = small_gd();
        let rows = vec![sample_row(), sample_row(), sample_row()];
        assert_eq!(gd.predict(&rows).len(), 3);
    }
}

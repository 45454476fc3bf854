use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::State;

/// Encode a state as one f32 per board cell in canonical arena order:
/// 1.0 for a peg, 0.0 for a hole.
pub fn encode_state(state: State, num_cells: usize) -> Vec<f32> {
    (0..num_cells)
        .map(|i| if state.is_peg(i) { 1.0 } else { 0.0 })
        .collect()
}

/// Stack encoded states into a [batch, cells] feature tensor.
pub fn features_tensor<B: Backend>(rows: &[Vec<f32>], device: &B::Device) -> Tensor<B, 2> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        flat.extend_from_slice(row);
    }
    Tensor::<B, 1>::from_data(TensorData::from(flat.as_slice()), device)
        .reshape([rows.len() as i32, cols as i32])
}

/// Column vector of regression targets, shape [batch, 1].
pub fn targets_tensor<B: Backend>(targets: &[f32], device: &B::Device) -> Tensor<B, 2> {
    Tensor::<B, 1>::from_data(TensorData::from(targets), device)
        .reshape([targets.len() as i32, 1])
}

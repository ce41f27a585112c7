//! Hidden-state pooling.
//!
//! The pooled embedding is the elementwise mean of the last [`POOLED_LAYER_COUNT`]
//! hidden-state layers, read at sequence position [`CLS_POSITION`]. Because both steps
//! are linear and position-wise, the rows at the position are extracted first and the
//! mean is taken over those rows only.

use candle_core::{DType, IndexOp, Tensor};

use crate::constants::{CLS_POSITION, POOLED_LAYER_COUNT};
use crate::embedding::error::EmbeddingError;

/// Rows of one layer at a fixed sequence position, one per batch item.
pub type LayerRows = Vec<Vec<f32>>;

/// Extracts the vector at `position` for every batch item of every layer.
///
/// Each tensor must be `[batch, seq_len, hidden]`.
pub fn rows_at_position(
    layers: &[Tensor],
    position: usize,
) -> Result<Vec<LayerRows>, EmbeddingError> {
    layers
        .iter()
        .map(|layer| {
            let (_batch, seq_len, _hidden) = layer.dims3()?;
            if position >= seq_len {
                return Err(EmbeddingError::PoolingFailed {
                    reason: format!("position {position} out of range for sequence length {seq_len}"),
                });
            }
            Ok(layer.i((.., position, ..))?.to_dtype(DType::F32)?.to_vec2::<f32>()?)
        })
        .collect()
}

/// Averages the last `count` layers elementwise, per batch item.
///
/// Values are summed in layer order and divided by `count`.
pub fn mean_of_last_layers(
    layers: &[LayerRows],
    count: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if count == 0 {
        return Err(EmbeddingError::PoolingFailed {
            reason: "layer count must be positive".to_string(),
        });
    }
    if layers.len() < count {
        return Err(EmbeddingError::PoolingFailed {
            reason: format!("need {count} layers, got {}", layers.len()),
        });
    }

    let selected = &layers[layers.len() - count..];
    let batch = selected[0].len();
    if batch == 0 {
        return Err(EmbeddingError::PoolingFailed {
            reason: "empty batch".to_string(),
        });
    }

    let width = selected[0][0].len();
    for (idx, layer) in selected.iter().enumerate() {
        if layer.len() != batch {
            return Err(EmbeddingError::PoolingFailed {
                reason: format!("layer {idx} has batch {} (expected {batch})", layer.len()),
            });
        }
        if let Some(row) = layer.iter().find(|row| row.len() != width) {
            return Err(EmbeddingError::PoolingFailed {
                reason: format!("layer {idx} has width {} (expected {width})", row.len()),
            });
        }
    }

    let divisor = count as f32;
    let pooled = (0..batch)
        .map(|item| {
            let mut sum = vec![0.0f32; width];
            for layer in selected {
                for (acc, value) in sum.iter_mut().zip(&layer[item]) {
                    *acc += *value;
                }
            }
            sum.into_iter().map(|v| v / divisor).collect()
        })
        .collect();

    Ok(pooled)
}

/// Pools an encoder's hidden-state stack into one vector per batch item.
pub fn pool_hidden_states(hidden_states: &[Tensor]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if hidden_states.len() < POOLED_LAYER_COUNT {
        return Err(EmbeddingError::PoolingFailed {
            reason: format!(
                "encoder produced {} hidden states, pooling needs {POOLED_LAYER_COUNT}",
                hidden_states.len()
            ),
        });
    }

    let tail = &hidden_states[hidden_states.len() - POOLED_LAYER_COUNT..];
    let rows = rows_at_position(tail, CLS_POSITION)?;
    mean_of_last_layers(&rows, POOLED_LAYER_COUNT)
}

//! Receptive field, jump and output shape of every layer in a stack.
//!
//! Running state starts at `rf = 1`, `jump = 1` and the input's `h, w, c`. Each layer updates
//!
//! ```text
//! rf   = rf + (k - 1) * d * jump
//! jump = jump * s
//! h, w = conv_out_size(h|w, k, s, p, d)
//! ```
//!
//! Padding shifts alignment only and never enters the rf/jump recurrence.

use log::{debug, trace};
use serde::Serialize;

use crate::model::{input_shape::InputShape, layer_spec::LayerSpec};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayerResult {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub dilation: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_channels: Option<usize>,

    pub rf: usize,
    pub jump: usize,
    pub h: usize,
    pub w: usize,
    pub c: usize,
}

/// Output length along one axis, `floor((n + 2p - d(k-1) - 1) / s + 1)`.
///
/// Returns 0 when the numerator goes negative. A zero stride is treated as 1. Intermediate
/// sums saturate at `usize::MAX` instead of overflowing.
pub fn conv_out_size(
    n: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> usize {
    let stride = stride.max(1);
    let span = dilation
        .saturating_mul(kernel.saturating_sub(1))
        .saturating_add(1);
    let padded = n.saturating_add(padding.saturating_mul(2));
    if padded < span {
        return 0;
    }
    (padded - span) / stride + 1
}

pub fn compute_rf_and_shapes(layers: &[LayerSpec], input: &InputShape) -> Vec<LayerResult> {
    let mut rf = 1usize;
    let mut jump = 1usize;
    let (mut h, mut w, mut c) = (input.h, input.w, input.c);

    let mut results = Vec::with_capacity(layers.len());

    for (idx, layer) in layers.iter().enumerate() {
        let k = layer.kernel();
        let s = layer.stride().max(1);
        let p = layer.padding();
        let d = layer.dilation();

        // rf and jump saturate rather than overflow on absurdly deep or strided stacks
        rf = rf.saturating_add(k.saturating_sub(1).saturating_mul(d).saturating_mul(jump));
        jump = jump.saturating_mul(s);

        h = conv_out_size(h, k, s, p, d);
        w = conv_out_size(w, k, s, p, d);

        if let Some(channels) = layer.out_channels().filter(|&n| n > 0) {
            c = channels;
        }

        trace!("layer {} {}: rf={} jump={} out={}x{}x{}", idx + 1, layer, rf, jump, h, w, c);

        results.push(LayerResult {
            index: idx + 1,
            kind: layer.kind(),
            kernel: k,
            stride: layer.stride(),
            padding: p,
            dilation: d,
            out_channels: layer.out_channels(),
            rf,
            jump,
            h,
            w,
            c,
        });
    }

    debug!("computed receptive fields for {} layers from {}", results.len(), input);
    results
}

//! Chains the first few layers of a stack over a small numbered grid.
//!
//! The chain is independent of the real `h, w, c` from the rf engine. It only exists so a
//! user can pick an output cell and see which input cells fed it.

use log::debug;
use serde::Serialize;

use crate::model::{input_shape::InputShape, layer_params::clamp_param, layer_spec::LayerSpec};

use super::{
    ops::{convolve_unit, max_pool, tap_index, tap_range},
    viz_grid::VizGrid,
};

pub const DEFAULT_LAYER_LIMIT: usize = 3;
pub const DEFAULT_GRID_CAP: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VizLayerEntry {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub dilation: usize,
    pub input: VizGrid,
    pub output: VizGrid,
    pub out_h: usize,
    pub out_w: usize,
}

impl VizLayerEntry {
    /// Input cells, in unpadded input coordinates, read by output cell `(oy, ox)`.
    ///
    /// Taps landing on padding are left out. Out of range output coordinates give nothing.
    pub fn contributing_cells(&self, oy: usize, ox: usize) -> Vec<(usize, usize)> {
        if oy >= self.out_h || ox >= self.out_w {
            return Vec::new();
        }
        let (k, s, p, d) = (self.kernel, self.stride, self.padding, self.dilation);
        let rows = tap_range(oy, k, s, p, d, self.input.rows());
        let cols = tap_range(ox, k, s, p, d, self.input.cols());
        rows.flat_map(|kr| {
            let r = tap_index(oy, kr, s, p, d);
            cols.clone().map(move |kc| (r, tap_index(ox, kc, s, p, d)))
        })
        .collect()
    }

    pub fn output_value(&self, oy: usize, ox: usize) -> Option<i64> {
        self.output.get(oy, ox)
    }
}

/// A selection after clamping. `layer` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VizSelection {
    pub layer: usize,
    pub oy: usize,
    pub ox: usize,
}

impl VizSelection {
    pub fn entry<'a>(&self, entries: &'a [VizLayerEntry]) -> Option<&'a VizLayerEntry> {
        self.layer.checked_sub(1).and_then(|i| entries.get(i))
    }
}

fn apply_layer(grid: &VizGrid, layer: &LayerSpec) -> VizGrid {
    match layer {
        LayerSpec::Conv2D(params) => convolve_unit(
            grid,
            params.kernel,
            params.stride,
            params.padding,
            params.dilation,
        ),
        LayerSpec::MaxPool2D(params) => {
            max_pool(grid, params.kernel, params.stride, params.padding)
        }
    }
}

pub fn build_viz(
    layers: &[LayerSpec],
    input: &InputShape,
    limit: usize,
    cap: usize,
) -> Vec<VizLayerEntry> {
    let mut grid = VizGrid::identity(input.h.min(cap), input.w.min(cap));

    let mut entries = Vec::with_capacity(limit.min(layers.len()));

    for (idx, layer) in layers.iter().take(limit).enumerate() {
        let output = apply_layer(&grid, layer);
        let input = std::mem::replace(&mut grid, output.clone());
        entries.push(VizLayerEntry {
            index: idx + 1,
            kind: layer.kind(),
            // the same clamp the grid ops apply, so coordinates match the output grid
            kernel: clamp_param(layer.kernel(), 1),
            stride: clamp_param(layer.stride(), 1),
            padding: clamp_param(layer.padding(), 0),
            dilation: clamp_param(layer.dilation(), 1),
            input,
            out_h: output.rows(),
            out_w: output.cols(),
            output,
        });
    }

    debug!(
        "built {} visualization layers on a {}x{} grid",
        entries.len(),
        input.h.min(cap),
        input.w.min(cap)
    );
    entries
}

fn clamp(value: i64, max: usize) -> usize {
    value.clamp(0, max as i64) as usize
}

/// Clamps a 1-based layer selector and an output coordinate into range.
///
/// Returns `None` only when there is nothing to select.
pub fn clamp_selection(
    entries: &[VizLayerEntry],
    layer: i64,
    oy: i64,
    ox: i64,
) -> Option<VizSelection> {
    if entries.is_empty() {
        return None;
    }
    let layer = layer.clamp(1, entries.len() as i64) as usize;
    let entry = &entries[layer - 1];
    Some(VizSelection {
        layer,
        oy: clamp(oy, entry.out_h.saturating_sub(1)),
        ox: clamp(ox, entry.out_w.saturating_sub(1)),
    })
}

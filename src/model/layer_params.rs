use serde::{Deserialize, Serialize};

/// Largest kernel, stride, padding or dilation a sanitized layer keeps.
///
/// Above what real networks use, and small enough that a chain of such layers stays cheap to
/// simulate on a visualization grid.
pub const MAX_LAYER_PARAM: usize = 64;

/// Clamps one layer parameter into `min..=MAX_LAYER_PARAM`.
pub fn clamp_param(value: usize, min: usize) -> usize {
    value.clamp(min, MAX_LAYER_PARAM)
}

// Square kernels throughout, one value applies to both spatial axes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvParams {
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub dilation: usize,

    // None keeps the incoming channel count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_channels: Option<usize>,
}

impl Default for ConvParams {
    fn default() -> Self {
        Self {
            kernel: 1,
            stride: 1,
            padding: 0,
            dilation: 1,
            out_channels: None,
        }
    }
}

impl ConvParams {
    /// Clamps kernel, stride and dilation into `1..=MAX_LAYER_PARAM`, padding into
    /// `0..=MAX_LAYER_PARAM`, and drops a zero channel count.
    pub fn sanitized(self) -> Self {
        Self {
            kernel: clamp_param(self.kernel, 1),
            stride: clamp_param(self.stride, 1),
            padding: clamp_param(self.padding, 0),
            dilation: clamp_param(self.dilation, 1),
            out_channels: self.out_channels.filter(|&c| c > 0),
        }
    }
}

// Pooling never dilates and never touches channels, so neither field exists here
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            kernel: 1,
            stride: 1,
            padding: 0,
        }
    }
}

impl PoolParams {
    pub fn sanitized(self) -> Self {
        Self {
            kernel: clamp_param(self.kernel, 1),
            stride: clamp_param(self.stride, 1),
            padding: clamp_param(self.padding, 0),
        }
    }
}

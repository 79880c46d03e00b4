use std::fmt;

use serde::{Deserialize, Serialize};

use super::layer_params::{ConvParams, PoolParams};

/// One convolutional or pooling stage in the stack.
///
/// Serialized with an inline `type` tag, e.g.
/// `{"type":"Conv2D","kernel":3,"stride":1,"padding":1,"dilation":1,"out_channels":16}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerSpec {
    Conv2D(ConvParams),
    MaxPool2D(PoolParams),
}

impl LayerSpec {
    pub fn conv2d(kernel: usize, stride: usize, padding: usize) -> Self {
        LayerSpec::Conv2D(
            ConvParams {
                kernel,
                stride,
                padding,
                ..Default::default()
            }
            .sanitized(),
        )
    }

    pub fn conv2d_with(
        kernel: usize,
        stride: usize,
        padding: usize,
        dilation: usize,
        out_channels: Option<usize>,
    ) -> Self {
        LayerSpec::Conv2D(
            ConvParams {
                kernel,
                stride,
                padding,
                dilation,
                out_channels,
            }
            .sanitized(),
        )
    }

    pub fn max_pool2d(kernel: usize, stride: usize, padding: usize) -> Self {
        LayerSpec::MaxPool2D(
            PoolParams {
                kernel,
                stride,
                padding,
            }
            .sanitized(),
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayerSpec::Conv2D(_) => "Conv2D",
            LayerSpec::MaxPool2D(_) => "MaxPool2D",
        }
    }

    pub fn kernel(&self) -> usize {
        match self {
            LayerSpec::Conv2D(params) => params.kernel,
            LayerSpec::MaxPool2D(params) => params.kernel,
        }
    }

    pub fn stride(&self) -> usize {
        match self {
            LayerSpec::Conv2D(params) => params.stride,
            LayerSpec::MaxPool2D(params) => params.stride,
        }
    }

    pub fn padding(&self) -> usize {
        match self {
            LayerSpec::Conv2D(params) => params.padding,
            LayerSpec::MaxPool2D(params) => params.padding,
        }
    }

    /// Effective dilation, pooling is always 1.
    pub fn dilation(&self) -> usize {
        match self {
            LayerSpec::Conv2D(params) => params.dilation,
            LayerSpec::MaxPool2D(_) => 1,
        }
    }

    pub fn out_channels(&self) -> Option<usize> {
        match self {
            LayerSpec::Conv2D(params) => params.out_channels,
            LayerSpec::MaxPool2D(_) => None,
        }
    }

    pub fn is_pooling(&self) -> bool {
        matches!(self, LayerSpec::MaxPool2D(_))
    }

    /// The same layer with every field clamped into its valid range.
    pub fn sanitized(self) -> Self {
        match self {
            LayerSpec::Conv2D(params) => LayerSpec::Conv2D(params.sanitized()),
            LayerSpec::MaxPool2D(params) => LayerSpec::MaxPool2D(params.sanitized()),
        }
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSpec::Conv2D(params) => {
                write!(
                    f,
                    "Conv2D(k={}, s={}, p={}, d={}",
                    params.kernel, params.stride, params.padding, params.dilation
                )?;
                if let Some(channels) = params.out_channels {
                    write!(f, ", out={}", channels)?;
                }
                write!(f, ")")
            }
            LayerSpec::MaxPool2D(params) => write!(
                f,
                "MaxPool2D(k={}, s={}, p={})",
                params.kernel, params.stride, params.padding
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooling_reports_unit_dilation_and_no_channels() {
        let pool = LayerSpec::max_pool2d(2, 2, 0);
        assert_eq!(pool.dilation(), 1);
        assert_eq!(pool.out_channels(), None);
        assert_eq!(pool.kind(), "MaxPool2D");
    }

    #[test]
    fn constructors_clamp_zero_fields() {
        let conv = LayerSpec::conv2d_with(0, 0, 0, 0, Some(0));
        assert_eq!(conv.kernel(), 1);
        assert_eq!(conv.stride(), 1);
        assert_eq!(conv.dilation(), 1);
        assert_eq!(conv.out_channels(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let conv = LayerSpec::conv2d_with(3, 1, 1, 1, Some(16));
        let json = serde_json::to_string(&conv).unwrap();
        assert!(json.contains("\"type\":\"Conv2D\""));
        assert!(json.contains("\"out_channels\":16"));

        let back: LayerSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conv);
    }

    #[test]
    fn pooling_json_ignores_stale_dilation() {
        let json = r#"{"type":"MaxPool2D","kernel":2,"stride":2,"padding":0,"dilation":4}"#;
        let pool: LayerSpec = serde_json::from_str(json).unwrap();
        assert_eq!(pool, LayerSpec::max_pool2d(2, 2, 0));
        assert_eq!(pool.dilation(), 1);
    }

    #[test]
    fn display_includes_channels_only_when_set() {
        assert_eq!(
            LayerSpec::conv2d(3, 1, 1).to_string(),
            "Conv2D(k=3, s=1, p=1, d=1)"
        );
        assert_eq!(
            LayerSpec::conv2d_with(3, 2, 0, 2, Some(8)).to_string(),
            "Conv2D(k=3, s=2, p=0, d=2, out=8)"
        );
    }
}

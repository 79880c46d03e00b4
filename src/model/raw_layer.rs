//! Normalization of loosely typed layer input (form fields, CLI strings) into a [`LayerSpec`].
//!
//! Nothing here fails. Missing or non-numeric fields take their defaults and out of range
//! values are clamped, with a warning logged for anything that had to be corrected.

use log::{debug, warn};

use super::layer_params::{ConvParams, PoolParams, MAX_LAYER_PARAM};
use super::layer_spec::LayerSpec;

pub const DEFAULT_KERNEL: usize = 1;
pub const DEFAULT_STRIDE: usize = 1;
pub const DEFAULT_PADDING: usize = 0;
pub const DEFAULT_DILATION: usize = 1;

/// Raw, unvalidated layer fields as a caller received them.
#[derive(Clone, Debug, Default)]
pub struct RawLayerFields {
    pub layer_type: Option<String>,
    pub kernel: Option<String>,
    pub stride: Option<String>,
    pub padding: Option<String>,
    pub dilation: Option<String>,
    pub out_channels: Option<String>,
}

impl RawLayerFields {
    /// Collects fields from `(name, value)` pairs, unknown names are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut raw = Self::default();
        for (name, value) in pairs {
            let value = Some(value.to_string());
            match name {
                "type" => raw.layer_type = value,
                "kernel" => raw.kernel = value,
                "stride" => raw.stride = value,
                "padding" => raw.padding = value,
                "dilation" => raw.dilation = value,
                "out_channels" => raw.out_channels = value,
                other => debug!("ignoring unknown layer field '{}'", other),
            }
        }
        raw
    }
}

fn parse_int(value: Option<&str>) -> Option<i128> {
    value.and_then(|v| v.trim().parse::<i128>().ok())
}

// Missing or unparsable values take the default, parsed values are clamped into
// `min..=MAX_LAYER_PARAM`
fn field_or(name: &str, value: Option<&str>, default: usize, min: usize) -> usize {
    match parse_int(value) {
        None => {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                warn!("{} '{}' is not an integer, using {}", name, v, default);
            }
            default
        }
        Some(n) if n < min as i128 => {
            warn!("{} {} is below {}, clamping", name, n, min);
            min
        }
        Some(n) if n > MAX_LAYER_PARAM as i128 => {
            warn!("{} {} is above {}, clamping", name, n, MAX_LAYER_PARAM);
            MAX_LAYER_PARAM
        }
        Some(n) => n as usize,
    }
}

fn is_pool_type(layer_type: Option<&str>) -> bool {
    match layer_type.map(|t| t.trim().to_ascii_lowercase()) {
        Some(t) => matches!(t.as_str(), "maxpool2d" | "maxpool" | "pool"),
        None => false,
    }
}

/// Turns raw fields into a canonical layer.
///
/// The type defaults to Conv2D. MaxPool2D always ends up with dilation 1 and no
/// channel count, whatever the caller sent.
pub fn normalize_layer_spec(raw: &RawLayerFields) -> LayerSpec {
    let kernel = field_or("kernel", raw.kernel.as_deref(), DEFAULT_KERNEL, 1);
    let stride = field_or("stride", raw.stride.as_deref(), DEFAULT_STRIDE, 1);
    let padding = field_or("padding", raw.padding.as_deref(), DEFAULT_PADDING, 0);

    if is_pool_type(raw.layer_type.as_deref()) {
        return LayerSpec::MaxPool2D(PoolParams {
            kernel,
            stride,
            padding,
        });
    }

    let dilation = field_or("dilation", raw.dilation.as_deref(), DEFAULT_DILATION, 1);
    let out_channels = parse_int(raw.out_channels.as_deref())
        .filter(|&c| c > 0)
        .map(|c| usize::try_from(c).unwrap_or(usize::MAX));

    LayerSpec::Conv2D(ConvParams {
        kernel,
        stride,
        padding,
        dilation,
        out_channels,
    })
}

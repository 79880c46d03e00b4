//! Receptive field and shape arithmetic for stacks of 2D convolution and max pooling layers,
//! plus a toy unit-weight grid simulator for tracing which input pixels feed an output pixel.
//!
//! The engines are pure functions over a layer slice. Session state lives in [`LayerStack`],
//! owned by the caller.

pub mod compute;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;

use log::LevelFilter;

pub use compute::print_model_stats::{
    format_layer_table, format_viz_entry, print_layer_table, LayerTable, VizEntryView,
};
pub use compute::rf_engine::{compute_rf_and_shapes, conv_out_size, LayerResult};
pub use config::{AppConfig, VizConfig};
pub use error::{Result, RfStackError};
pub use grid::export::{render_grid_png, save_grid_png};
pub use grid::ops::{convolve_unit, max_pool};
pub use grid::viz::{build_viz, clamp_selection, VizLayerEntry, VizSelection};
pub use grid::viz_grid::VizGrid;
pub use model::input_shape::InputShape;
pub use model::layer_params::{ConvParams, PoolParams, MAX_LAYER_PARAM};
pub use model::layer_spec::LayerSpec;
pub use model::raw_layer::{normalize_layer_spec, RawLayerFields};
pub use model::stack::LayerStack;

/// Initialize logging once.
///
/// `RUST_LOG` wins when set, otherwise `default_filter` applies.
pub fn init_logging(default_filter: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
}

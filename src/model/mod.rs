pub mod input_shape;
pub mod layer_params;
pub mod layer_spec;
pub mod raw_layer;
pub mod stack;

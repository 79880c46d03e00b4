use std::{fs, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    compute::rf_engine::{compute_rf_and_shapes, LayerResult},
    config::VizConfig,
    error::Result,
    grid::viz::{build_viz, VizLayerEntry},
};

use super::{input_shape::InputShape, layer_spec::LayerSpec};

/// Per-session state: the layer list and the input it is applied to.
///
/// Layers are only ever pushed or popped at the end, or cleared. Every derived view is
/// recomputed from scratch, nothing is cached here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStack {
    pub layers: Vec<LayerSpec>,
    pub input: InputShape,
}

impl LayerStack {
    pub fn new(input: InputShape) -> Self {
        Self {
            layers: Vec::new(),
            input,
        }
    }

    pub fn push(&mut self, layer: LayerSpec) {
        debug!("push {}", layer);
        self.layers.push(layer);
    }

    pub fn extend(&mut self, layers: Vec<LayerSpec>) {
        for layer in layers.into_iter() {
            self.push(layer);
        }
    }

    /// Removes the last layer, a no-op on an empty stack.
    pub fn pop(&mut self) -> Option<LayerSpec> {
        let popped = self.layers.pop();
        if let Some(layer) = &popped {
            debug!("pop {}", layer);
        }
        popped
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn set_input(&mut self, input: InputShape) {
        self.input = input;
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn results(&self) -> Vec<LayerResult> {
        compute_rf_and_shapes(&self.layers, &self.input)
    }

    pub fn viz(&self, config: &VizConfig) -> Vec<VizLayerEntry> {
        build_viz(&self.layers, &self.input, config.layer_limit, config.grid_cap)
    }

    /// Loads a session file, a missing file is an empty stack on the default input.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no session at {}, starting fresh", path.display());
            return Ok(Self::default());
        }
        let stack: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        // hand-edited files may carry zero kernels or strides
        let stack = Self {
            layers: stack.layers.into_iter().map(LayerSpec::sanitized).collect(),
            input: InputShape::new(stack.input.h, stack.input.w, stack.input.c)?,
        };
        info!("loaded {} layers from {}", stack.len(), path.display());
        Ok(stack)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("saved {} layers to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_clear_follow_stack_order() {
        let mut stack = LayerStack::default();
        stack.push(LayerSpec::conv2d(3, 1, 1));
        stack.push(LayerSpec::max_pool2d(2, 2, 0));
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Some(LayerSpec::max_pool2d(2, 2, 0)));
        assert_eq!(stack.layers, vec![LayerSpec::conv2d(3, 1, 1)]);

        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn results_follow_input_replacement() {
        let mut stack = LayerStack::default();
        stack.push(LayerSpec::max_pool2d(2, 2, 0));
        assert_eq!(stack.results()[0].h, 112);

        stack.set_input(InputShape::new(32, 32, 1).unwrap());
        assert_eq!(stack.results()[0].h, 16);
    }

    #[test]
    fn missing_session_fields_take_defaults() {
        let stack: LayerStack = serde_json::from_str("{}").unwrap();
        assert_eq!(stack, LayerStack::default());
    }
}

use std::{fs, path::Path};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RfStackError},
    grid::viz::{DEFAULT_GRID_CAP, DEFAULT_LAYER_LIMIT},
    model::input_shape::InputShape,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    // How many leading layers get a grid
    pub layer_limit: usize,
    // Largest side of the synthetic input grid
    pub grid_cap: usize,
}

impl VizConfig {
    pub fn build(self) -> Result<Self> {
        if self.grid_cap == 0 {
            return Err(RfStackError::InvalidConfig(
                "grid_cap must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            layer_limit: DEFAULT_LAYER_LIMIT,
            grid_cap: DEFAULT_GRID_CAP,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viz: VizConfig,
    pub default_input: InputShape,
    pub log_level: String,
    pub cell_px: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viz: VizConfig::default(),
            default_input: InputShape::default(),
            log_level: "info".to_string(),
            cell_px: 32,
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.build()
    }

    pub fn build(self) -> Result<Self> {
        self.viz.build()?;
        InputShape::new(self.default_input.h, self.default_input.w, self.default_input.c)?;
        if self.cell_px == 0 {
            return Err(RfStackError::InvalidConfig(
                "cell_px must be at least 1".to_string(),
            ));
        }
        self.level_filter()?;
        Ok(self)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| {
                RfStackError::InvalidConfig(format!("unknown log level '{}'", self.log_level))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default().build().unwrap();
        assert_eq!(config.viz, VizConfig { layer_limit: 3, grid_cap: 8 });
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn zero_grid_cap_is_rejected() {
        let config = VizConfig {
            grid_cap: 0,
            ..Default::default()
        };
        assert!(matches!(config.build(), Err(RfStackError::InvalidConfig(_))));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"viz": {{"grid_cap": 5}}, "log_level": "debug"}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.viz.grid_cap, 5);
        assert_eq!(config.viz.layer_limit, 3);
        assert_eq!(config.default_input, InputShape::default());
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = AppConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(config.build().is_err());
    }
}

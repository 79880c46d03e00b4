pub mod export;
pub mod ops;
pub mod viz;
pub mod viz_grid;

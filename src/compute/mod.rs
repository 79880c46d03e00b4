pub mod print_model_stats;
pub mod rf_engine;

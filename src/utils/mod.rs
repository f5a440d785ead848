pub mod constants;
pub mod engine_config;
pub mod env;
pub mod logging;

pub mod clock;
pub mod constants;
pub mod frame;
pub mod model_resolver;
pub mod run_config;
pub mod stop_signal;

pub mod initialization_phase;
pub mod monitor_context;
pub mod monitor_error;
pub mod steady_state_phase;
pub mod supervisor;

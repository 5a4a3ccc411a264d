pub mod capture_error;
pub mod capture_source;

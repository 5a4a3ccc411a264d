pub mod capture;
pub mod detection;
pub mod lock;
pub mod monitor;
pub mod presence;
pub mod shared;

#[cfg(test)]
pub(crate) mod testing;

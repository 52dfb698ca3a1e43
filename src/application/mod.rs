mod ports;
pub mod usecases;

pub use ports::*;

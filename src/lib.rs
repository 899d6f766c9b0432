pub mod analysis;
pub mod config;
pub mod dba;
pub mod error;
pub mod net;
pub mod optics;
pub mod service;
pub mod sim;
pub mod topo;

pub use error::{GponError, Result};

#[cfg(test)]
mod test;

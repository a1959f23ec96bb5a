pub mod config;
pub mod error;
pub mod footprint;
pub mod math;
pub mod model;
pub mod operations;
pub mod pipeline;
pub mod raster;
pub mod terrain;

pub use error::{GeocityError, Result};

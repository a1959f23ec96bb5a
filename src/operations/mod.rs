pub mod assembly;
pub mod extraction;
pub mod heights;
pub mod query;
pub mod shaping;
pub mod shared_edges;

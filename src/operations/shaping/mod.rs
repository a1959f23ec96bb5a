mod caps;
mod walls;

pub use caps::{ExtrudeCap, ExtrudeInteriorWalls};
pub use walls::ExtrudeWalls;

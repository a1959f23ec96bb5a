mod is_watertight;

pub use is_watertight::IsWatertight;

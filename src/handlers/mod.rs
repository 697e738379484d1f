pub mod me;
pub mod presets;
pub mod schedule;
pub mod shared;
pub mod stats;
pub mod swaps;
pub mod workspaces;

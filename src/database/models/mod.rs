pub mod macros;
pub mod preset;
pub mod shift;
pub mod swap;
pub mod workspace;

// Re-export all models for easy importing
pub use preset::*;
pub use shift::*;
pub use swap::*;
pub use workspace::*;

//! Schema module - Configuration and seeding types for the renderer.

mod config;
mod seed;

pub use config::*;
pub use seed::*;

//! Configuration module.

mod loader;
mod paths;
mod types;

pub use loader::*;
pub use paths::*;
pub use types::*;

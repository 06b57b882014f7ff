pub mod analyze;
pub mod area;
pub mod config;

/// Default location of the knowledge document, relative to the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = "demos/product.md";

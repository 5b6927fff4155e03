//! Core configuration management types.

mod builder;
mod configuration;
mod loader;

pub use builder::ConfigBuilder;
pub use configuration::Configuration;
pub(crate) use loader::ConfigLoader;

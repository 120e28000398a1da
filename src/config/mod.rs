//! Config file loading and merging into the parsed CLI arguments.
mod apply;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use loader::{load_config, load_config_file};
pub use types::{ConfigFile, DurationValue};

//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::TesterArgs;
pub use defaults::{DEFAULT_USER_AGENT, LARGE_RUN_THRESHOLD, default_warmup};
pub use parsers::{parse_duration_arg, parse_header, parse_proxy, parse_target_url};
pub use types::{HttpMethod, OutputFormat};

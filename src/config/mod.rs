// Configuration management module
// TOML settings for the model endpoint, chunking, retrieval and sessions

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{Config, ConfigError, LlmConfig};

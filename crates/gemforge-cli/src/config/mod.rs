//! Configuration: `.env`/process-environment hydration and the TOML
//! joblist schema (§6).

mod env;
mod toml_config;

pub use env::{EnvConfig, load_dotenv};
pub use toml_config::{AppConfig, DefaultsSection, DirSection, FileSection, SystemSection};

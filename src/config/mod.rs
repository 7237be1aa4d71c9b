//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (ECHO_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → EchoConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{DispatchConfig, EchoConfig, HttpConfig, LogFormat, ObservabilityConfig};
pub use validation::ValidationError;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → ClientConfig::resolve_endpoints (token resolved, spec built) at startup
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::DispatchConfig;
pub use schema::EndpointConfig;
pub use schema::FieldConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ValidationConfig;

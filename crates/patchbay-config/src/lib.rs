//! Configuration for patchbay servers and clients.
//!
//! # Features
//!
//! - **Server config**: Name and naming/connection limits, loaded from TOML
//! - **Client config**: Name collision policy and target server
//! - **Validation**: Reject limits that would make a server unusable
//! - **Paths**: Platform-specific config directory with an env override
//!
//! # Example
//!
//! ```rust
//! use patchbay_config::ServerConfig;
//!
//! let config = ServerConfig::from_toml(
//!     r#"
//!     name = "studio"
//!
//!     [limits]
//!     max_connections_per_port = 16
//!     "#,
//! )
//! .unwrap();
//!
//! let limits = config.limits();
//! assert_eq!(limits.max_connections_per_port, Some(16));
//! assert_eq!(limits.max_aliases, 2);
//! ```

mod client;
mod error;
mod server;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration validation.
pub mod validation;

pub use client::{ClientConfig, NamePolicyConfig};
pub use error::ConfigError;
pub use paths::{find_server_config, load_server_config, server_config_path, user_config_dir};
pub use server::{DEFAULT_SERVER_NAME, LimitsConfig, ServerConfig};
pub use validation::{ValidationError, ValidationResult, validate_server_config};

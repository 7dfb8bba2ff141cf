//! Configuration resolution module.

pub mod document;
pub mod error;
pub mod paths;
pub mod points;
pub mod schema;
pub mod validation;

pub use document::ConfigDocument;
pub use error::ConfigError;
pub use paths::{CONFIG_DIR_ENV, Paths, expand_user};
pub use points::{PollingPoint, polling_points};
pub use schema::{Config, EndpointConfig, WebApiRoute};
pub use validation::{RequiredKeys, agent_required_keys, check_config, server_required_keys};

//! Install-time provisioning helpers.

pub mod configure;
#[cfg(unix)]
pub mod user;

pub use configure::{
    Role, configure, default_agent_config, default_server_config, merge, read_config,
};

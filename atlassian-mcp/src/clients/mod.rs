//! Atlassian client and configuration.
//!
//! - `config`: file/environment configuration with credential validation
//! - `atlassian`: authenticated REST client for JIRA and Confluence

pub mod atlassian;
pub mod config;

pub use atlassian::{AtlassianClient, AtlassianError};
pub use config::{Config, ConfigError};

//! Utility functions

use serde::{Deserialize, Serialize};

use crate::errors::DeployError;

/// Version information for the deployer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Source of deployment tracking ids
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, DeployError>;
}

/// Random v4 UUIDs in their 32 character uppercase form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String, DeployError> {
        Ok(generate_uuid().simple().to_string().to_uppercase())
    }
}

/// Generate a random UUID v4
pub fn generate_uuid() -> uuid::Uuid {
    uuid::Uuid::new_v4()
}

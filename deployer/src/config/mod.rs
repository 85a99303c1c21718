//! Deploy configuration: the raw surface and its resolution

pub mod resolver;
pub mod settings;

pub use resolver::{ClientConfig, ConfigResolver, ResolvedConfig};
pub use settings::DeployConfig;

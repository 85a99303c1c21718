//! Jobdeploy Library
//!
//! Renders templated Nomad jobs, tags them for tracking and rolls them out.

pub mod config;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod platform;
pub mod template;
pub mod utils;

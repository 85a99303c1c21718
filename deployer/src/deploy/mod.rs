//! Deployment pipeline

pub mod context;
pub mod env;
pub mod executor;
pub mod fsm;
pub mod meta;
pub mod nomad;
pub mod render;
pub mod trigger;
pub mod variables;

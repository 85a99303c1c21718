//! HTTP clients for the Nomad and Consul APIs

pub mod client;
pub mod consul;
pub mod nomad;

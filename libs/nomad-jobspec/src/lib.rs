//! Nomad job specification models
//!
//! Typed views over the parts of the Nomad JSON job format the deployer
//! touches. Every field not modelled here is kept verbatim so a job survives
//! a parse/serialize cycle unchanged.

pub mod api;
pub mod models;

pub use models::{Job, NetworkResource, Task, TaskGroup};

/// Parse a rendered job document.
///
/// Accepts both the wrapped form produced by `nomad job run -output`
/// (`{"Job": {...}}`) and a bare job object.
pub fn parse_job(text: &str) -> Result<Job, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(text)?;
    if let Some(inner) = value.as_object_mut().and_then(|obj| obj.remove("Job")) {
        value = inner;
    }
    serde_json::from_value(value)
}

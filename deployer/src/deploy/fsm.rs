//! Finite state machine for a single deploy attempt

use serde::{Deserialize, Serialize};

use crate::errors::DeployError;

/// Attempt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Nothing done yet
    Start,

    /// Configuration snapshot resolved
    ConfigResolved,

    /// Template variables merged
    VariablesMerged,

    /// Job specification rendered
    Rendered,

    /// Task environments injected
    EnvironmentInjected,

    /// Tracking metadata applied
    Tagged,

    /// Scheduler reported a successful rollout
    Submitted,

    /// Result record produced
    Mapped,

    /// Attempt failed
    Aborted,
}

/// Attempt event
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    Resolve,
    Merge,
    Render,
    Inject,
    Tag,
    Submit,
    Map,
    Abort(String),
}

/// Deploy attempt FSM. Every transition moves forward; there are no retries.
#[derive(Debug, Clone)]
pub struct AttemptFsm {
    state: AttemptState,
    error: Option<String>,
}

impl AttemptFsm {
    /// Create a new FSM in the start state
    pub fn new() -> Self {
        Self {
            state: AttemptState::Start,
            error: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Get error message if the attempt was aborted
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, AttemptState::Mapped | AttemptState::Aborted)
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: AttemptEvent) -> Result<AttemptState, DeployError> {
        use AttemptEvent as E;
        use AttemptState as S;

        let new_state = match (self.state, &event) {
            (S::Start, E::Resolve) => S::ConfigResolved,
            (S::ConfigResolved, E::Merge) => S::VariablesMerged,
            (S::VariablesMerged, E::Render) => S::Rendered,
            (S::Rendered, E::Inject) => S::EnvironmentInjected,
            (S::EnvironmentInjected, E::Tag) => S::Tagged,
            (S::Tagged, E::Submit) => S::Submitted,
            (S::Submitted, E::Map) => S::Mapped,

            (state, E::Abort(err)) if state != S::Mapped && state != S::Aborted => {
                self.error = Some(err.clone());
                S::Aborted
            }

            (state, event) => {
                return Err(DeployError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = new_state;
        Ok(new_state)
    }
}

impl Default for AttemptFsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fsm_happy_path() {
        let mut fsm = AttemptFsm::new();
        let events = [
            (AttemptEvent::Resolve, AttemptState::ConfigResolved),
            (AttemptEvent::Merge, AttemptState::VariablesMerged),
            (AttemptEvent::Render, AttemptState::Rendered),
            (AttemptEvent::Inject, AttemptState::EnvironmentInjected),
            (AttemptEvent::Tag, AttemptState::Tagged),
            (AttemptEvent::Submit, AttemptState::Submitted),
            (AttemptEvent::Map, AttemptState::Mapped),
        ];

        for (event, expected) in events {
            assert!(!fsm.is_terminal());
            assert_eq!(fsm.process(event).unwrap(), expected);
        }
        assert!(fsm.is_terminal());
        assert!(fsm.error().is_none());
    }

    #[test]
    fn test_fsm_abort() {
        let mut fsm = AttemptFsm::new();
        fsm.process(AttemptEvent::Resolve).unwrap();
        fsm.process(AttemptEvent::Abort("render failed".to_string()))
            .unwrap();

        assert_eq!(fsm.state(), AttemptState::Aborted);
        assert_eq!(fsm.error(), Some("render failed"));
        assert!(fsm.is_terminal());
    }
}

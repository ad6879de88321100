//! # Request Phases
//!
//! Per-request lifecycle of `SendDcDm`:
//!
//! ```text
//! Received → Creating → Querying → Aggregating → Replied
//!     └──────────┴──────────┴───────────┴──────→ Failed
//! ```
//!
//! Nothing is persisted between requests; the tracker lives on the stack of
//! the handling task.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPhase {
    Received,
    Creating,
    Querying,
    Aggregating,
    Replied,
    Failed,
}

impl RequestPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestPhase::Replied | RequestPhase::Failed)
    }

    /// The single forward successor, if any.
    pub fn successor(&self) -> Option<RequestPhase> {
        match self {
            RequestPhase::Received => Some(RequestPhase::Creating),
            RequestPhase::Creating => Some(RequestPhase::Querying),
            RequestPhase::Querying => Some(RequestPhase::Aggregating),
            RequestPhase::Aggregating => Some(RequestPhase::Replied),
            RequestPhase::Replied | RequestPhase::Failed => None,
        }
    }

    pub fn can_transition_to(&self, next: RequestPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == RequestPhase::Failed || self.successor() == Some(next)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPhase::Received => "received",
            RequestPhase::Creating => "creating",
            RequestPhase::Querying => "querying",
            RequestPhase::Aggregating => "aggregating",
            RequestPhase::Replied => "replied",
            RequestPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request through its phases.
#[derive(Debug)]
pub struct PhaseTracker {
    request_id: String,
    current: RequestPhase,
    /// Phase that was active when the request failed.
    failed_in: Option<RequestPhase>,
}

impl PhaseTracker {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            current: RequestPhase::Received,
            failed_in: None,
        }
    }

    pub fn current(&self) -> RequestPhase {
        self.current
    }

    pub fn failed_in(&self) -> Option<RequestPhase> {
        self.failed_in
    }

    /// Move to the next forward phase. Returns the phase entered.
    ///
    /// Calling this from a terminal phase is a no-op that returns the
    /// terminal phase.
    pub fn advance(&mut self) -> RequestPhase {
        if let Some(next) = self.current.successor() {
            tracing::trace!(
                request_id = %self.request_id,
                from = %self.current,
                to = %next,
                "[gl-03] phase transition"
            );
            self.current = next;
        }
        self.current
    }

    /// Short-circuit to `Failed`, remembering where it happened.
    pub fn fail(&mut self) -> RequestPhase {
        if !self.current.is_terminal() {
            self.failed_in = Some(self.current);
            self.current = RequestPhase::Failed;
        }
        self.failed_in.unwrap_or(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = PhaseTracker::new("req-1");
        assert_eq!(tracker.current(), RequestPhase::Received);
        assert_eq!(tracker.advance(), RequestPhase::Creating);
        assert_eq!(tracker.advance(), RequestPhase::Querying);
        assert_eq!(tracker.advance(), RequestPhase::Aggregating);
        assert_eq!(tracker.advance(), RequestPhase::Replied);
        assert_eq!(tracker.advance(), RequestPhase::Replied);
    }

    #[test]
    fn test_fail_remembers_phase() {
        let mut tracker = PhaseTracker::new("req-2");
        tracker.advance();
        tracker.advance();
        assert_eq!(tracker.fail(), RequestPhase::Querying);
        assert_eq!(tracker.current(), RequestPhase::Failed);
        assert_eq!(tracker.failed_in(), Some(RequestPhase::Querying));

        // Terminal: no further movement.
        assert_eq!(tracker.advance(), RequestPhase::Failed);
    }

    #[test]
    fn test_transition_table() {
        use RequestPhase::*;
        assert!(Received.can_transition_to(Creating));
        assert!(Creating.can_transition_to(Failed));
        assert!(!Received.can_transition_to(Querying));
        assert!(!Replied.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Received));
    }
}

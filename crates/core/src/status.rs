//! Task states reported by the generation gateway.
//!
//! The gateway reports task status as an uppercase string. Unknown values
//! are preserved as [`TaskState::Unknown`] so callers can treat them as a
//! terminal failure instead of erroring out of the poll loop.

/// Status string: task accepted but not started.
pub const STATE_NOT_START: &str = "NOT_START";
/// Status string: task queued on the gateway.
pub const STATE_SUBMITTED: &str = "SUBMITTED";
/// Status string: task rendering, progress available.
pub const STATE_IN_PROGRESS: &str = "IN_PROGRESS";
/// Status string: task finished with a composite result image.
pub const STATE_SUCCESS: &str = "SUCCESS";
/// Status string: task failed on the gateway side.
pub const STATE_FAILURE: &str = "FAILURE";

/// Lifecycle state of a generation task as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Accepted, not yet started.
    NotStart,
    /// Queued on the gateway.
    Submitted,
    /// Rendering; a progress percentage and coarse preview may be available.
    InProgress,
    /// Finished; the final composite image URL is available.
    Success,
    /// Failed on the gateway side.
    Failure,
    /// A status string this client does not recognize.
    Unknown,
}

impl TaskState {
    /// Parse a gateway status string.
    ///
    /// Anything outside the five documented values maps to
    /// [`TaskState::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            STATE_NOT_START => Self::NotStart,
            STATE_SUBMITTED => Self::Submitted,
            STATE_IN_PROGRESS => Self::InProgress,
            STATE_SUCCESS => Self::Success,
            STATE_FAILURE => Self::Failure,
            _ => Self::Unknown,
        }
    }

    /// Whether this state ends the poll loop.
    ///
    /// Unknown states are terminal: continuing to poll a task whose status
    /// we cannot interpret would never converge.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_states() {
        assert_eq!(TaskState::parse("NOT_START"), TaskState::NotStart);
        assert_eq!(TaskState::parse("SUBMITTED"), TaskState::Submitted);
        assert_eq!(TaskState::parse("IN_PROGRESS"), TaskState::InProgress);
        assert_eq!(TaskState::parse("SUCCESS"), TaskState::Success);
        assert_eq!(TaskState::parse("FAILURE"), TaskState::Failure);
    }

    #[test]
    fn parse_unknown_state() {
        assert_eq!(TaskState::parse("PAUSED"), TaskState::Unknown);
        assert_eq!(TaskState::parse(""), TaskState::Unknown);
        // Case-sensitive on purpose: the gateway always sends uppercase.
        assert_eq!(TaskState::parse("success"), TaskState::Unknown);
    }

    #[test]
    fn terminal_states() {
        assert!(TaskState::Success.is_terminal());
        assert!(TaskState::Failure.is_terminal());
        assert!(TaskState::Unknown.is_terminal());
        assert!(!TaskState::NotStart.is_terminal());
        assert!(!TaskState::Submitted.is_terminal());
        assert!(!TaskState::InProgress.is_terminal());
    }
}

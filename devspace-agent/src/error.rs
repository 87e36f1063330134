use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Integration is switched off; no network call was attempted.
    #[error("Agent integration disabled")]
    Disabled,

    /// The call exceeded its per-operation budget. Distinct from a
    /// server-returned error so callers can tell a slow agent from a
    /// broken one.
    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
    },

    /// Non-2xx status, malformed body, or an explicit `success: false`
    /// envelope. Transport-level errors are folded in here as well.
    #[error("{reason}")]
    CallFailed { reason: String },
}

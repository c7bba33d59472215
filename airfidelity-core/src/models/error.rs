use thiserror::Error;

/// Errors surfaced by the arbitration engine's fallible edges.
///
/// Event handling itself never fails: unexpected device state degrades to
/// fallback values and is corrected on the next observed event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    #[error("invalid arbitration policy: {0}")]
    InvalidPolicy(String),

    #[error("engine stopped")]
    EngineStopped,

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("io error: {0}")]
    Io(String),
}

use thiserror::Error;

/// Errors raised inside the toolbox that are not plain user input mistakes.
///
/// User-facing problems (bad arguments, cooldowns, unknown ids) are answered with a text
/// reply and never surface as a [`ToolboxError`].
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// The host reported an empty map rotation.
    #[error("map rotation is empty")]
    EmptyRotation,

    /// The host advance action failed for a reason other than cancellation.
    #[error("map advance failed: {0}")]
    Advance(String),

    /// Internal error (lock poisoning, unexpected conditions)
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = ToolboxError> = std::result::Result<T, E>;

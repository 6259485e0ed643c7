use thiserror::Error;

/// Errors surfaced by the watcher.
///
/// The only error a view ever renders is a failed status fetch. The other
/// variants are reported to the caller directly and never reach a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VigilError {
    /// The status source could not retrieve the payment status. No
    /// distinction between network, authorization, or not-found.
    #[error("status fetch failed: {0}")]
    StatusFetch(String),

    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("checker is no longer running")]
    CheckerStopped,
}

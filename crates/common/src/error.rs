use thiserror::Error;

/// Boundary errors for the advisory core. None of these are fatal to the
/// process; each is recovered at the boundary where it occurs.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// A required field is missing or empty. Rejected before computation,
    /// never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote prediction service failed or returned an error payload.
    /// The upstream text is carried verbatim when available.
    #[error("prediction service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The live log channel dropped. Recovered by reconnecting.
    #[error("log stream disconnected: {0}")]
    StreamDisconnected(String),

    /// The log snapshot medium is unreadable or unwritable. The store keeps
    /// operating on its in-memory view for the session.
    #[error("log persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CovenantError {
    /// A constructor argument is outside its allowed bounds.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Connection lifecycle misuse, such as closing an already-closed
    /// connection.
    #[error("connection state error: {0}")]
    State(String),
    /// Network or request execution error from `reqwest`, raised while
    /// dispatching a command. Interface-class: the command never reached
    /// validation.
    #[error("request proxy error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The connection is closed or not yet opened, the response body could
    /// not be decoded, or the envelope lacks a usable `data` shape.
    #[error("interface error: {0}")]
    Interface(String),
    /// The gateway rejected the command: the envelope carried
    /// `success: false`, or the HTTP status was non-ok even though the
    /// envelope said otherwise.
    #[error("operational error: {context}: {detail}")]
    Operational {
        /// Which of the two ok-packet checks failed.
        context: String,
        /// Server status text or HTTP reason phrase.
        detail: String,
    },
}

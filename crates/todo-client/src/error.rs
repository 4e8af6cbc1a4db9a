use thiserror::Error;

/// Errors surfaced by the client data layer.
///
/// Every variant owns plain data so a settled query result, including a
/// failure, can sit in the shared cache and be cloned out to each consumer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The server returned 404: the requested todo does not exist.
    #[error("todo not found")]
    NotFound,

    /// Any other non-2xx status. The message is taken from the server's
    /// `{"error": ...}` body when present.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// A second update for the same todo was refused while the first is
    /// still in flight.
    #[error("an update for todo {0} is already in flight")]
    UpdateInFlight(i64),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

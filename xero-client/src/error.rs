//! Error taxonomy for Xero API operations

use std::collections::HashMap;

/// Errors raised by request building, response classification and decoding.
///
/// Transport-level failures (connection refused, TLS, timeouts) are carried
/// transparently in [`Error::Transport`]; everything else is a typed outcome
/// of the exchange and keeps the server's response text where it is useful
/// for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP 400. The body usually carries a validation report.
    #[error("bad request: {body}")]
    BadRequest { body: String },

    /// HTTP 401.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP 403.
    #[error("forbidden")]
    Forbidden,

    /// HTTP 404.
    #[error("not found")]
    NotFound,

    /// HTTP 500 (after the one-time fallback without the structured Accept
    /// header, where applicable).
    #[error("internal server error")]
    InternalError,

    /// HTTP 501.
    #[error("not implemented by the remote API")]
    NotImplemented,

    /// HTTP 503 with a decodable form-encoded body.
    #[error("rate limit exceeded")]
    RateLimitExceeded {
        /// Key/value pairs decoded from the response body.
        payload: HashMap<String, Vec<String>>,
    },

    /// HTTP 503 with an empty or undecodable body.
    #[error("service not available")]
    ServiceNotAvailable,

    /// Any status code outside the classification table.
    #[error("unknown response: HTTP {status}")]
    UnknownResponse { status: u16, body: String },

    /// A leaf value failed type coercion during decoding. Never silently
    /// degraded to a default.
    #[error("cannot decode field {field:?} from {value:?}")]
    DecodeFailure { field: String, value: String },

    /// A single-record fetch structurally resolved to more than one entry.
    #[error("query for a single record returned multiple results")]
    MultipleResultsForSingleGet,

    /// The response body could not be parsed as a document at all, or an
    /// outbound document could not be produced.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Failure below the classification layer: signing or I/O.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Convenience result type for Xero operations.
pub type Result<T> = std::result::Result<T, Error>;

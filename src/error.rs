use thiserror::Error;

/// Represents the kind of error that can occur while serving a connection.
#[derive(Error, Debug)]
pub enum HttpError {
    /// There was a generic IO error on the socket.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening address could not be resolved.
    #[error("address resolution failed: {0}")]
    AddressResolution(String),

    /// None of the resolved addresses could be bound.
    #[error("no available address")]
    NoAvailableAddress,

    /// Accepting a new connection failed.
    #[error("accept error: {0}")]
    Accept(#[source] std::io::Error),

    /// The peer closed the connection before the head was complete.
    #[error("connection closed by client")]
    ConnectionClosedByClient,

    /// The request line does not consist of method, target and version.
    #[error("request line is malformed")]
    MalformedRequestLine,

    /// A header line has no colon separating name and value.
    #[error("header is malformed")]
    MalformedHeader,

    /// The Content-Length header is not a valid length.
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),

    /// The query string cannot be decoded into the requested type.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The size-limited reader used up its byte budget.
    #[error("max length is reached")]
    MaxLenReached,

    /// The announced body is larger than the configured maximum.
    #[error("body of {size} bytes exceeds the limit of {max} bytes")]
    BodyTooLarge {
        /// Announced body size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The server configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Broad classification of an [`HttpError`], used to decide how loudly a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Socket level failures: resolution, bind, accept, read and write errors.
    Transport,
    /// The peer sent something that is not a valid request head.
    Protocol,
    /// The peer went away mid-request.
    Peer,
    /// A configured size budget was exhausted.
    ResourceLimit,
}

impl HttpError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_)
            | Self::AddressResolution(_)
            | Self::NoAvailableAddress
            | Self::Accept(_)
            | Self::Config(_) => ErrorCategory::Transport,
            Self::MalformedRequestLine
            | Self::MalformedHeader
            | Self::InvalidContentLength(_)
            | Self::InvalidQuery(_) => ErrorCategory::Protocol,
            Self::ConnectionClosedByClient => ErrorCategory::Peer,
            Self::MaxLenReached | Self::BodyTooLarge { .. } => ErrorCategory::ResourceLimit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::error::{ErrorCategory, HttpError};

    #[test]
    fn categories_follow_taxonomy() {
        let cases = [
            (HttpError::Io(io::Error::other("boom")), ErrorCategory::Transport),
            (HttpError::NoAvailableAddress, ErrorCategory::Transport),
            (HttpError::Accept(io::Error::other("boom")), ErrorCategory::Transport),
            (HttpError::MalformedRequestLine, ErrorCategory::Protocol),
            (HttpError::MalformedHeader, ErrorCategory::Protocol),
            (HttpError::ConnectionClosedByClient, ErrorCategory::Peer),
            (HttpError::MaxLenReached, ErrorCategory::ResourceLimit),
            (HttpError::BodyTooLarge { size: 10, max: 5 }, ErrorCategory::ResourceLimit),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected, "wrong category for {error}");
        }
    }

    #[test]
    fn limit_error_is_distinct_from_io_error() {
        let err = HttpError::MaxLenReached;
        assert!(!matches!(err, HttpError::Io(_)));
        assert_eq!(err.to_string(), "max length is reached");
    }
}

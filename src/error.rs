use thiserror::Error;

/// Errors surfaced by [`crate::Client`] operations.
///
/// Every failure propagates directly to the caller; nothing is caught and
/// retried internally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client could not be constructed: missing or unusable API key,
    /// invalid proxy URL, or the HTTP session failed to initialize.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport reported that the request deadline expired. The
    /// client performs no retry; callers decide whether to reissue.
    #[error("request timed out")]
    Timeout,

    /// Any other transport-level fault: DNS failure, connection refused,
    /// connection reset. The underlying fault is available via `source()`.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service rejected the API key (HTTP 403).
    #[error("authorization rejected by the service (HTTP {status})")]
    Authorization { status: u16 },

    /// The requested area is outside the service's geographic coverage
    /// (HTTP 404).
    #[error("requested area is outside service coverage (HTTP {status})")]
    Coverage { status: u16 },

    /// Any other non-200 response.
    #[error("service returned HTTP {status}")]
    Http { status: u16 },

    /// A 200 response whose envelope carried a status other than `"OK"`.
    #[error("service reported status {status:?} instead of \"OK\"")]
    UnexpectedStatus { status: String },

    /// The response body was not valid JSON, or the envelope lacked a
    /// string `status` field.
    #[error("could not decode service response: {message}")]
    Decode { message: String },

    /// A documented capability whose request path is not wired up yet.
    #[error("{feature} is not implemented yet")]
    Unimplemented { feature: &'static str },
}

impl ApiError {
    /// HTTP status code for the response-shaped variants, `None` for the
    /// rest.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authorization { status }
            | ApiError::Coverage { status }
            | ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        assert_eq!(ApiError::Authorization { status: 403 }.status(), Some(403));
        assert_eq!(ApiError::Coverage { status: 404 }.status(), Some(404));
        assert_eq!(ApiError::Http { status: 500 }.status(), Some(500));
        assert_eq!(ApiError::Timeout.status(), None);
        assert_eq!(ApiError::Config("no key".into()).status(), None);
    }

    #[test]
    fn test_display_formats() {
        let err = ApiError::UnexpectedStatus {
            status: "ERROR".into(),
        };
        assert_eq!(
            err.to_string(),
            "service reported status \"ERROR\" instead of \"OK\""
        );

        let err = ApiError::Unimplemented {
            feature: "polygon query",
        };
        assert_eq!(err.to_string(), "polygon query is not implemented yet");
    }
}

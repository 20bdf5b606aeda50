use reqwest::StatusCode;
use thiserror::Error;

/// Why a call to the FAQ service failed.
///
/// The widget surfaces every variant the same way; the distinction only
/// reaches logs and the command line.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid api base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service responded with status {status}")]
    Status { status: StatusCode },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Short machine-friendly label, used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { .. } => "invalid_base_url",
            Self::Request(e) if e.is_timeout() => "timeout",
            Self::Request(e) if e.is_connect() => "connect",
            Self::Request(_) => "request",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code() {
        let err = TransportError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert!(err.to_string().contains("503"));
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn decode_error_converts_from_serde() {
        let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: TransportError = serde_err.into();
        assert_eq!(err.kind(), "decode");
    }
}

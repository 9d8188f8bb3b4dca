use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum V0Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error(
        "v0 API rate limit exceeded. Please wait a moment before making another request or check your usage limits."
    )]
    RateLimited,

    #[error(
        "v0 API server error (HTTP {status}). The service may be temporarily unavailable. Please try again in a few minutes."
    )]
    Server { status: u16 },

    #[error(
        "v0 API request timed out. Component generation may be taking longer than expected. Please try again."
    )]
    Timeout,

    #[error("{0}")]
    MalformedResponse(String),

    #[error("Network request to the v0 API failed ({0}). Please check your network connection and try again.")]
    Network(String),

    #[error(
        "v0 API request failed with HTTP {status}: {message}. Please check the request parameters and try again."
    )]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Config(String),
}

impl V0Error {
    /// Returns true for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Server { .. } => true,
            Self::Timeout => true,
            Self::Network(_) => true,
            // Upstream is 4xx only (5xx maps to Server): a caller problem that
            // retrying the same request cannot fix.
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }
}

/// Which request shape produced a failure. Multimodal requests carry extra
/// classification rules (payload size, media type) and a different auth hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Text,
    Multimodal,
}

/// A transport-level failure captured where the HTTP call returns, before any
/// stringification. Classified into a [`V0Error`] by [`TransportFailure::classify`].
#[derive(Debug)]
pub enum TransportFailure {
    /// The provider answered with a non-success status.
    Status { status: StatusCode, body: String },
    /// The request never produced a status (connect, read, timeout).
    Io(reqwest::Error),
}

/// Cap on provider error text echoed back to the caller.
const MAX_ERROR_DETAIL_CHARS: usize = 300;

impl TransportFailure {
    pub fn classify(self, mode: RequestMode) -> V0Error {
        match self {
            Self::Status { status, body } => classify_status(status, &body, mode),
            Self::Io(e) => {
                if e.is_timeout() {
                    V0Error::Timeout
                } else {
                    // reqwest errors can embed the request URL; strip it
                    V0Error::Network(e.without_url().to_string())
                }
            }
        }
    }
}

fn classify_status(status: StatusCode, body: &str, mode: RequestMode) -> V0Error {
    let detail = error_detail(body);
    let lower = detail.to_lowercase();

    match status.as_u16() {
        401 => V0Error::AuthFailed(match mode {
            RequestMode::Text => "v0 API authentication failed. Please verify your V0_API_KEY is valid and has not expired.".to_string(),
            RequestMode::Multimodal => "v0 API authentication failed for multimodal request. Please verify your V0_API_KEY is valid and supports vision capabilities.".to_string(),
        }),
        429 => V0Error::RateLimited,
        413 if mode == RequestMode::Multimodal => payload_too_large(),
        415 if mode == RequestMode::Multimodal => unsupported_media(),
        s if s >= 500 => V0Error::Server { status: s },
        s => {
            if mode == RequestMode::Multimodal && lower.contains("payload too large") {
                payload_too_large()
            } else if mode == RequestMode::Multimodal && lower.contains("unsupported media type") {
                unsupported_media()
            } else if s == 408 || lower.contains("timeout") || lower.contains("timed out") {
                V0Error::Timeout
            } else {
                V0Error::Upstream {
                    status: s,
                    message: truncate_detail(&detail),
                }
            }
        }
    }
}

fn payload_too_large() -> V0Error {
    V0Error::Validation(
        "Image file size too large. Please compress images or use smaller images for component generation."
            .to_string(),
    )
}

fn unsupported_media() -> V0Error {
    V0Error::Validation(
        "Image format not supported. Please use JPEG, PNG, or WebP images for component generation."
            .to_string(),
    )
}

/// Pull the human-readable message out of an error body. Providers send
/// `{"error": "..."}`, `{"error": {"message": "..."}}`, `{"message": "..."}`
/// or plain text.
pub fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let from_error = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj @ serde_json::Value::Object(_)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    };

    from_error
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= MAX_ERROR_DETAIL_CHARS {
        return detail.to_string();
    }
    let head: String = detail.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    format!("{head}...")
}

//! Classification of raw call failures into structured errors.
//!
//! The network layer produces [`RawFailure`] values; the classifier maps
//! them onto the error taxonomy in priority order: cancellation/timeout,
//! connectivity, HTTP status, then everything else.

use crate::envelope::Envelope;
use crate::error::StructuredError;

/// Raw failure produced by a single network attempt.
#[derive(Debug)]
pub enum RawFailure {
    /// The caller's cancellation signal fired mid-call
    Cancelled,
    /// The per-call timeout elapsed
    Timeout,
    /// Connection-level failure from the HTTP client
    Transport(reqwest::Error),
    /// The carrier answered with a non-2xx status
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// The carrier answered 2xx with a body that is not JSON
    Malformed(serde_json::Error),
}

/// Converts a [`RawFailure`] into a [`StructuredError`].
///
/// The originating model and method are always recorded in the error's
/// context map; HTTP failures additionally carry the numeric status and a
/// body snippet.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    const BODY_SNIPPET_LEN: usize = 256;

    /// Classify a raw failure against the taxonomy.
    #[must_use]
    pub fn classify(&self, failure: RawFailure, envelope: &Envelope) -> StructuredError {
        let error = match failure {
            RawFailure::Cancelled => StructuredError::request_timeout("request cancelled by caller"),
            RawFailure::Timeout => StructuredError::request_timeout("request timed out"),
            RawFailure::Transport(source) => {
                if source.is_timeout() {
                    StructuredError::request_timeout(source.to_string())
                } else if source.is_connect() || source.is_request() {
                    StructuredError::network(source.to_string())
                } else {
                    StructuredError::unknown(source.to_string())
                }
            }
            RawFailure::Status { status, body } => {
                StructuredError::http_status(status, format!("carrier returned HTTP {status}"))
                    .with_context("body", Self::snippet(&body))
            }
            RawFailure::Malformed(source) => {
                StructuredError::unknown(format!("malformed carrier payload: {source}"))
            }
        };

        error
            .with_context("model", envelope.target.model.clone())
            .with_context("method", envelope.target.method.clone())
    }

    fn snippet(body: &str) -> String {
        if body.len() <= Self::BODY_SNIPPET_LEN {
            return body.to_string();
        }
        let mut end = Self::BODY_SNIPPET_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body[..end].to_string()
    }
}

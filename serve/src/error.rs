//! Transport-level error kinds (§7: `MalformedRequest`, `UnknownRoute`,
//! `UnknownModel`, `ListenerAddressInUse`, `ListenerOtherFailure`).

use thiserror::Error;

/// Errors the HTTP layer turns directly into a response, as opposed to
/// [`gateway_core::GatewayError`] which the engine already folds into
/// fallback content.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The raw bytes didn't parse as an HTTP request (§4.1). Rendered as a
    /// plaintext 400.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The body exceeded the sanity limit before a complete request could
    /// be assembled (§4.1 hardening note). Rendered as a plaintext 413.
    #[error("request body too large")]
    PayloadTooLarge,

    /// JSON body failed to decode into the expected wire shape (§7).
    /// Rendered as a 400 with the OpenAI-ish `{error:{message}}` envelope.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// No route matched (§7 `UnknownRoute`). Rendered as a plaintext 404.
    #[error("not found")]
    NotFound,

    /// `/v1/models/{id}` (or its Ollama mirror) looked up an id this
    /// gateway doesn't advertise (§7 `UnknownModel`). Rendered as a 404
    /// with the OpenAI error envelope.
    #[error("model not found: {0}")]
    UnknownModel(String),
}

impl HttpError {
    /// Renders this error as the response the caller should actually
    /// receive (§7). Malformed transport errors get plaintext bodies;
    /// request-shape errors get the OpenAI-ish JSON error envelope since
    /// both wire dialects' clients expect a JSON body back.
    pub fn into_response(self) -> crate::http::Response {
        use crate::http::Response;
        match self {
            HttpError::MalformedRequest(msg) => Response::plain(400, msg),
            HttpError::PayloadTooLarge => Response::plain(413, "request body too large"),
            HttpError::InvalidBody(msg) => Response::json(
                400,
                &serde_json::json!({ "error": { "message": msg, "type": "invalid_request_error" } }),
            ),
            HttpError::NotFound => Response::plain(404, "not found"),
            HttpError::UnknownModel(_id) => Response::json(
                404,
                &serde_json::json!({
                    "error": { "message": "Model not found", "type": "invalid_request_error" }
                }),
            ),
        }
    }
}

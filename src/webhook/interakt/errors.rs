use derive_more::{Display, Error};
use ntex::{http, web};
use serde_json::json;

/// The only failures surfaced to Interakt as non-2xx responses
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    #[display("malformed body: {_0}")]
    MalformedBody(#[error(not(source))] String),
    #[display("missing signature header")]
    MissingSignature,
    #[display("invalid signature")]
    InvalidSignature,
}

impl WebhookError {
    fn code(&self) -> &'static str {
        match self {
            WebhookError::MalformedBody(_) => "malformed_body",
            WebhookError::MissingSignature => "missing_signature",
            WebhookError::InvalidSignature => "invalid_signature",
        }
    }
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        logfire::warn!("Rejected webhook request: {error}", error = self.to_string());

        web::HttpResponse::build(self.status_code()).json(&json!({
            "ok": false,
            "error": self.code(),
        }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::MalformedBody(_) => http::StatusCode::BAD_REQUEST,
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                http::StatusCode::UNAUTHORIZED
            }
        }
    }
}

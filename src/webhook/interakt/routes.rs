//! Interakt webhook endpoint handler
//!
//! # Security
//!
//! When a shared secret is configured, the HMAC-SHA256 signature of the raw
//! body is checked before anything else. Under [`SignatureMode::WarnOnly`] a
//! missing or mismatched signature is only logged; under
//! [`SignatureMode::Enforce`] the request is rejected with 401.
//!
//! # Processing
//!
//! Processed synchronously: the reply is part of the response body, so the
//! completion call is awaited before answering.

use super::{
    errors::WebhookError,
    handler, payload,
    security::{self, SignatureCheck, SignatureMode},
};
use crate::{consts, metric, webhook::AppState};
use ntex::{http::header, util::Bytes, web};
use tracing::Instrument;

/// Webhook receiver endpoint (POST)
///
/// # Returns
/// - 200 with the JSON envelope for every body that can be interpreted
/// - 400 if the body is neither JSON nor form data
/// - 401 if the signature check fails in enforce mode
#[web::post("/webhook")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = logfire::span!("interakt webhook {request_id}", request_id = request_id);

    receive_event(&req, &body, &app_state).instrument(span).await
}

async fn receive_event(
    req: &web::HttpRequest,
    body: &Bytes,
    app_state: &AppState,
) -> Result<web::HttpResponse, web::Error> {
    let signature = req
        .headers()
        .get(consts::INTERAKT_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let check = security::check_signature(
        signature,
        body,
        app_state.settings.signature_secret.as_deref(),
    );
    metric::incr_signature_statds(check.as_str());

    let mode = app_state.settings.signature_mode;
    if !check.is_allowed(mode) {
        return Err(match check {
            SignatureCheck::Missing => WebhookError::MissingSignature.into(),
            _ => WebhookError::InvalidSignature.into(),
        });
    }
    if mode == SignatureMode::WarnOnly
        && matches!(check, SignatureCheck::Missing | SignatureCheck::Invalid)
    {
        logfire::warn!(
            "Webhook signature {check}, processing anyway (warn-only mode)",
            check = check.as_str()
        );
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let event = payload::parse_body(content_type, body)?;

    logfire::info!(
        "Webhook received: {payload}",
        payload = serde_json::to_string_pretty(&event).unwrap_or_default()
    );

    let response = handler::respond(&event, &app_state.policy, &app_state.composer).await;

    Ok(web::HttpResponse::Ok().json(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::WebhookSettings,
        server,
        services::{CompletionService, MockCompletionService},
        webhook::{
            interakt::{
                composer::ReplyComposer,
                routing::{RoutingMode, RoutingPolicy},
                schemas::WebhookResponse,
            },
            routes,
        },
    };
    use hmac::{Hmac, Mac};
    use ntex::{http::StatusCode, web::test};
    use serde_json::json;
    use sha2::Sha256;
    use std::{sync::Arc, time::Duration};

    fn app_state(
        mode: RoutingMode,
        completion: Option<Box<dyn CompletionService>>,
        settings: WebhookSettings,
    ) -> AppState {
        AppState {
            settings,
            policy: Arc::new(RoutingPolicy::from_mode(mode, "#test").unwrap()),
            composer: Arc::new(ReplyComposer::new(completion, Duration::from_secs(5))),
        }
    }

    fn signed_settings(mode: SignatureMode) -> WebhookSettings {
        WebhookSettings {
            signature_secret: Some("s3cret".to_string()),
            signature_mode: mode,
        }
    }

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(b"s3cret").unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    async fn post(state: AppState, req: test::TestRequest) -> (StatusCode, Bytes) {
        let app = test::init_service(
            web::App::new()
                .state(state)
                .configure(routes::interakt)
                .service(server::index),
        )
        .await;

        let resp = test::call_service(&app, req.uri("/interakt/webhook").to_request()).await;
        let status = resp.status();
        (status, test::read_body(resp).await)
    }

    fn json_request(body: &str) -> test::TestRequest {
        test::TestRequest::post()
            .header("content-type", "application/json")
            .set_payload(body.to_string())
    }

    fn envelope(body: &Bytes) -> WebhookResponse {
        serde_json::from_slice(body).unwrap()
    }

    #[ntex::test]
    async fn test_health_check() {
        let app = test::init_service(web::App::new().service(server::index)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, Bytes::from(consts::HEALTH_MESSAGE));
    }

    #[ntex::test]
    async fn test_greeting_with_canned_reply() {
        let state = app_state(RoutingMode::Greeting, None, WebhookSettings::default());

        let (status, body) = post(state, json_request(r#"{"text":"hello"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            json!({"ok": true, "reply": consts::REPLY_GREETING})
        );
    }

    #[ntex::test]
    async fn test_marker_message_generated_reply() {
        let mut mock = MockCompletionService::new();
        mock.expect_complete_text()
            .with(mockall::predicate::eq("please check"))
            .times(1)
            .returning(|_| Ok("On it!".to_string()));
        let state = app_state(
            RoutingMode::Marker,
            Some(Box::new(mock)),
            WebhookSettings::default(),
        );

        let (status, body) = post(
            state,
            json_request(r##"{"messages":[{"text":{"body":"#test please check"}}]}"##),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = envelope(&body);
        assert!(response.ok);
        assert_eq!(response.reply.as_deref(), Some("On it!"));
        assert_eq!(response.ignored, None);
    }

    #[ntex::test]
    async fn test_empty_object_is_ignored() {
        let state = app_state(RoutingMode::Layered, None, WebhookSettings::default());

        let (status, body) = post(state, json_request("{}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope(&body),
            WebhookResponse {
                ok: true,
                reply: Some(consts::REPLY_IGNORED_NO_TEXT.to_string()),
                ignored: Some(true),
                error: None,
            }
        );
    }

    #[ntex::test]
    async fn test_backend_error_is_still_200() {
        let mut mock = MockCompletionService::new();
        mock.expect_complete_text()
            .returning(|_| Err(anyhow::anyhow!("Completion API returned error status 500")));
        let state = app_state(
            RoutingMode::Layered,
            Some(Box::new(mock)),
            WebhookSettings::default(),
        );

        let (status, body) = post(state, json_request(r##"{"text":"#test any update?"}"##)).await;

        assert_eq!(status, StatusCode::OK);
        let response = envelope(&body);
        assert_eq!(
            response.reply.as_deref(),
            Some(consts::REPLY_COMPLETION_FALLBACK)
        );
        assert_eq!(response.error.as_deref(), Some("completion_failed"));
    }

    #[ntex::test]
    async fn test_form_body_and_wrong_content_type() {
        let state = app_state(RoutingMode::Layered, None, WebhookSettings::default());
        let (status, body) = post(
            state,
            test::TestRequest::post()
                .header("content-type", "application/x-www-form-urlencoded")
                .set_payload("text=hey+there"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope(&body).reply.as_deref(), Some(consts::REPLY_GREETING));

        let state = app_state(RoutingMode::Layered, None, WebhookSettings::default());
        let (status, body) = post(
            state,
            test::TestRequest::post()
                .header("content-type", "text/plain")
                .set_payload(r#"{"message_text":"where is my order"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope(&body).reply.as_deref(),
            Some(consts::REPLY_DEFAULT_ACK)
        );
    }

    #[ntex::test]
    async fn test_unparseable_body_is_rejected() {
        let state = app_state(RoutingMode::Layered, None, WebhookSettings::default());

        let (status, body) = post(state, json_request("{\"text\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            json!({"ok": false, "error": "malformed_body"})
        );
    }

    #[ntex::test]
    async fn test_warn_only_signature_mode_keeps_processing() {
        for req in [
            json_request(r#"{"text":"hello"}"#),
            json_request(r#"{"text":"hello"}"#).header(consts::INTERAKT_SIGNATURE_HEADER, "deadbeef"),
        ] {
            let state = app_state(
                RoutingMode::Layered,
                None,
                signed_settings(SignatureMode::WarnOnly),
            );

            let (status, body) = post(state, req).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(envelope(&body).reply.as_deref(), Some(consts::REPLY_GREETING));
        }
    }

    #[ntex::test]
    async fn test_enforce_signature_mode() {
        let payload = r#"{"text":"hello"}"#;

        let state = app_state(RoutingMode::Layered, None, signed_settings(SignatureMode::Enforce));
        let (status, _) = post(state, json_request(payload)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let state = app_state(RoutingMode::Layered, None, signed_settings(SignatureMode::Enforce));
        let (status, body) = post(
            state,
            json_request(payload).header(consts::INTERAKT_SIGNATURE_HEADER, "sha256=00ff"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap()["error"],
            "invalid_signature"
        );

        let state = app_state(RoutingMode::Layered, None, signed_settings(SignatureMode::Enforce));
        let (status, body) = post(
            state,
            json_request(payload).header(consts::INTERAKT_SIGNATURE_HEADER, sign(payload.as_bytes())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope(&body).reply.as_deref(), Some(consts::REPLY_GREETING));
    }
}

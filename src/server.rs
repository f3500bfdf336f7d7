//! Handlers not linked to a specific integration

use crate::consts;
use ntex::web;
use serde_json::json;

/// Liveness check
#[web::get("/")]
pub async fn index() -> impl web::Responder {
    web::HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(consts::HEALTH_MESSAGE)
}

/// JSON 404 for urls not defined
pub async fn serve_not_found() -> web::HttpResponse {
    web::HttpResponse::NotFound().json(&json!({
        "ok": false,
        "error": "not_found",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::{http::StatusCode, web::test};

    #[ntex::test]
    async fn test_unknown_post_is_json_404() {
        let app = test::init_service(
            web::App::new().service(index).default_service(
                web::route()
                    .guard(web::guard::Not(web::guard::Get()))
                    .to(serve_not_found),
            ),
        )
        .await;

        let req = test::TestRequest::post().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&test::read_body(resp).await).unwrap(),
            json!({"ok": false, "error": "not_found"})
        );
    }
}

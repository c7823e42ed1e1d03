// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{IssuedLinkResponse, LoginForm},
    state::AppState,
};

pub mod admin;
pub mod decision;
pub mod forward;
pub mod health;
pub mod link;
pub mod login;

pub fn router(state: AppState) -> Router {
    let prefix = state.config.route_prefix.clone();

    let gateway_routes = Router::new()
        .route("/login", get(login::login_page).post(login::login_submit))
        .route("/auth", any(forward::forward_auth))
        .route("/admin", post(admin::issue_token))
        .route("/link", get(link::follow_link))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let routes = if prefix.is_empty() {
        gateway_routes
    } else {
        Router::new().nest(&prefix, gateway_routes)
    };

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login_page,
        login::login_submit,
        forward::forward_auth,
        admin::issue_token,
        link::follow_link,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            IssuedLinkResponse,
            LoginForm,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    tags(
        (name = "Login", description = "Password login"),
        (name = "Forward Auth", description = "Reverse proxy authorization"),
        (name = "Admin", description = "Capability link issuance"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::TokenCodec,
        config::{GatewayConfig, Mode},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
        response::Response,
    };
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    fn auth_request(headers: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/auth");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = cookie {
            builder = builder.header(COOKIE, format!("_nestor_token={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn cookie_token(response: &Response) -> String {
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        cookie
            .strip_prefix("_nestor_token=")
            .and_then(|rest| rest.strip_suffix("; Path=/"))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::for_tests(Mode::Subrequest));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn login_post_sets_full_site_cookie() {
        let state = AppState::for_tests(Mode::Subrequest);
        let codec = TokenCodec::new(&state.config.secret_key).unwrap();

        let response = send(
            router(state),
            Request::post("/login")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("password=hunter2&redir=%2Fgallery%2F"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/gallery/");
        let capabilities = codec.decode(&cookie_token(&response)).unwrap();
        assert_eq!(capabilities.iter().collect::<Vec<_>>(), vec!["/"]);
    }

    #[tokio::test]
    async fn subrequest_granted_path_returns_empty_200() {
        let state = AppState::for_tests(Mode::Subrequest);
        let token = state.token_for(&["/gallery"]);

        let response = send(
            router(state),
            auth_request(&[("X-Original-URI", "/gallery/2024")], Some(&token)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn subrequest_other_path_returns_empty_401() {
        let state = AppState::for_tests(Mode::Subrequest);
        let token = state.token_for(&["/other"]);

        let response = send(
            router(state),
            auth_request(&[("X-Original-URI", "/gallery/2024")], Some(&token)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn domain_without_cookie_redirects_to_central_login() {
        let app = router(AppState::for_tests(Mode::Domain));

        let response = send(
            app,
            auth_request(
                &[
                    ("X-Forwarded-Proto", "https"),
                    ("X-Forwarded-Host", "photos.example.com"),
                    ("X-Forwarded-Uri", "/x"),
                ],
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://auth.example.com/login\
             ?redir=https%3A%2F%2Fphotos.example.com%2Fx\
             &overlay=https%3A%2F%2Fphotos.example.com%2F_nestor%2Foverlay"
        );
    }

    #[tokio::test]
    async fn overlay_callback_sets_cookie_and_redirects() {
        let state = AppState::for_tests(Mode::Domain);
        let token = state.token_for(&["/"]);
        let uri = format!(
            "/_nestor/overlay?{}",
            url::form_urlencoded::Serializer::new(String::new())
                .append_pair("redir", "https://photos.example.com/x")
                .append_pair("token", &token)
                .finish()
        );

        let response = send(
            router(state),
            auth_request(
                &[
                    ("X-Forwarded-Proto", "https"),
                    ("X-Forwarded-Host", "photos.example.com"),
                    ("X-Forwarded-Uri", uri.as_str()),
                ],
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://photos.example.com/x");
        assert_eq!(cookie_token(&response), token);
    }

    #[tokio::test]
    async fn overlay_callback_without_token_is_an_error_not_a_redirect() {
        let app = router(AppState::for_tests(Mode::Domain));
        let response = send(
            app,
            auth_request(
                &[
                    ("X-Forwarded-Proto", "https"),
                    ("X-Forwarded-Host", "photos.example.com"),
                    ("X-Forwarded-Uri", "/_nestor/overlay?redir=%2Fx"),
                ],
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[tokio::test]
    async fn domain_missing_forwarded_headers_is_explicit_400() {
        let app = router(AppState::for_tests(Mode::Domain));
        let response = send(app, auth_request(&[("X-Forwarded-Uri", "/x")], None)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("X-Forwarded-Proto"));
    }

    #[tokio::test]
    async fn admin_without_valid_header_is_rejected_without_body() {
        for header in [None, Some("wrong")] {
            let app = router(AppState::for_tests(Mode::Subrequest));
            let mut builder = Request::post("/admin").header(CONTENT_TYPE, "application/json");
            if let Some(value) = header {
                builder = builder.header("X-NESTOR-ADMIN", value);
            }
            let response = send(app, builder.body(Body::from(r#"["/"]"#)).unwrap()).await;

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn admin_link_round_trip_grants_scoped_access() {
        let state = AppState::for_tests(Mode::Subrequest);
        let app = router(state);

        let response = send(
            app.clone(),
            Request::post("/admin")
                .header(CONTENT_TYPE, "application/json")
                .header("X-NESTOR-ADMIN", "admin-secret")
                .body(Body::from(r#"["/album/2024/"]"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let issued: IssuedLinkResponse = serde_json::from_slice(&body).unwrap();

        let link_path = issued.url.strip_prefix("https://auth.example.com").unwrap();
        let response = send(
            app.clone(),
            Request::get(link_path).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/album/2024/");
        let token = cookie_token(&response);
        assert_eq!(token, issued.authkey);

        let allowed = send(
            app.clone(),
            auth_request(&[("X-Original-URI", "/album/2024/cover.jpg")], Some(&token)),
        )
        .await;
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = send(
            app,
            auth_request(&[("X-Original-URI", "/album/2023/")], Some(&token)),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_rejects_non_string_list_body() {
        let app = router(AppState::for_tests(Mode::Subrequest));
        let response = send(
            app,
            Request::post("/admin")
                .header(CONTENT_TYPE, "application/json")
                .header("X-NESTOR-ADMIN", "admin-secret")
                .body(Body::from(r#"{"paths":["/"]}"#))
                .unwrap(),
        )
        .await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn routes_nest_under_prefix() {
        let mut config = GatewayConfig::for_tests(Mode::Subrequest);
        config.route_prefix = "/nestor".to_string();
        let app = router(AppState::new(config).unwrap());

        let response = send(
            app.clone(),
            Request::get("/nestor/health/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(app, Request::get("/health/live").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(AppState::for_tests(Mode::Subrequest));
        let response = send(app, auth_request(&[], None)).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}

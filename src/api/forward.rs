// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Forward-auth endpoint queried by the reverse proxy.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use super::decision::render;
use crate::{
    auth::{ForwardedRequest, TokenCookie},
    state::AppState,
};

/// Decide whether the proxied request may proceed.
///
/// Subrequest mode answers an empty 200 or 401. Domain mode additionally
/// redirects to the login page and completes the overlay handshake.
#[utoipa::path(
    get,
    path = "/auth",
    tag = "Forward Auth",
    params(
        ("X-Original-URI" = Option<String>, Header, description = "Requested path (subrequest mode)"),
        ("X-Forwarded-Uri" = Option<String>, Header, description = "Requested URI"),
        ("X-Forwarded-Proto" = Option<String>, Header, description = "Scheme (domain mode)"),
        ("X-Forwarded-Host" = Option<String>, Header, description = "Host (domain mode)")
    ),
    responses(
        (status = 200, description = "Request may proceed"),
        (status = 302, description = "Redirect to login or overlay cookie delivery"),
        (status = 400, description = "Proxy did not forward required headers"),
        (status = 401, description = "Request denied")
    )
)]
pub async fn forward_auth(
    State(state): State<AppState>,
    TokenCookie(token): TokenCookie,
    headers: HeaderMap,
) -> Response {
    let request = ForwardedRequest::from_headers(&headers, token);
    match state.gateway.decide(&request) {
        Ok(decision) => render(decision, &state.config.cookie_name),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use axum::http::{HeaderValue, StatusCode};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[tokio::test]
    async fn subrequest_valid_cookie_returns_200() {
        let state = AppState::for_tests(Mode::Subrequest);
        let token = state.token_for(&["/gallery"]);
        let response = forward_auth(
            State(state),
            TokenCookie(Some(token)),
            headers(&[("x-original-uri", "/gallery/2024")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn domain_missing_host_returns_400() {
        let state = AppState::for_tests(Mode::Domain);
        let response = forward_auth(
            State(state),
            TokenCookie(None),
            headers(&[("x-forwarded-proto", "https"), ("x-forwarded-uri", "/x")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

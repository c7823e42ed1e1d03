// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rendering of [`AuthDecision`]s into HTTP responses.

use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::{auth::AuthDecision, error::ApiError};

/// Turn a decision into the response the proxy or browser sees.
///
/// `Allow`/`Deny` are empty 200/401 bodies, which is all `auth_request`
/// style proxies look at.
pub fn render(decision: AuthDecision, cookie_name: &str) -> Response {
    match decision {
        AuthDecision::Allow => StatusCode::OK.into_response(),
        AuthDecision::Deny => StatusCode::UNAUTHORIZED.into_response(),
        AuthDecision::RedirectToLogin(url) => redirect(&url, None),
        AuthDecision::SetCookieAndRedirect { token, url } => {
            redirect(&url, Some(&session_cookie(cookie_name, &token)))
        }
    }
}

/// `302 Found` to `location`, optionally setting a cookie.
pub fn redirect(location: &str, cookie: Option<&str>) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        return ApiError::bad_request("Redirect target is not a valid header value").into_response();
    };

    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(LOCATION, location);

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(_) => {
                return ApiError::bad_request("Token is not a valid cookie value").into_response();
            }
        }
    }

    response
}

/// Session cookie (no expiry) scoped to the whole site.
pub fn session_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Path=/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_and_deny_are_bare_status_codes() {
        assert_eq!(render(AuthDecision::Allow, "c").status(), StatusCode::OK);
        assert_eq!(render(AuthDecision::Deny, "c").status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn login_redirect_sets_location_only() {
        let response = render(
            AuthDecision::RedirectToLogin("https://auth.example.com/login?redir=x".to_string()),
            "c",
        );
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://auth.example.com/login?redir=x"
        );
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn set_cookie_and_redirect_sets_both_headers() {
        let response = render(
            AuthDecision::SetCookieAndRedirect {
                token: "abc+/=".to_string(),
                url: "/gallery/".to_string(),
            },
            "_nestor_token",
        );
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/gallery/");
        assert_eq!(response.headers()[SET_COOKIE], "_nestor_token=abc+/=; Path=/");
    }

    #[test]
    fn unrepresentable_location_is_a_bad_request() {
        let response = redirect("/bad\nheader", None);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login page and password login.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use super::decision::{redirect, render};
use crate::{
    auth::{AuthDecision, OverlayHandshake, TokenCookie},
    models::{non_empty, LoginForm, LoginQuery},
    state::AppState,
};

/// Where to send the browser once it holds `token`.
///
/// With an overlay target the token has to travel to the protected domain
/// first; otherwise the browser goes straight to `redir`.
fn post_login_target(redir: Option<String>, overlay: Option<String>, token: &str) -> String {
    let redir = redir.unwrap_or_else(|| "/".to_string());
    match overlay {
        Some(overlay) => OverlayHandshake::delivery_url(&overlay, &redir, token),
        None => redir,
    }
}

/// Show the login form, or skip it when the browser is already logged in.
///
/// The skip only applies without an overlay target: delivering a token to
/// another domain always goes through a password check.
#[utoipa::path(
    get,
    path = "/login",
    tag = "Login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form"),
        (status = 302, description = "Already authenticated; forwarded to target")
    )
)]
pub async fn login_page(
    State(state): State<AppState>,
    TokenCookie(token): TokenCookie,
    Query(query): Query<LoginQuery>,
) -> Response {
    let redir = non_empty(query.redir);
    let overlay = non_empty(query.overlay);

    if overlay.is_none() && token.is_some_and(|t| state.issuer.verify(&t).is_some()) {
        tracing::debug!("already authenticated, skipping form");
        return redirect(redir.as_deref().unwrap_or("/"), None);
    }

    Html(login_html(
        redir.as_deref(),
        overlay.as_deref(),
        state.config.background_url.as_deref(),
        None,
    ))
    .into_response()
}

/// Check the password and install a full-site token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged in; cookie set"),
        (status = 401, description = "Wrong password; form shown again")
    )
)]
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let redir = non_empty(form.redir);
    let overlay = non_empty(form.overlay);

    match state.issuer.issue_from_login(&form.password) {
        Ok(token) => {
            let url = post_login_target(redir, overlay, &token);
            render(
                AuthDecision::SetCookieAndRedirect { token, url },
                &state.config.cookie_name,
            )
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Html(login_html(
                redir.as_deref(),
                overlay.as_deref(),
                state.config.background_url.as_deref(),
                Some("Wrong password"),
            )),
        )
            .into_response(),
    }
}

fn login_html(
    redir: Option<&str>,
    overlay: Option<&str>,
    background_url: Option<&str>,
    error: Option<&str>,
) -> String {
    let background = background_url
        .map(|url| format!(" style=\"background-image: url('{}')\"", escape(url)))
        .unwrap_or_default();
    let error = error
        .map(|msg| format!("<p class=\"error\">{}</p>", escape(msg)))
        .unwrap_or_default();
    let hidden = |name: &str, value: Option<&str>| {
        value
            .map(|v| format!("<input type=\"hidden\" name=\"{name}\" value=\"{}\">", escape(v)))
            .unwrap_or_default()
    };

    format!(
        "<!DOCTYPE html>\n\
         <html><head><meta charset=\"utf-8\"><title>Login</title></head>\n\
         <body{background}>\n\
         <form method=\"post\">\n\
         {error}\n\
         <input type=\"password\" name=\"password\" autofocus>\n\
         {redir}\n\
         {overlay}\n\
         <button type=\"submit\">Login</button>\n\
         </form>\n\
         </body></html>\n",
        redir = hidden("redir", redir),
        overlay = hidden("overlay", overlay),
    )
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

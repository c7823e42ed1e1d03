// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use super::decision::render;
use crate::{
    auth::AuthDecision,
    models::{non_empty, LinkQuery},
    state::AppState,
};

/// Install an admin-issued token as a cookie and redirect.
///
/// Without `redir` the browser is sent to the token's first capability.
#[utoipa::path(
    get,
    path = "/link",
    tag = "Admin",
    params(LinkQuery),
    responses(
        (status = 302, description = "Cookie set"),
        (status = 400, description = "Missing authkey"),
        (status = 401, description = "Invalid authkey")
    )
)]
pub async fn follow_link(State(state): State<AppState>, Query(query): Query<LinkQuery>) -> Response {
    match state.issuer.issue_from_link(&query.authkey) {
        Ok((token, capabilities)) => {
            let url = non_empty(query.redir)
                .or_else(|| capabilities.first().map(str::to_string))
                .unwrap_or_else(|| "/".to_string());
            render(
                AuthDecision::SetCookieAndRedirect { token, url },
                &state.config.cookie_name,
            )
        }
        Err(e) => e.into_response(),
    }
}

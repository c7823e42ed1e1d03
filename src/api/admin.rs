// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only token issuance.
//!
//! Lets an operator mint a token for an arbitrary set of path prefixes and
//! hand it out as a link, without sharing the login password.

use axum::{extract::State, Json};

use crate::{
    auth::{AdminOnly, AuthError},
    models::IssuedLinkResponse,
    state::AppState,
};

/// Issue a token for the given path prefixes.
///
/// The body is used verbatim as the capability list.
#[utoipa::path(
    post,
    path = "/admin",
    tag = "Admin",
    request_body = Vec<String>,
    params(
        ("X-NESTOR-ADMIN" = String, Header, description = "Admin credential")
    ),
    responses(
        (status = 200, description = "Token issued", body = IssuedLinkResponse),
        (status = 401, description = "Missing or wrong admin credential"),
        (status = 422, description = "Body is not a JSON array of strings")
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    AdminOnly(credential): AdminOnly,
    Json(paths): Json<Vec<String>>,
) -> Result<Json<IssuedLinkResponse>, AuthError> {
    let issued = state.issuer.issue_from_admin(Some(&credential), paths)?;
    Ok(Json(IssuedLinkResponse {
        authkey: issued.token,
        url: issued.url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::CapabilityList, config::Mode};

    #[tokio::test]
    async fn issues_token_for_requested_paths() {
        let state = AppState::for_tests(Mode::Subrequest);
        let Json(body) = issue_token(
            State(state.clone()),
            AdminOnly("admin-secret".to_string()),
            Json(vec!["/album/2024/".to_string()]),
        )
        .await
        .unwrap();

        let capabilities = state.issuer.verify(&body.authkey).unwrap();
        assert_eq!(capabilities, CapabilityList::new(vec!["/album/2024/".to_string()]));
        assert!(body.url.starts_with("https://auth.example.com/link?authkey="));
    }

    #[tokio::test]
    async fn issuer_rechecks_credential() {
        let state = AppState::for_tests(Mode::Subrequest);
        let result = issue_token(
            State(state),
            AdminOnly("forged".to_string()),
            Json(vec!["/".to_string()]),
        )
        .await;
        assert!(matches!(result, Err(AuthError::WrongCredential)));
    }
}

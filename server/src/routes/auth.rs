//! Session-cookie authentication for API routes.

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use model::GENERIC_FAILURE_MESSAGE;

use crate::routes::ApiFailure;
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
}

impl AuthUser {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

fn unauthorized() -> ApiFailure {
    ApiFailure::new(StatusCode::UNAUTHORIZED, "Unauthorized")
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(unauthorized());
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|e| ApiFailure::internal(&e, GENERIC_FAILURE_MESSAGE))?
            .ok_or_else(unauthorized)?;

        Ok(Self { user })
    }
}

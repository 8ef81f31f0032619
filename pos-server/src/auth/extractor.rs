//! JWT Extractor
//!
//! Lets handlers take [`CurrentUser`] as an argument

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::middleware::authenticate_headers;
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already authenticated by `require_auth`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate_headers(&parts.headers, &state.get_jwt_service(), &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use super::guard::authorize;
use crate::error::AppError;
use crate::state::AppState;

/// Path segment that names the owner on every `/api/{user_id}/...` route.
pub const OWNER_PATH_PARAM: &str = "user_id";

/// The verified owner of the `/api/{user_id}/...` resources being accessed.
///
/// Extracting it runs the authorization guard: the bearer token must be valid
/// (otherwise 401) and its subject must equal the `{user_id}` path segment
/// (otherwise 404). Handlers take it as their first argument so the check
/// happens before the request body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope(pub Uuid);

impl OwnerScope {
    pub fn owner_id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for OwnerScope {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => {
                let err = AppError::Internal("AppState is not registered".to_string());
                return ready(Err(err.into()));
            }
        };

        let claimed_owner = req.match_info().get(OWNER_PATH_PARAM).unwrap_or_default();
        let result: Result<Self, ActixError> =
            authorize(&state.tokens, bearer_token(req), claimed_owner)
                .map(OwnerScope)
                .map_err(|e| AppError::from(e).into());
        ready(result)
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header, if any.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

use actix_web::{post, web, HttpResponse, Responder};
use log::info;

use crate::{
    auth::{LoginForm, RegisterRequest, RegisteredUser, TokenResponse},
    error::AppError,
    state::AppState,
};

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{"user_id": ..., "username": ...}`.
/// - `400 Bad Request`: the username is already taken.
/// - `422 Unprocessable Entity`: username or password does not meet the rules.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = state
        .credentials
        .register(&body.username, &body.password)
        .await?;

    Ok(HttpResponse::Created().json(RegisteredUser {
        user_id: user.id,
        username: user.username,
    }))
}

/// Exchange a username and password for a bearer token
///
/// Takes an `application/x-www-form-urlencoded` body with `username` and
/// `password`.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": ..., "token_type": "bearer", "expires_in": ...}`.
/// - `401 Unauthorized`: unknown username or wrong password (indistinguishable).
#[post("/token")]
pub async fn token(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = state
        .credentials
        .authenticate(&form.username, &form.password)
        .await?;

    let access_token = state.tokens.issue_default(user.id)?;
    info!("issued access token for user {}", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        access_token,
        state.tokens.default_ttl().num_seconds(),
    )))
}

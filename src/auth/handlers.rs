use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Credentials, PublicUser, UserData},
        jwt::JwtKeys,
        middleware::{expired_session_cookie, session_cookie},
        password::{hash_password, verify_password},
        repo_types::User,
        services::{is_valid_email, is_valid_password},
    },
    error::AppError,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Presence and email shape checks shared by register and login.
fn required_credentials(
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(String, String), AppError> {
    let creds = payload.map(|Json(c)| c).unwrap_or_default();
    match (creds.email, creds.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            if !is_valid_email(&email) {
                warn!(%email, "invalid email");
                return Err(AppError::Validation("Invalid email format".into()));
            }
            Ok((email, password))
        }
        _ => Err(AppError::Validation("Email and password are required".into())),
    }
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = required_credentials(payload)?;

    if !is_valid_password(&password) {
        warn!("password too short");
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    if User::find_by_email(state.store.as_ref(), &email).await.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict(
            "User with this email already exists".into(),
        ));
    }

    let hash = hash_password(&password)?;
    let user = User::create(state.store.as_ref(), &email, &hash).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.email)?;
    let jar = jar.add(session_cookie(token, &state.config));

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        jar,
        ApiResponse::created(UserData { user: user.into() })
            .with_message("User registered successfully"),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = required_credentials(payload)?;

    let Some(user) = User::find_by_email(state.store.as_ref(), &email).await else {
        warn!(%email, "login unknown email");
        return Err(AppError::Authentication("Invalid email or password".into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::Authentication("Invalid email or password".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.email)?;
    let jar = jar.add(session_cookie(token.clone(), &state.config));

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let mut public = PublicUser::from(user);
    public.token = Some(token);
    Ok((
        jar,
        ApiResponse::ok(UserData { user: public }).with_message("Login successful"),
    ))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(expired_session_cookie()),
        ApiResponse::message("Logout successful"),
    )
}

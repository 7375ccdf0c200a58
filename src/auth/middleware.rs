use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use super::{extractors::Identity, jwt::JwtKeys};
use crate::{config::AppConfig, error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "token";
pub const LOGIN_PAGE: &str = "/login";

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/logout",
    "/api/health",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Api,
    Page,
}

pub fn classify(path: &str) -> Access {
    if PUBLIC_PATHS.contains(&path) {
        Access::Public
    } else if path == "/api" || path.starts_with("/api/") {
        Access::Api
    } else {
        Access::Page
    }
}

/// Session cookie carrying a freshly signed token.
pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(config.jwt.ttl_days))
        .path("/")
        .build()
}

/// Removal cookie; the path has to match the one the session was set with.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Runs before every handler. Public paths pass through untouched; every
/// other path needs a valid session token, which is turned into an
/// [`Identity`] in the request extensions.
pub async fn gatekeeper(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let access = classify(&path);
    if access == Access::Public {
        return next.run(request).await;
    }

    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        debug!(%path, "no session token");
        return match access {
            Access::Api => AppError::Authentication("Authentication required".into()).into_response(),
            _ => Redirect::to(LOGIN_PAGE).into_response(),
        };
    };

    let keys = JwtKeys::from_ref(&state);
    match keys.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(Identity {
                user_id: claims.sub,
                email: claims.email,
            });
            next.run(request).await
        }
        Err(e) => {
            warn!(%path, error = %e, "session token rejected");
            match access {
                Access::Api => AppError::Authentication("Invalid token".into()).into_response(),
                _ => (jar.remove(expired_session_cookie()), Redirect::to(LOGIN_PAGE)).into_response(),
            }
        }
    }
}

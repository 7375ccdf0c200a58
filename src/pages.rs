//! Bare HTML pages. They exist so the gatekeeper's page handling (redirect
//! to `/login`, cookie removal) has real routes behind it; the UI proper
//! lives in a separate frontend.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::{
    auth::{middleware::LOGIN_PAGE, repo_types::User, AuthUser},
    boards::{repo_types::Board, services::load_owned_board},
    state::AppState,
    tasks::repo_types::{Task, TaskStatus},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login))
        .route("/register", get(register))
        .route("/dashboard", get(dashboard))
        .route("/board/:board_id", get(board))
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title}</title></head><body><h1>{title}</h1>{body}</body></html>"
    ))
}

/// Minimal escaping for user-supplied text.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn landing() -> Html<String> {
    page(
        "Taskboard",
        r#"<p><a href="/login">Sign in</a> or <a href="/register">create an account</a>.</p>"#,
    )
}

async fn login() -> Html<String> {
    page("Sign in", "<p>POST /api/auth/login with {email, password}.</p>")
}

async fn register() -> Html<String> {
    page("Register", "<p>POST /api/auth/register with {email, password}.</p>")
}

/// A valid token for a user that is no longer stored goes back to sign in.
async fn dashboard(State(state): State<AppState>, AuthUser(who): AuthUser) -> Response {
    let Some(user) = User::find_by_id(state.store.as_ref(), who.user_id).await else {
        tracing::warn!(user_id = %who.user_id, email = %who.email, "session for unknown user");
        return Redirect::to(LOGIN_PAGE).into_response();
    };
    let boards = Board::list_by_owner(state.store.as_ref(), user.id).await;
    let items: String = boards
        .iter()
        .map(|b| format!(r#"<li><a href="/board/{}">{}</a></li>"#, b.id, escape(&b.name)))
        .collect();
    page(
        "Your boards",
        &format!("<p>Signed in as {}</p><ul>{items}</ul>", escape(&user.email)),
    )
    .into_response()
}

async fn board(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(board_id): Path<String>,
) -> Response {
    let board = match load_owned_board(state.store.as_ref(), &board_id, &who).await {
        Ok(b) => b,
        Err(e) => return (e.status(), page("Board", &escape(&e.to_string()))).into_response(),
    };
    let tasks = Task::list_by_board(state.store.as_ref(), board.id).await;
    let items: String = tasks
        .iter()
        .map(|t| {
            let mark = if t.status == TaskStatus::Completed { "x" } else { " " };
            format!("<li>[{mark}] {}</li>", escape(&t.title))
        })
        .collect();
    page(&escape(&board.name), &format!("<ul>{items}</ul>")).into_response()
}

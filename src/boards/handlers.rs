use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{BoardData, BoardList, BoardRequest},
    repo_types::{Board, BoardUpdate},
    services::{load_owned_board, validate_board_name},
};
use crate::{
    auth::AuthUser,
    error::AppError,
    response::{json_body, ApiResponse},
    state::AppState,
};

pub fn board_routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/:board_id", put(update_board).delete(delete_board))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn list_boards(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
) -> Result<ApiResponse<BoardList>, AppError> {
    let boards = Board::list_by_owner(state.store.as_ref(), who.user_id).await;
    Ok(ApiResponse::ok(BoardList { boards }))
}

#[instrument(skip(state, who, payload), fields(user_id = %who.user_id))]
pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    payload: Result<Json<BoardRequest>, JsonRejection>,
) -> Result<ApiResponse<BoardData>, AppError> {
    let name = validate_board_name(json_body(payload)?.name.as_ref())?;
    let board = Board::create(state.store.as_ref(), &name, who.user_id).await?;

    info!(board_id = %board.id, "board created");
    Ok(ApiResponse::created(BoardData { board }).with_message("Board created successfully"))
}

#[instrument(skip(state, who, payload), fields(user_id = %who.user_id))]
pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(board_id): Path<String>,
    payload: Result<Json<BoardRequest>, JsonRejection>,
) -> Result<ApiResponse<BoardData>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;
    let name = validate_board_name(json_body(payload)?.name.as_ref())?;

    let board = Board::update(
        state.store.as_ref(),
        board.id,
        BoardUpdate { name: Some(name) },
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Board not found".into()))?;

    info!(board_id = %board.id, "board renamed");
    Ok(ApiResponse::ok(BoardData { board }).with_message("Board updated successfully"))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(board_id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;

    if !Board::delete(state.store.as_ref(), board.id).await? {
        return Err(AppError::Internal(anyhow::anyhow!(
            "board {} vanished before delete",
            board.id
        )));
    }

    info!(board_id = %board.id, "board deleted with its tasks");
    Ok(ApiResponse::message("Board deleted successfully"))
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateTaskRequest, TaskData, TaskList, UpdateTaskRequest},
    repo_types::{NewTask, Task, TaskUpdate},
    services::{
        load_board_task, normalize_description, normalize_due_date, parse_status, validate_title,
    },
};
use crate::{
    auth::AuthUser,
    boards::services::load_owned_board,
    error::AppError,
    response::{json_body, ApiResponse},
    state::AppState,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/boards/:board_id/tasks", get(list_tasks).post(create_task))
        .route(
            "/boards/:board_id/tasks/:task_id",
            put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(board_id): Path<String>,
) -> Result<ApiResponse<TaskList>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;
    let tasks = Task::list_by_board(state.store.as_ref(), board.id).await;
    Ok(ApiResponse::ok(TaskList { tasks }))
}

#[instrument(skip(state, who, payload), fields(user_id = %who.user_id))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(board_id): Path<String>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<ApiResponse<TaskData>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;
    let req = json_body(payload)?;

    let title = validate_title(req.title.as_ref())?;
    let description = req
        .description
        .as_ref()
        .map(normalize_description)
        .transpose()?
        .flatten();
    let due_date = req
        .due_date
        .as_ref()
        .map(normalize_due_date)
        .transpose()?
        .flatten();

    let task = Task::create(
        state.store.as_ref(),
        NewTask {
            description,
            due_date,
            ..NewTask::titled(board.id, &title)
        },
    )
    .await?;

    info!(task_id = %task.id, board_id = %board.id, "task created");
    Ok(ApiResponse::created(TaskData { task }).with_message("Task created successfully"))
}

/// Validates every provided field before anything is written, so a bad
/// field leaves the stored task as it was.
fn task_update(req: UpdateTaskRequest) -> Result<TaskUpdate, AppError> {
    let title = req
        .title
        .as_ref()
        .map(|t| validate_title(Some(t)))
        .transpose()?;
    let description = req
        .description
        .as_ref()
        .map(normalize_description)
        .transpose()?;
    let status = req.status.as_ref().map(parse_status).transpose()?;
    let due_date = req.due_date.as_ref().map(normalize_due_date).transpose()?;
    Ok(TaskUpdate {
        title,
        description,
        status,
        due_date,
    })
}

#[instrument(skip(state, who, payload), fields(user_id = %who.user_id))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path((board_id, task_id)): Path<(String, String)>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<ApiResponse<TaskData>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;
    let task = load_board_task(state.store.as_ref(), &board, &task_id).await?;
    let changes = task_update(json_body(payload)?)?;

    let task = Task::update(state.store.as_ref(), task.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    info!(task_id = %task.id, status = ?task.status, "task updated");
    Ok(ApiResponse::ok(TaskData { task }).with_message("Task updated successfully"))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path((board_id, task_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>, AppError> {
    let board = load_owned_board(state.store.as_ref(), &board_id, &who).await?;
    let task = load_board_task(state.store.as_ref(), &board, &task_id).await?;

    if !Task::delete(state.store.as_ref(), task.id).await? {
        return Err(AppError::Internal(anyhow::anyhow!(
            "task {} vanished before delete",
            task.id
        )));
    }

    info!(task_id = %task.id, board_id = %board.id, "task deleted");
    Ok(ApiResponse::message("Task deleted successfully"))
}

use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use tracing::warn;

use crate::{
    boards::{repo_types::Board, services::parse_id},
    error::AppError,
    storage::DocumentStore,
    tasks::repo_types::{Task, TaskStatus},
};

pub const MAX_TITLE: usize = 200;
pub const MAX_DESCRIPTION: usize = 1000;

/// Loads a task and checks it sits on `board`, which the caller has
/// already checked for ownership.
pub async fn load_board_task(
    store: &dyn DocumentStore,
    board: &Board,
    raw_task_id: &str,
) -> Result<Task, AppError> {
    let task = match parse_id(raw_task_id) {
        Some(id) => Task::find_by_id(store, id).await,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if task.board_id != board.id {
        warn!(task_id = %task.id, board_id = %board.id, "task on a different board");
        return Err(AppError::Authorization(
            "Task does not belong to this board".into(),
        ));
    }
    Ok(task)
}

/// Non-strings count as missing.
pub fn validate_title(title: Option<&Value>) -> Result<String, AppError> {
    let title = title.and_then(Value::as_str).map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::Validation("Task title is required".into()));
    }
    if title.chars().count() > MAX_TITLE {
        return Err(AppError::Validation(
            "Task title must be less than 200 characters".into(),
        ));
    }
    Ok(title.to_string())
}

/// Checks the raw length, then trims. `null` and blank descriptions become
/// `None`.
pub fn normalize_description(description: &Value) -> Result<Option<String>, AppError> {
    let description = match description {
        Value::Null => return Ok(None),
        Value::String(s) => s,
        _ => {
            return Err(AppError::Validation(
                "Task description must be a string".into(),
            ))
        }
    };
    if description.chars().count() > MAX_DESCRIPTION {
        return Err(AppError::Validation(
            "Task description must be less than 1000 characters".into(),
        ));
    }
    let trimmed = description.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

pub fn parse_status(status: &Value) -> Result<TaskStatus, AppError> {
    status.as_str().and_then(TaskStatus::parse).ok_or_else(|| {
        AppError::Validation(r#"Invalid status. Must be "pending" or "completed""#.into())
    })
}

/// Accepts a calendar date, a local date-time, or an RFC 3339 timestamp.
pub fn is_valid_due_date(value: &str) -> bool {
    let date = format_description!("[year]-[month]-[day]");
    let local_minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    let local_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

    Date::parse(value, date).is_ok()
        || OffsetDateTime::parse(value, &Rfc3339).is_ok()
        || PrimitiveDateTime::parse(value, local_minutes).is_ok()
        || PrimitiveDateTime::parse(value, local_seconds).is_ok()
}

/// `null` and empty strings clear the due date; anything else has to be
/// a string that parses.
pub fn normalize_due_date(value: &Value) -> Result<Option<String>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) if is_valid_due_date(s) => Ok(Some(s.clone())),
        _ => Err(AppError::Validation("Invalid due date format".into())),
    }
}

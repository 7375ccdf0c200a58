use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::{auth::Identity, boards::repo_types::Board, error::AppError, storage::DocumentStore};

pub const MAX_BOARD_NAME: usize = 100;

/// Ids that are not UUIDs cannot name a stored record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Existence and owner check every board-scoped handler starts with.
pub async fn load_owned_board(
    store: &dyn DocumentStore,
    raw_id: &str,
    who: &Identity,
) -> Result<Board, AppError> {
    let board = match parse_id(raw_id) {
        Some(id) => Board::find_by_id(store, id).await,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("Board not found".into()))?;

    if board.owner_user_id != who.user_id {
        warn!(board_id = %board.id, user_id = %who.user_id, "board owned by another user");
        return Err(AppError::Authorization("Access denied".into()));
    }
    Ok(board)
}

/// Trimmed board name, or the first rule it breaks. Non-strings count as
/// missing.
pub fn validate_board_name(name: Option<&Value>) -> Result<String, AppError> {
    let name = name.and_then(Value::as_str).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::Validation("Board name is required".into()));
    }
    if name.chars().count() > MAX_BOARD_NAME {
        return Err(AppError::Validation(
            "Board name must be less than 100 characters".into(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(
            validate_board_name(Some(&json!("  Groceries "))).unwrap(),
            "Groceries"
        );
    }

    #[test]
    fn blank_missing_or_non_string_name_is_rejected() {
        for name in [json!(""), json!("   "), json!(123), json!(null), json!(["a"])] {
            let err = validate_board_name(Some(&name)).unwrap_err();
            assert_eq!(err.to_string(), "Board name is required");
        }
        assert!(validate_board_name(None).is_err());
    }

    #[test]
    fn length_is_counted_after_trim() {
        let exact = json!(format!("  {}  ", "x".repeat(100)));
        assert!(validate_board_name(Some(&exact)).is_ok());
        let err = validate_board_name(Some(&json!("x".repeat(101)))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn malformed_id_parses_to_none() {
        assert!(parse_id("not-a-uuid").is_none());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_some());
    }
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Board record in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields a board update may change; `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct BoardUpdate {
    pub name: Option<String>,
}

impl BoardUpdate {
    pub fn apply(self, board: &mut Board) {
        if let Some(name) = self.name {
            board.name = name;
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::boards::repo_types::Board;

/// Fields stay untyped JSON so a wrong type is reported by validation.
#[derive(Debug, Default, Deserialize)]
pub struct BoardRequest {
    #[serde(default)]
    pub name: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct BoardData {
    pub board: Board,
}

#[derive(Debug, Serialize)]
pub struct BoardList {
    pub boards: Vec<Board>,
}

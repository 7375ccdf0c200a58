use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tasks::repo_types::Task;

/// Keeps an explicit `null` as `Some(Value::Null)`. Together with
/// `#[serde(default)]` an absent field stays `None`.
fn present<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

/// Fields stay untyped JSON so a wrong type is reported by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub due_date: Option<Value>,
}

/// `None` means the field was omitted; `Some(Value::Null)` was sent as `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TaskData {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

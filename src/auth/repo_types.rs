use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub email: String,                // stored exactly as registered
    pub password_hash: String,        // Argon2 PHC string
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,   // creation timestamp
}

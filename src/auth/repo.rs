use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::storage::{new_id, now, DocumentStore, StorageError};

impl User {
    /// Find a user by email. Comparison is exact.
    pub async fn find_by_email(store: &dyn DocumentStore, email: &str) -> Option<User> {
        let doc = store.load().await;
        doc.users.into_iter().find(|u| u.email == email)
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: Uuid) -> Option<User> {
        let doc = store.load().await;
        doc.users.into_iter().find(|u| u.id == id)
    }

    /// Create a new user with an already hashed password.
    pub async fn create(
        store: &dyn DocumentStore,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StorageError> {
        let mut doc = store.load().await;
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now(),
        };
        doc.users.push(user.clone());
        store.save(&doc).await?;
        Ok(user)
    }
}

use uuid::Uuid;

use crate::boards::repo_types::{Board, BoardUpdate};
use crate::storage::{new_id, now, DocumentStore, StorageError};

impl Board {
    pub async fn create(
        store: &dyn DocumentStore,
        name: &str,
        owner_user_id: Uuid,
    ) -> Result<Board, StorageError> {
        let mut doc = store.load().await;
        let board = Board {
            id: new_id(),
            name: name.to_string(),
            owner_user_id,
            created_at: now(),
        };
        doc.boards.push(board.clone());
        store.save(&doc).await?;
        Ok(board)
    }

    /// Boards owned by `user_id`, in creation order.
    pub async fn list_by_owner(store: &dyn DocumentStore, user_id: Uuid) -> Vec<Board> {
        let doc = store.load().await;
        doc.boards
            .into_iter()
            .filter(|b| b.owner_user_id == user_id)
            .collect()
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: Uuid) -> Option<Board> {
        let doc = store.load().await;
        doc.boards.into_iter().find(|b| b.id == id)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        id: Uuid,
        changes: BoardUpdate,
    ) -> Result<Option<Board>, StorageError> {
        let mut doc = store.load().await;
        let Some(board) = doc.boards.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        changes.apply(board);
        let updated = board.clone();
        store.save(&doc).await?;
        Ok(Some(updated))
    }

    /// Removes the board and every task on it in a single write.
    pub async fn delete(store: &dyn DocumentStore, id: Uuid) -> Result<bool, StorageError> {
        let mut doc = store.load().await;
        let before = doc.boards.len();
        doc.boards.retain(|b| b.id != id);
        if doc.boards.len() == before {
            return Ok(false);
        }
        doc.tasks.retain(|t| t.board_id != id);
        store.save(&doc).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tasks::repo_types::{NewTask, Task};

    #[tokio::test]
    async fn list_by_owner_filters_other_users() {
        let store = MemoryStore::new();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        Board::create(&store, "Home", ann).await.expect("create");
        Board::create(&store, "Work", bob).await.expect("create");
        Board::create(&store, "Garden", ann).await.expect("create");

        let names: Vec<_> = Board::list_by_owner(&store, ann)
            .await
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Home", "Garden"]);
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing() {
        let store = MemoryStore::new();
        let board = Board::create(&store, "Home", Uuid::new_v4()).await.expect("create");

        let renamed = Board::update(
            &store,
            board.id,
            BoardUpdate {
                name: Some("House".into()),
            },
        )
        .await
        .expect("update")
        .expect("exists");
        assert_eq!(renamed.name, "House");
        assert_eq!(renamed.created_at, board.created_at);

        let untouched = Board::update(&store, board.id, BoardUpdate::default())
            .await
            .expect("update")
            .expect("exists");
        assert_eq!(untouched.name, "House");

        let missing = Board::update(&store, Uuid::new_v4(), BoardUpdate::default())
            .await
            .expect("update");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_tasks() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let board = Board::create(&store, "Home", owner).await.expect("create");
        let other = Board::create(&store, "Work", owner).await.expect("create");

        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let t = Task::create(&store, NewTask::titled(board.id, title))
                .await
                .expect("task");
            ids.push(t.id);
        }
        let kept = Task::create(&store, NewTask::titled(other.id, "keep"))
            .await
            .expect("task");

        assert!(Board::delete(&store, board.id).await.expect("delete"));
        assert!(Board::find_by_id(&store, board.id).await.is_none());
        for id in ids {
            assert!(Task::find_by_id(&store, id).await.is_none());
        }
        assert!(Task::find_by_id(&store, kept.id).await.is_some());

        assert!(!Board::delete(&store, board.id).await.expect("second delete"));
    }
}

use uuid::Uuid;

use crate::storage::{new_id, now, DocumentStore, StorageError};
use crate::tasks::repo_types::{NewTask, Task, TaskStatus, TaskUpdate};

impl Task {
    /// New tasks always start out pending.
    pub async fn create(store: &dyn DocumentStore, new: NewTask) -> Result<Task, StorageError> {
        let mut doc = store.load().await;
        let task = Task {
            id: new_id(),
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            due_date: new.due_date,
            board_id: new.board_id,
            created_at: now(),
        };
        doc.tasks.push(task.clone());
        store.save(&doc).await?;
        Ok(task)
    }

    pub async fn list_by_board(store: &dyn DocumentStore, board_id: Uuid) -> Vec<Task> {
        let doc = store.load().await;
        doc.tasks
            .into_iter()
            .filter(|t| t.board_id == board_id)
            .collect()
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: Uuid) -> Option<Task> {
        let doc = store.load().await;
        doc.tasks.into_iter().find(|t| t.id == id)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        id: Uuid,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, StorageError> {
        let mut doc = store.load().await;
        let Some(task) = doc.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        changes.apply(task);
        let updated = task.clone();
        store.save(&doc).await?;
        Ok(Some(updated))
    }

    pub async fn delete(store: &dyn DocumentStore, id: Uuid) -> Result<bool, StorageError> {
        let mut doc = store.load().await;
        let before = doc.tasks.len();
        doc.tasks.retain(|t| t.id != id);
        if doc.tasks.len() == before {
            return Ok(false);
        }
        store.save(&doc).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn create_starts_pending_with_generated_fields() {
        let store = MemoryStore::new();
        let board_id = Uuid::new_v4();
        let task = Task::create(
            &store,
            NewTask {
                due_date: Some("2099-01-01".into()),
                ..NewTask::titled(board_id, "Buy milk")
            },
        )
        .await
        .expect("create");

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date.as_deref(), Some("2099-01-01"));

        let listed = Task::list_by_board(&store, board_id).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, task.id);
    }

    #[tokio::test]
    async fn update_only_touches_provided_fields() {
        let store = MemoryStore::new();
        let task = Task::create(
            &store,
            NewTask {
                description: Some("two litres".into()),
                due_date: Some("2099-01-01".into()),
                ..NewTask::titled(Uuid::new_v4(), "Buy milk")
            },
        )
        .await
        .expect("create");

        let updated = Task::update(
            &store,
            task.id,
            TaskUpdate {
                status: Some(TaskStatus::Completed),
                due_date: Some(None),
                ..TaskUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("exists");

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description.as_deref(), Some("two litres"));
        assert!(updated.due_date.is_none());
    }

    #[tokio::test]
    async fn missing_task_update_and_delete() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(Task::update(&store, id, TaskUpdate::default())
            .await
            .expect("update")
            .is_none());
        assert!(!Task::delete(&store, id).await.expect("delete"));
    }

    #[tokio::test]
    async fn delete_removes_only_that_task() {
        let store = MemoryStore::new();
        let board_id = Uuid::new_v4();
        let a = Task::create(&store, NewTask::titled(board_id, "a")).await.expect("a");
        let b = Task::create(&store, NewTask::titled(board_id, "b")).await.expect("b");

        assert!(Task::delete(&store, a.id).await.expect("delete"));
        let left = Task::list_by_board(&store, board_id).await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
            board_id: Uuid::new_v4(),
            created_at: now(),
        };
        let v = serde_json::to_value(&task).unwrap();
        assert!(v.get("description").is_none());
        assert!(v.get("dueDate").is_none());
        assert_eq!(v["status"], "pending");
        assert!(v.get("boardId").is_some());
        assert!(v.get("createdAt").is_some());
    }
}

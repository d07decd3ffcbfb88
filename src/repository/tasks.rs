use crate::{
    error::Result,
    models::{NewTask, Task, TaskUpdate},
    remote::{RemoteStore, Table},
    repository::{encode, remove_by_id, replace_by_id, Repository},
};
use log::{debug, warn};
use serde_json::json;
use uuid::Uuid;

impl<S: RemoteStore> Repository<S> {
    pub async fn add_task(&mut self, project_id: Uuid, task: NewTask) -> Result<Task> {
        let mut record = encode(&task)?;
        record["project_id"] = json!(project_id);
        record["user_id"] = json!(self.owner()?);
        record["completed"] = json!(false);

        let task: Task = self.insert(Table::Tasks, record).await?;
        debug!("added task {} to project {}", task.id, project_id);
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn update_task(&mut self, id: Uuid, changes: TaskUpdate) -> Result<Task> {
        let task: Task = self.update(Table::Tasks, id, &changes).await?;
        replace_by_id(&mut self.tasks, task.clone());
        Ok(task)
    }

    /// Flips `completed` based on the cached value. An id missing from the cache is a no-op.
    pub async fn toggle_task(&mut self, id: Uuid) -> Result<()> {
        let completed = match self.tasks.iter().find(|t| t.id == id) {
            Some(task) => task.completed,
            None => {
                warn!("toggle of unknown task {} ignored", id);
                return Ok(());
            }
        };

        let changes = TaskUpdate {
            completed: Some(!completed),
            ..Default::default()
        };
        self.update_task(id, changes).await?;
        Ok(())
    }

    pub async fn delete_task(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(Table::Tasks, id).await?;
        debug!("deleted task {}", id);
        remove_by_id(&mut self.tasks, id);
        Ok(())
    }
}

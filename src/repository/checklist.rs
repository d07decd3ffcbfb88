use crate::{
    error::Result,
    models::ChecklistItem,
    remote::{RemoteStore, Table},
    repository::{decode_written, remove_by_id, replace_by_id, Repository},
};
use log::{debug, warn};
use serde_json::json;
use std::collections::VecDeque;
use uuid::Uuid;

/// Position writes for one reorder, drained strictly front to back.
struct PositionQueue {
    pending: VecDeque<(Uuid, i32)>,
    total: usize,
}

impl PositionQueue {
    fn new(ordered: &[Uuid]) -> PositionQueue {
        let pending: VecDeque<(Uuid, i32)> = ordered
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index as i32))
            .collect();
        let total = pending.len();
        PositionQueue { pending, total }
    }

    fn pop(&mut self) -> Option<(Uuid, i32)> {
        self.pending.pop_front()
    }

    fn done(&self) -> usize {
        self.total - self.pending.len()
    }
}

impl<S: RemoteStore> Repository<S> {
    /// Appends after the project's highest position (positions start at 1).
    pub async fn add_checklist_item(&mut self, project_id: Uuid, text: &str) -> Result<ChecklistItem> {
        let position = self
            .checklist_items
            .iter()
            .filter(|i| i.project_id == project_id)
            .map(|i| i.position)
            .fold(0, i32::max)
            + 1;

        let record = json!({
            "project_id": project_id,
            "user_id": self.owner()?,
            "text": text,
            "position": position,
            "completed": false,
        });
        let item: ChecklistItem = self.insert(Table::ChecklistItems, record).await?;
        debug!("added checklist item {} at {}", item.id, item.position);
        self.checklist_items.push(item.clone());
        Ok(item)
    }

    pub async fn update_checklist_item(&mut self, id: Uuid, text: &str) -> Result<ChecklistItem> {
        let item: ChecklistItem = self
            .update(Table::ChecklistItems, id, &json!({ "text": text }))
            .await?;
        replace_by_id(&mut self.checklist_items, item.clone());
        Ok(item)
    }

    /// Checking an item off removes it: this is a delete, never an update.
    pub async fn toggle_checklist_item(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(Table::ChecklistItems, id).await?;
        debug!("checked off checklist item {}", id);
        remove_by_id(&mut self.checklist_items, id);
        Ok(())
    }

    /// Writes `position = index` for each item of `ordered`, one request at a time and in order.
    ///
    /// Ids that are not cached items of `project_id` are dropped before anything is sent.
    /// Each confirmed write is applied locally straight away. The first failure stops the
    /// sequence and is returned; items already written keep their new positions.
    pub async fn reorder_checklist_items(&mut self, project_id: Uuid, ordered: &[Uuid]) -> Result<()> {
        let owned: Vec<Uuid> = ordered
            .iter()
            .copied()
            .filter(|id| {
                let known = self
                    .checklist_items
                    .iter()
                    .any(|i| i.id == *id && i.project_id == project_id);
                if !known {
                    warn!("reorder of project {} skips foreign item {}", project_id, id);
                }
                known
            })
            .collect();
        let mut queue = PositionQueue::new(&owned);

        while let Some((id, position)) = queue.pop() {
            let row = match self
                .store
                .update(Table::ChecklistItems, id, json!({ "position": position }))
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    warn!(
                        "reorder of project {} stopped after {} of {} items",
                        project_id,
                        queue.done() - 1,
                        queue.total
                    );
                    return Err(e.into());
                }
            };
            let item: ChecklistItem = decode_written(Table::ChecklistItems, row)?;
            replace_by_id(&mut self.checklist_items, item);
        }

        debug!("reordered {} checklist items of project {}", queue.total, project_id);
        Ok(())
    }
}

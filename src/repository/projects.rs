use crate::{
    error::Result,
    models::{NewProject, Project, ProjectUpdate},
    remote::{RemoteStore, Table},
    repository::{encode, remove_by_id, replace_by_id, Repository},
};
use log::debug;
use serde_json::json;
use uuid::Uuid;

impl<S: RemoteStore> Repository<S> {
    pub async fn add_project(&mut self, theme_id: Uuid, project: NewProject) -> Result<Project> {
        let mut record = encode(&project)?;
        record["theme_id"] = json!(theme_id);
        record["user_id"] = json!(self.owner()?);

        let project: Project = self.insert(Table::Projects, record).await?;
        debug!("added project {} to theme {}", project.id, theme_id);
        self.projects.push(project.clone());
        Ok(project)
    }

    pub async fn update_project(&mut self, id: Uuid, changes: ProjectUpdate) -> Result<Project> {
        let project: Project = self.update(Table::Projects, id, &changes).await?;
        replace_by_id(&mut self.projects, project.clone());
        Ok(project)
    }

    pub async fn delete_project(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(Table::Projects, id).await?;
        debug!("deleted project {}", id);

        remove_by_id(&mut self.projects, id);
        self.forget_project_dependants(id);
        Ok(())
    }
}

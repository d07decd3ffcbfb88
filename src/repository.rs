//! The in-memory mirror of the remote tables and every mutation on it.
//!
//! Each operation sends exactly one request (reorder sends one per item, in order) and only
//! touches local state once the store has answered. The store's returned record is what gets
//! spliced in, never the request body.

mod checklist;
mod projects;
mod shares;
mod tasks;
mod themes;


use crate::{
    error::{Error, Result},
    models::{ChecklistItem, Project, ProjectShare, Task, Theme},
    remote::{Ordering, RemoteStore, Session, StoreError, Table, User},
    views::Snapshot,
};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

pub use shares::MAX_ACTIVE_SHARES;

pub(crate) trait Identified {
    fn id(&self) -> Uuid;
}

macro_rules! identified {
    ($($t:ty),*) => {
        $(impl Identified for $t {
            fn id(&self) -> Uuid {
                self.id
            }
        })*
    };
}

identified!(Theme, Project, Task, ChecklistItem, ProjectShare);

fn decode<T: DeserializeOwned>(row: Value) -> Result<T> {
    Ok(serde_json::from_value(row).map_err(StoreError::from)?)
}

/// Decodes a row the store returned for an accepted write. On failure the remote change stands
/// while the mirror keeps the old record, so the mismatch is logged.
fn decode_written<T: DeserializeOwned>(table: Table, row: Value) -> Result<T> {
    decode(row).map_err(|e| {
        warn!("{} write was applied remotely but its record is unreadable: {}", table, e);
        e
    })
}

fn encode<T: Serialize>(body: &T) -> Result<Value> {
    Ok(serde_json::to_value(body).map_err(StoreError::from)?)
}

fn replace_by_id<T: Identified>(items: &mut Vec<T>, record: T) {
    match items.iter_mut().find(|i| i.id() == record.id()) {
        Some(existing) => *existing = record,
        None => items.push(record),
    }
}

fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: Uuid) {
    items.retain(|i| i.id() != id);
}

pub struct Repository<S> {
    store: S,
    themes: Vec<Theme>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    checklist_items: Vec<ChecklistItem>,
    shares: Vec<ProjectShare>,
    active_theme: Option<Uuid>,
}

impl<S: RemoteStore> Repository<S> {
    pub fn new(store: S) -> Repository<S> {
        Repository {
            store,
            themes: Vec::new(),
            projects: Vec::new(),
            tasks: Vec::new(),
            checklist_items: Vec::new(),
            shares: Vec::new(),
            active_theme: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn checklist_items(&self) -> &[ChecklistItem] {
        &self.checklist_items
    }

    pub fn shares(&self) -> &[ProjectShare] {
        &self.shares
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            themes: &self.themes,
            projects: &self.projects,
            tasks: &self.tasks,
            checklist_items: &self.checklist_items,
            shares: &self.shares,
        }
    }

    pub fn active_theme(&self) -> Option<Uuid> {
        self.active_theme
    }

    pub fn set_active_theme(&mut self, theme_id: Option<Uuid>) {
        self.active_theme = theme_id;
    }

    pub fn session(&self) -> Option<Session> {
        self.store.current_session()
    }

    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    pub fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.store.session_changes()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        self.store.sign_up(email, password).await?;
        info!("registered {}", email);
        Ok(())
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        let session = self.store.sign_in(email, password).await?;
        info!("signed in as {}", session.user.id);
        self.load().await?;
        Ok(session)
    }

    /// Loads the collections when the store already holds a session. Returns whether it did.
    ///
    /// A rejected access token is refreshed once and the load retried; the new session reaches
    /// `session_changes` subscribers.
    pub async fn restore(&mut self) -> Result<bool> {
        if self.store.current_session().is_none() {
            return Ok(false);
        }

        match self.load().await {
            Err(Error::RemoteOperation(e)) if e.is_unauthorized() => {
                info!("access token rejected, refreshing the session");
                self.store.refresh_session().await?;
                self.load().await?;
            }
            result => result?,
        }
        Ok(true)
    }

    /// Fetches all five tables. Nothing is replaced unless every fetch succeeds.
    pub async fn load(&mut self) -> Result<()> {
        let themes = self.fetch(Table::Themes, Ordering::asc("created_at")).await?;
        let projects = self.fetch(Table::Projects, Ordering::asc("priority")).await?;
        let tasks = self.fetch(Table::Tasks, Ordering::asc("created_at")).await?;
        let checklist_items = self
            .fetch(Table::ChecklistItems, Ordering::asc("position"))
            .await?;
        let shares = self
            .fetch(Table::ProjectShares, Ordering::desc("created_at"))
            .await?;

        self.themes = themes;
        self.projects = projects;
        self.tasks = tasks;
        self.checklist_items = checklist_items;
        self.shares = shares;

        let selected = self.active_theme;
        if !self.themes.iter().any(|t| Some(t.id) == selected) {
            self.active_theme = self.themes.first().map(|t| t.id);
        }

        info!(
            "loaded {} themes, {} projects, {} tasks, {} checklist items, {} shares",
            self.themes.len(),
            self.projects.len(),
            self.tasks.len(),
            self.checklist_items.len(),
            self.shares.len()
        );
        Ok(())
    }

    /// Always clears local state, even when the store fails to end the session.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.store.sign_out().await {
            warn!("remote sign out failed: {}", e);
        }

        self.themes.clear();
        self.projects.clear();
        self.tasks.clear();
        self.checklist_items.clear();
        self.shares.clear();
        self.active_theme = None;
        info!("signed out");
    }

    fn owner(&self) -> Result<Uuid> {
        match self.store.current_session() {
            Some(session) => Ok(session.user.id),
            None => Err(StoreError::NotAuthenticated.into()),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, table: Table, order: Ordering) -> Result<Vec<T>> {
        let rows = self.store.select(table, order).await?;
        debug!("fetched {} rows from {}", rows.len(), table);
        rows.into_iter().map(decode).collect()
    }

    async fn insert<T: DeserializeOwned>(&self, table: Table, record: Value) -> Result<T> {
        let row = self.store.insert(table, record).await?;
        decode_written(table, row)
    }

    async fn update<T: DeserializeOwned, P: Serialize>(
        &self,
        table: Table,
        id: Uuid,
        patch: &P,
    ) -> Result<T> {
        let row = self.store.update(table, id, encode(patch)?).await?;
        decode_written(table, row)
    }

    /// Drops the projects of a deleted theme, and everything hanging off them.
    fn forget_theme_dependants(&mut self, theme_id: Uuid) {
        let orphaned: Vec<Uuid> = self
            .projects
            .iter()
            .filter(|p| p.theme_id == theme_id)
            .map(|p| p.id)
            .collect();
        for project_id in orphaned {
            remove_by_id(&mut self.projects, project_id);
            self.forget_project_dependants(project_id);
        }
    }

    fn forget_project_dependants(&mut self, project_id: Uuid) {
        self.tasks.retain(|t| t.project_id != project_id);
        self.checklist_items.retain(|i| i.project_id != project_id);
        self.shares.retain(|s| s.project_id != project_id);
    }
}

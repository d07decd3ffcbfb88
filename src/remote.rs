pub mod http;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

pub use http::HttpStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("request returned an unexpected status code {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("{table} record {id} not found")]
    NotFound { table: Table, id: Uuid },
}

impl StoreError {
    /// The backend rejected the access token, usually because it expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Status { status: 401, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Themes,
    Projects,
    Tasks,
    ChecklistItems,
    ProjectShares,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Themes => "themes",
            Table::Projects => "projects",
            Table::Tasks => "tasks",
            Table::ChecklistItems => "checklist_items",
            Table::ProjectShares => "project_shares",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: &'static str,
    pub ascending: bool,
}

impl Ordering {
    pub fn asc(column: &'static str) -> Ordering {
        Ordering {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: &'static str) -> Ordering {
        Ordering {
            column,
            ascending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Table-oriented CRUD plus the authenticated session lifecycle of the hosted backend.
///
/// Records cross this boundary untyped; callers decode them into the structs in `models`.
/// Implementations attach the signed-in user's credentials to every request.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Registers an account. Most backends require email confirmation, so no session is returned.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), StoreError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;
    async fn sign_out(&self) -> Result<(), StoreError>;
    /// Trades the current session's refresh token for a new session and publishes it.
    async fn refresh_session(&self) -> Result<Session, StoreError>;

    /// Receives every session transition (sign in, sign out, restore).
    fn session_changes(&self) -> watch::Receiver<Option<Session>>;

    fn current_session(&self) -> Option<Session> {
        self.session_changes().borrow().clone()
    }

    async fn select(&self, table: Table, order: Ordering) -> Result<Vec<Value>, StoreError>;
    async fn insert(&self, table: Table, record: Value) -> Result<Value, StoreError>;
    async fn update(&self, table: Table, id: Uuid, patch: Value) -> Result<Value, StoreError>;
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError>;
}

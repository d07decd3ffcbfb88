//! In-process `RemoteStore` that records every call, for repository tests.

use crate::remote::{Ordering, RemoteStore, Session, StoreError, Table, User};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
        Mutex,
    },
};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SignUp(String),
    SignIn(String),
    SignOut,
    Refresh,
    Select(Table),
    Insert(Table, Value),
    Update(Table, Uuid, Value),
    Delete(Table, Uuid),
}

pub struct FakeStore {
    pub user_id: Uuid,
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    fail_at: Mutex<Option<usize>>,
    expired: AtomicBool,
    clock: AtomicUsize,
    session: watch::Sender<Option<Session>>,
}

impl FakeStore {
    pub fn new() -> FakeStore {
        let (session, _) = watch::channel(None);
        FakeStore {
            user_id: Uuid::new_v4(),
            tables: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_at: Mutex::new(None),
            expired: AtomicBool::new(false),
            clock: AtomicUsize::new(0),
            session,
        }
    }

    pub fn signed_in() -> FakeStore {
        let store = FakeStore::new();
        store.session.send_replace(Some(store.session_for("me@example.com")));
        store
    }

    fn session_for(&self, email: &str) -> Session {
        Session {
            access_token: "fake-token".to_string(),
            refresh_token: Some("fake-refresh".to_string()),
            user: User {
                id: self.user_id,
                email: Some(email.to_string()),
            },
        }
    }

    /// Seeds a raw row, bypassing the call log.
    pub fn seed(&self, table: Table, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push(row);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Makes the `n`th call from now (0 based) fail with a 500.
    pub fn fail_call(&self, n: usize) {
        let made = self.calls.lock().unwrap().len();
        *self.fail_at.lock().unwrap() = Some(made + n);
    }

    /// Table calls answer 401 until the session is refreshed.
    pub fn expire_session(&self) {
        self.expired.store(true, AtomicOrdering::SeqCst);
    }

    fn check_token(&self) -> Result<(), StoreError> {
        if self.expired.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Status {
                status: 401,
                message: "JWT expired".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, call: Call) -> Result<(), StoreError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(call);
        if *self.fail_at.lock().unwrap() == Some(index) {
            return Err(StoreError::Status {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn tick(&self) -> String {
        let n = self.clock.fetch_add(1, AtomicOrdering::SeqCst) as i64;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (base + Duration::seconds(n)).to_rfc3339()
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::Number(n)) => format!("{:020}", n.as_i64().unwrap_or_default() + (1 << 40)),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<(), StoreError> {
        self.record(Call::SignUp(email.to_string()))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, StoreError> {
        self.record(Call::SignIn(email.to_string()))?;
        let session = self.session_for(email);
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        let result = self.record(Call::SignOut);
        self.session.send_replace(None);
        result
    }

    async fn refresh_session(&self) -> Result<Session, StoreError> {
        self.record(Call::Refresh)?;
        let current = self.session.borrow().clone();
        let mut session = current.ok_or(StoreError::NotAuthenticated)?;
        session.access_token = format!("fake-token-{}", self.tick());
        self.expired.store(false, AtomicOrdering::SeqCst);
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn select(&self, table: Table, order: Ordering) -> Result<Vec<Value>, StoreError> {
        self.record(Call::Select(table))?;
        self.check_token()?;
        let mut rows = self.rows(table);
        rows.sort_by_key(|r| sort_key(r, order.column));
        if !order.ascending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Value) -> Result<Value, StoreError> {
        self.record(Call::Insert(table, record.clone()))?;
        self.check_token()?;
        let mut row = record;
        if let Value::Object(map) = &mut row {
            map.insert("id".to_string(), json!(Uuid::new_v4()));
            map.entry("created_at".to_string())
                .or_insert_with(|| json!(self.tick()));
        }
        self.seed(table, row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Value) -> Result<Value, StoreError> {
        self.record(Call::Update(table, id, patch.clone()))?;
        self.check_token()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .entry(table)
            .or_default()
            .iter_mut()
            .find(|r| r.get("id") == Some(&json!(id)))
            .ok_or(StoreError::NotFound { table, id })?;
        if let (Value::Object(target), Value::Object(fields)) = (&mut *row, patch) {
            for (k, v) in fields {
                target.insert(k, v);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.record(Call::Delete(table, id))?;
        self.check_token()?;
        if let Some(rows) = self.tables.lock().unwrap().get_mut(&table) {
            rows.retain(|r| r.get("id") != Some(&json!(id)));
        }
        Ok(())
    }
}

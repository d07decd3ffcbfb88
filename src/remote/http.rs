use crate::remote::{Ordering, RemoteStore, Session, StoreError, Table};
use async_trait::async_trait;
use log::debug;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::sync::watch;
use uuid::Uuid;

/// REST client for the hosted backend (`/auth/v1` for sessions, `/rest/v1` for tables).
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: watch::Sender<Option<Session>>,
}

impl HttpStore {
    pub fn new(base_url: &str, api_key: &str) -> HttpStore {
        let (session, _) = watch::channel(None);
        HttpStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session,
        }
    }

    /// Reuses a session persisted by an earlier run.
    pub fn with_session(self, session: Option<Session>) -> HttpStore {
        self.session.send_replace(session);
        self
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("apikey", &self.api_key);
        match self.session.borrow().as_ref() {
            Some(session) => req.bearer_auth(&session.access_token),
            None => req.bearer_auth(&self.api_key),
        }
    }

    fn require_session(&self) -> Result<(), StoreError> {
        match self.session.borrow().as_ref() {
            Some(_) => Ok(()),
            None => Err(StoreError::NotAuthenticated),
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, StoreError> {
        let resp = self.authorize(req).send().await?;
        check_status(resp).await
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StoreError> {
        let resp = self.send(req).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    }

    async fn post_auth<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, StoreError> {
        let url = self.auth_url(path);
        debug!("POST {}", url);
        self.send_json(self.client.post(&url).json(body)).await
    }
}

async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            message: error_message(&message),
        });
    }

    Ok(resp)
}

/// Pulls the human readable part out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .map(String::from)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

fn order_query(order: Ordering) -> String {
    format!(
        "{}.{}",
        order.column,
        if order.ascending { "asc" } else { "desc" }
    )
}

fn id_filter(id: Uuid) -> String {
    format!("eq.{}", id)
}

/// `return=representation` answers with an array holding the affected rows.
fn first_row(table: Table, id: Option<Uuid>, rows: Vec<Value>) -> Result<Value, StoreError> {
    match rows.into_iter().next() {
        Some(row) => Ok(row),
        None => Err(StoreError::NotFound {
            table,
            id: id.unwrap_or_else(Uuid::nil),
        }),
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), StoreError> {
        let _: Value = self
            .post_auth("signup", &json!({ "email": email, "password": password }))
            .await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let session: Session = self
            .post_auth(
                "token?grant_type=password",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        let result = match self.require_session() {
            Ok(_) => {
                let url = self.auth_url("logout");
                debug!("POST {}", url);
                self.send(self.client.post(&url)).await.map(|_| ())
            }
            Err(_) => Ok(()),
        };
        self.session.send_replace(None);
        result
    }

    async fn refresh_session(&self) -> Result<Session, StoreError> {
        let refresh_token = self
            .session
            .borrow()
            .as_ref()
            .and_then(|s| s.refresh_token.clone());
        let refresh_token = refresh_token.ok_or(StoreError::NotAuthenticated)?;

        // The expired access token must not be sent as the bearer here.
        let url = self.auth_url("token?grant_type=refresh_token");
        debug!("POST {}", url);
        let req = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&json!({ "refresh_token": refresh_token }));
        let resp = check_status(req.send().await?).await?;
        let session: Session = serde_json::from_slice(&resp.bytes().await?)?;

        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn select(&self, table: Table, order: Ordering) -> Result<Vec<Value>, StoreError> {
        self.require_session()?;
        let url = self.table_url(table);
        debug!("GET {} order={}", url, order_query(order));
        let req = self
            .client
            .get(&url)
            .query(&[("select", "*".to_string()), ("order", order_query(order))]);
        self.send_json(req).await
    }

    async fn insert(&self, table: Table, record: Value) -> Result<Value, StoreError> {
        self.require_session()?;
        let url = self.table_url(table);
        debug!("POST {}", url);
        let req = self
            .client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(&[record]);
        first_row(table, None, self.send_json(req).await?)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Value) -> Result<Value, StoreError> {
        self.require_session()?;
        let url = self.table_url(table);
        debug!("PATCH {} id={}", url, id);
        let req = self
            .client
            .patch(&url)
            .query(&[("id", id_filter(id))])
            .header("Prefer", "return=representation")
            .json(&patch);
        first_row(table, Some(id), self.send_json(req).await?)
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.require_session()?;
        let url = self.table_url(table);
        debug!("DELETE {} id={}", url, id);
        let resp = self
            .send(self.client.delete(&url).query(&[("id", id_filter(id))]))
            .await?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::ACCEPTED => Ok(()),
            status => Err(StoreError::Status {
                status: status.as_u16(),
                message: "unexpected response to delete".to_string(),
            }),
        }
    }
}

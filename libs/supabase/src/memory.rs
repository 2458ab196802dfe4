//! In-process stand-ins for the hosted services, for tests and demos.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use entity::{id::RecordId, timestamp};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::{
    auth::AuthService,
    rest::{Order, TableStore},
    response::Response,
    session::{AuthChangeEvent, AuthEvent, Session, User},
    SupabaseError,
};

fn unavailable(message: &str) -> SupabaseError {
    SupabaseError::FailedStatusCode {
        status_code: StatusCode::SERVICE_UNAVAILABLE,
        code: None,
        message: message.to_string(),
    }
}

/// A call made against a [`MemoryStore`], for asserting on traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select(String),
    SelectById(String, RecordId),
    Insert(String),
    Update(String, RecordId),
    Delete(String, RecordId),
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<Value>>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
    failure: Option<String>,
    calls: Vec<Call>,
}

impl Tables {
    fn record(&mut self, call: Call) -> Response<()> {
        self.calls.push(call);
        match &self.failure {
            Some(message) => Err(unavailable(message)),
            None => Ok(()),
        }
    }

    /// Strictly increasing, so insertion order survives a sort on it.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created
    }
}

fn row_id(row: &Value) -> Option<RecordId> {
    serde_json::from_value(row.get("id")?.clone()).ok()
}

fn sort_key(row: &Value, column: &str) -> Option<DateTime<Utc>> {
    row.get(column)?.as_str().and_then(timestamp::parse)
}

/// Table storage kept in memory. Ids are sequential integers and
/// `created_at` is filled in on insert, like a default Postgres column.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts rows directly, bypassing call recording and failures.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.lock();
        for mut row in rows {
            if row.get("id").is_none() {
                tables.next_id += 1;
                row["id"] = json!(tables.next_id);
            }
            tables.rows.entry(table.to_string()).or_default().push(row);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    /// Every following call fails with `message` until [`Self::recover`].
    pub fn fail_with(&self, message: &str) {
        self.lock().failure = Some(message.to_string());
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl TableStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        order: Option<Order>,
    ) -> Response<Vec<Value>> {
        let mut tables = self.lock();
        tables.record(Call::Select(table.to_string()))?;

        let mut rows = tables.rows.get(table).cloned().unwrap_or_default();
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let (a, b) = (
                    sort_key(a, order.column),
                    sort_key(b, order.column),
                );
                if order.ascending {
                    a.cmp(&b)
                } else {
                    b.cmp(&a)
                }
            });
        }
        Ok(rows)
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> Response<Vec<Value>> {
        let mut tables = self.lock();
        tables.record(Call::SelectById(table.to_string(), id.clone()))?;

        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_id(row).as_ref() == Some(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, row: Value) -> Response<Vec<Value>> {
        let mut tables = self.lock();
        tables.record(Call::Insert(table.to_string()))?;

        let Value::Object(mut fields) = row else {
            return Err(SupabaseError::FailedStatusCode {
                status_code: StatusCode::BAD_REQUEST,
                code: Some("PGRST102".to_string()),
                message: "row must be a JSON object".to_string(),
            });
        };
        tables.next_id += 1;
        let id = tables.next_id;
        fields.insert("id".to_string(), json!(id));
        if !fields.contains_key("created_at") {
            let created_at = tables.next_created_at();
            fields.insert(
                "created_at".to_string(),
                json!(created_at.to_rfc3339()),
            );
        }

        let row = Value::Object(fields);
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Response<Vec<Value>> {
        let mut tables = self.lock();
        tables.record(Call::Update(table.to_string(), id.clone()))?;

        let Some(rows) = tables.rows.get_mut(table) else {
            return Ok(vec![]);
        };
        let mut updated = vec![];
        for row in rows
            .iter_mut()
            .filter(|row| row_id(row).as_ref() == Some(id))
        {
            if let (Value::Object(fields), Value::Object(changes)) =
                (&mut *row, &patch)
            {
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Response<()> {
        let mut tables = self.lock();
        tables.record(Call::Delete(table.to_string(), id.clone()))?;

        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|row| row_id(row).as_ref() != Some(id));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Accounts {
    passwords: HashMap<String, String>,
    session: Option<Session>,
    unavailable: bool,
    issued: u64,
    announced: bool,
}

/// Password auth kept in memory.
#[derive(Debug, Clone)]
pub struct MemoryAuth {
    accounts: Arc<Mutex<Accounts>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Arc::default(),
            events,
        }
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.lock()
            .passwords
            .insert(email.to_string(), password.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Drops the session as an expired refresh token would.
    pub fn expire(&self) {
        self.lock().session = None;
        let _ = self
            .events
            .send(AuthEvent::new(AuthChangeEvent::SignedOut, None));
    }

    /// Rotates the tokens of the live session.
    pub fn refresh(&self) {
        let refreshed = {
            let mut accounts = self.lock();
            accounts.issued += 1;
            let issued = accounts.issued;
            let Some(session) = accounts.session.as_mut() else {
                return;
            };
            session.access_token = format!("access-{issued}");
            session.clone()
        };
        let _ = self.events.send(AuthEvent::new(
            AuthChangeEvent::TokenRefreshed,
            Some(refreshed),
        ));
    }

    fn issue(accounts: &mut Accounts, email: &str) -> Session {
        accounts.issued += 1;
        let now = Utc::now();
        Session {
            access_token: format!("access-{}", accounts.issued),
            refresh_token: format!("refresh-{}", accounts.issued),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: Some(now.timestamp() + 3600),
            user: User {
                id: format!("user-{email}"),
                email: Some(email.to_string()),
                last_sign_in_at: Some(now.to_rfc3339()),
            },
        }
    }
}

impl AuthService for MemoryAuth {
    async fn get_session(&self) -> Response<Option<Session>> {
        let (session, first) = {
            let mut accounts = self.lock();
            if accounts.unavailable {
                return Err(unavailable("auth service unavailable"));
            }
            let first = !std::mem::replace(&mut accounts.announced, true);
            (accounts.session.clone(), first)
        };

        if first {
            let _ = self.events.send(AuthEvent::new(
                AuthChangeEvent::InitialSession,
                session.clone(),
            ));
        }
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Response<Session> {
        let session = {
            let mut accounts = self.lock();
            if accounts.unavailable {
                return Err(unavailable("auth service unavailable"));
            }
            if accounts.passwords.get(email).map(String::as_str)
                != Some(password)
            {
                return Err(SupabaseError::FailedStatusCode {
                    status_code: StatusCode::BAD_REQUEST,
                    code: Some("invalid_credentials".to_string()),
                    message: "Invalid login credentials".to_string(),
                });
            }
            let session = Self::issue(&mut accounts, email);
            accounts.session = Some(session.clone());
            session
        };

        let _ = self.events.send(AuthEvent::new(
            AuthChangeEvent::SignedIn,
            Some(session.clone()),
        ));
        Ok(session)
    }

    async fn sign_out(&self) -> Response<()> {
        {
            let mut accounts = self.lock();
            if accounts.unavailable {
                return Err(unavailable("auth service unavailable"));
            }
            accounts.session = None;
        }

        let _ = self
            .events
            .send(AuthEvent::new(AuthChangeEvent::SignedOut, None));
        Ok(())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

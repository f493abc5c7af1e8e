#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use proxi_core::{
    Notification, NotificationStore, PositionStore, ProPosition, StoreError, StoreOperations,
    StoreResult, User, UserStore,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub notifications: Vec<Notification>,
    pub positions: Vec<ProPosition>,
}

/// In-memory store that enforces the same constraints as the Postgres schema:
/// unique email and foreign keys to users.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the database were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables.lock().unwrap().notifications.clone()
    }

    pub fn positions(&self) -> Vec<ProPosition> {
        self.tables.lock().unwrap().positions.clone()
    }

    pub fn seed_user(&self, name: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::Pool("connection refused".to_string()));
        }
        Ok(())
    }
}

fn user_exists(tables: &Tables, id: Uuid) -> bool {
    tables.users.iter().any(|u| u.id == id)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check()?;
        Ok(self.users())
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Constraint(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Constraint(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }
        if let Some(row) = tables.users.iter_mut().find(|u| u.id == user.id) {
            *row = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let referenced = tables.notifications.iter().any(|n| n.receiver_id == id)
            || tables.positions.iter().any(|p| p.pro_id == id);
        if referenced {
            return Err(StoreError::Constraint(
                "update or delete on table \"users\" violates foreign key constraint".to_string(),
            ));
        }
        tables.users.retain(|u| u.id != id);
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn list_notifications(&self) -> StoreResult<Vec<Notification>> {
        self.check()?;
        Ok(self.notifications())
    }

    async fn create_notification(&self, notif: &Notification) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if !user_exists(&tables, notif.receiver_id) {
            return Err(StoreError::Constraint(
                "insert or update on table \"notifications\" violates foreign key constraint \"notifications_receiver_id_fkey\"".to_string(),
            ));
        }
        tables.notifications.push(notif.clone());
        Ok(())
    }

    async fn update_notification(&self, notif: &Notification) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let receiver_known = user_exists(&tables, notif.receiver_id);
        if let Some(row) = tables.notifications.iter_mut().find(|n| n.id == notif.id) {
            if !receiver_known {
                return Err(StoreError::Constraint(
                    "insert or update on table \"notifications\" violates foreign key constraint \"notifications_receiver_id_fkey\"".to_string(),
                ));
            }
            *row = notif.clone();
        }
        Ok(())
    }

    async fn delete_notification(&self, id: Uuid) -> StoreResult<()> {
        self.check()?;
        self.tables
            .lock()
            .unwrap()
            .notifications
            .retain(|n| n.id != id);
        Ok(())
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn upsert_position(&self, position: &ProPosition) -> StoreResult<Uuid> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if !user_exists(&tables, position.pro_id) {
            return Err(StoreError::Constraint(
                "insert or update on table \"pro_positions\" violates foreign key constraint \"pro_positions_pro_id_fkey\"".to_string(),
            ));
        }
        match tables.positions.iter_mut().find(|p| p.id == position.id) {
            Some(row) => *row = position.clone(),
            None => tables.positions.push(position.clone()),
        }
        Ok(position.id)
    }
}

pub fn app(store: &MemoryStore) -> Router {
    proxi_api::router(Arc::new(StoreOperations::new(store.clone())))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Bytes) {
    let body = match body {
        Some(json) => Body::from(serde_json::to_vec(&json).unwrap()),
        None => Body::empty(),
    };
    send_raw(app, method, uri, body).await
}

pub async fn send_raw(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

pub fn json<T: serde::de::DeserializeOwned>(bytes: &Bytes) -> T {
    serde_json::from_slice(bytes).unwrap()
}

pub fn text(bytes: &Bytes) -> &str {
    std::str::from_utf8(bytes).unwrap()
}

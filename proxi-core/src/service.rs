use async_trait::async_trait;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::store::{NotificationStore, PositionStore, UserStore};
use crate::types::{Notification, ProPosition, User};

/// Application operations invoked by the HTTP layer, one per entity and verb.
#[async_trait]
pub trait Operations: Send + Sync + 'static {
    async fn get_users(&self) -> StoreResult<Vec<User>>;
    async fn add_user(&self, user: &User) -> StoreResult<()>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    async fn get_notifications(&self) -> StoreResult<Vec<Notification>>;
    async fn add_notification(&self, notif: &Notification) -> StoreResult<()>;
    async fn update_notification(&self, notif: &Notification) -> StoreResult<()>;
    async fn delete_notification(&self, id: Uuid) -> StoreResult<()>;

    async fn upsert_position(&self, position: &ProPosition) -> StoreResult<Uuid>;
}

pub type SharedOperations = Arc<dyn Operations>;

/// Forwards every operation to the store unchanged.
pub struct StoreOperations<S> {
    store: S,
}

impl<S> StoreOperations<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> Operations for StoreOperations<S>
where
    S: UserStore + NotificationStore + PositionStore + 'static,
{
    async fn get_users(&self) -> StoreResult<Vec<User>> {
        tracing::debug!("listing users");
        self.store.list_users().await
    }

    async fn add_user(&self, user: &User) -> StoreResult<()> {
        tracing::debug!("creating user {}", user.id);
        self.store.create_user(user).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        tracing::debug!("updating user {}", user.id);
        self.store.update_user(user).await
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        tracing::debug!("deleting user {}", id);
        self.store.delete_user(id).await
    }

    async fn get_notifications(&self) -> StoreResult<Vec<Notification>> {
        tracing::debug!("listing notifications");
        self.store.list_notifications().await
    }

    async fn add_notification(&self, notif: &Notification) -> StoreResult<()> {
        tracing::debug!("creating notification {} for {}", notif.id, notif.receiver_id);
        self.store.create_notification(notif).await
    }

    async fn update_notification(&self, notif: &Notification) -> StoreResult<()> {
        tracing::debug!("updating notification {}", notif.id);
        self.store.update_notification(notif).await
    }

    async fn delete_notification(&self, id: Uuid) -> StoreResult<()> {
        tracing::debug!("deleting notification {}", id);
        self.store.delete_notification(id).await
    }

    async fn upsert_position(&self, position: &ProPosition) -> StoreResult<Uuid> {
        tracing::debug!("upserting position {} for pro {}", position.id, position.pro_id);
        self.store.upsert_position(position).await
    }
}

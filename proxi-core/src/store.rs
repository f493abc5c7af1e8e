//! Persistence contracts and the Postgres adapter.
//!
//! Every statement goes through the diesel query builder, so request data is
//! always bound as a parameter. Update and delete report success even when no
//! row matched the identity.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::schema::{notifications, users};
use crate::types::{Notification, ProPosition, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn create_user(&self, user: &User) -> StoreResult<()>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn list_notifications(&self) -> StoreResult<Vec<Notification>>;
    async fn create_notification(&self, notif: &Notification) -> StoreResult<()>;
    async fn update_notification(&self, notif: &Notification) -> StoreResult<()>;
    async fn delete_notification(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Inserts the position, or overwrites every non-key column of the row
    /// that already holds `position.id`. Returns the stored identity.
    async fn upsert_position(&self, position: &ProPosition) -> StoreResult<Uuid>;
}

/// Postgres-backed store. The pool is handed in by the caller.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<DbPool>,
}

impl PgStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<DbConnection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let rows = users::table
            .select(User::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        statements::insert_user(user).execute(&mut conn).await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let affected = statements::update_user(user).execute(&mut conn).await?;
        if affected == 0 {
            tracing::debug!("update matched no user with id {}", user.id);
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        statements::delete_user(id).execute(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn list_notifications(&self) -> StoreResult<Vec<Notification>> {
        let mut conn = self.conn().await?;
        let rows = notifications::table
            .select(Notification::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn create_notification(&self, notif: &Notification) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        statements::insert_notification(notif)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_notification(&self, notif: &Notification) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let affected = statements::update_notification(notif)
            .execute(&mut conn)
            .await?;
        if affected == 0 {
            tracing::debug!("update matched no notification with id {}", notif.id);
        }
        Ok(())
    }

    async fn delete_notification(&self, id: Uuid) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        statements::delete_notification(id)
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PositionStore for PgStore {
    async fn upsert_position(&self, position: &ProPosition) -> StoreResult<Uuid> {
        let mut conn = self.conn().await?;
        // The conflict target is the identity itself, so the stored id is
        // always the one sent.
        statements::upsert_position(position)
            .execute(&mut conn)
            .await?;
        Ok(position.id)
    }
}

/// Write statements, kept apart from execution so their SQL can be checked
/// without a database.
mod statements {
    use diesel::pg::Pg;
    use diesel::prelude::*;
    use diesel::query_builder::{QueryFragment, QueryId};
    use diesel::upsert::excluded;
    use uuid::Uuid;

    use crate::schema::{notifications, pro_positions, users};
    use crate::types::{Notification, ProPosition, User};

    pub(super) fn insert_user(user: &User) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
        diesel::insert_into(users::table).values(user)
    }

    pub(super) fn update_user(user: &User) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
        diesel::update(users::table.filter(users::id.eq(user.id))).set(user)
    }

    pub(super) fn delete_user(id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
        diesel::delete(users::table.filter(users::id.eq(id)))
    }

    pub(super) fn insert_notification(
        notif: &Notification,
    ) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
        diesel::insert_into(notifications::table).values(notif)
    }

    pub(super) fn update_notification(
        notif: &Notification,
    ) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
        diesel::update(notifications::table.filter(notifications::id.eq(notif.id))).set(notif)
    }

    pub(super) fn delete_notification(id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
        diesel::delete(notifications::table.filter(notifications::id.eq(id)))
    }

    /// `INSERT ... ON CONFLICT (id) DO UPDATE` overwriting every non-key column.
    pub(super) fn upsert_position(
        position: &ProPosition,
    ) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
        diesel::insert_into(pro_positions::table)
            .values(position)
            .on_conflict(pro_positions::id)
            .do_update()
            .set((
                pro_positions::pro_id.eq(excluded(pro_positions::pro_id)),
                pro_positions::latitude.eq(excluded(pro_positions::latitude)),
                pro_positions::longitude.eq(excluded(pro_positions::longitude)),
                pro_positions::timestamp.eq(excluded(pro_positions::timestamp)),
            ))
    }
}

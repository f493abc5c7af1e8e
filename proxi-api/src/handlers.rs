use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, SubsecRound, Utc};
use proxi_core::{Notification, ProPosition, SharedOperations, User};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "proxi-api"
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `/v1/users/` and `/v1/notif/` with nothing after the slash.
pub async fn id_required() -> ApiError {
    ApiError::BadRequest("ID is required".to_string())
}

/// Bodies are decoded by hand so that every decode failure is a 400 carrying
/// the decoder's message, whatever the content type.
fn decode<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    Ok(serde_json::from_slice(body)?)
}

pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest("ID is required".to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid ID format".to_string()))
}

/// Postgres keeps microseconds; stamping at that precision keeps the
/// response equal to what a later read returns.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// Users

pub async fn get_users(Extension(ops): Extension<SharedOperations>) -> ApiResult<Json<Vec<User>>> {
    let users = ops.get_users().await?;
    Ok(Json(users))
}

pub async fn create_user(
    Extension(ops): Extension<SharedOperations>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<User>)> {
    let mut user: User = decode(&body)?;

    if user.name.is_empty() || user.email.is_empty() {
        return Err(ApiError::BadRequest("Name and Email are required".to_string()));
    }

    user.id = Uuid::new_v4();
    ops.add_user(&user).await?;

    tracing::info!("Created user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Dispatches `/v1/users/*id`. The identity is checked before the method.
pub async fn user_by_id(
    method: Method,
    Extension(ops): Extension<SharedOperations>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id)?;

    match method {
        Method::PUT => {
            let mut user: User = decode(&body)?;
            user.id = id;
            ops.update_user(&user).await?;
            Ok(Json(user).into_response())
        }
        Method::DELETE => {
            ops.delete_user(id).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

// Notifications

pub async fn get_notifications(
    Extension(ops): Extension<SharedOperations>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifs = ops.get_notifications().await?;
    Ok(Json(notifs))
}

pub async fn create_notification(
    Extension(ops): Extension<SharedOperations>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    let mut notif: Notification = decode(&body)?;

    if notif.message.is_empty() || notif.receiver_id.is_nil() {
        return Err(ApiError::BadRequest(
            "Message and ReceiverId are required".to_string(),
        ));
    }

    if notif.created_at.is_none() {
        notif.created_at = Some(now());
    }
    notif.id = Uuid::new_v4();

    ops.add_notification(&notif).await?;

    tracing::info!("Created notification {} for {}", notif.id, notif.receiver_id);
    Ok((StatusCode::CREATED, Json(notif)))
}

/// Dispatches `/v1/notif/*id`. The identity is checked before the method.
pub async fn notification_by_id(
    method: Method,
    Extension(ops): Extension<SharedOperations>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id)?;

    match method {
        Method::PUT => {
            let mut notif: Notification = decode(&body)?;
            notif.id = id;
            ops.update_notification(&notif).await?;
            Ok(Json(notif).into_response())
        }
        Method::DELETE => {
            ops.delete_notification(id).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

// Positions

pub async fn upsert_position(
    Extension(ops): Extension<SharedOperations>,
    body: Bytes,
) -> ApiResult<Json<ProPosition>> {
    let mut position: ProPosition = decode(&body)?;

    if position.timestamp.is_none() {
        position.timestamp = Some(now());
    }
    // A new identity on every call, so the store's conflict branch is never hit
    // from here.
    position.id = Uuid::new_v4();

    let stored_id = ops.upsert_position(&position).await?;
    tracing::debug!("Stored position {} for pro {}", stored_id, position.pro_id);

    Ok(Json(position))
}

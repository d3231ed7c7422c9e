use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use invoify_core::ClientId;
use invoify_parties::{Client, ClientDraft};

use crate::app::dto::MessageResponse;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::context::UserContext;

const NOT_FOUND: &str = "Client not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

fn client_id(raw: &str) -> ApiResult<ClientId> {
    raw.parse().map_err(|_| ApiError::NotFound(NOT_FOUND))
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(services.store.list_clients(user.user_id()).await?))
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<ClientDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let Json(body) = body?;
    let client = Client::create(user.user_id(), body.validate()?, Utc::now());
    services.store.insert_client(client.clone()).await?;
    tracing::info!(user_id = %user.user_id(), client_id = %client.id, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let id = client_id(&id)?;
    services
        .store
        .get_client(user.user_id(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<ClientDraft>, JsonRejection>,
) -> ApiResult<Json<Client>> {
    let id = client_id(&id)?;
    let Json(body) = body?;
    let fields = body.validate()?;

    let mut client = services
        .store
        .get_client(user.user_id(), id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    client.apply(fields, Utc::now());

    if !services.store.update_client(&client).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(user_id = %user.user_id(), client_id = %client.id, "client updated");
    Ok(Json(client))
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = client_id(&id)?;
    if !services.store.delete_client(user.user_id(), id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(user_id = %user.user_id(), client_id = %id, "client deleted");
    Ok(Json(MessageResponse::new("Client deleted successfully")))
}

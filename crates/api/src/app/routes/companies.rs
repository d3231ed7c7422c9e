use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use invoify_core::CompanyId;
use invoify_parties::{Company, CompanyDraft};

use crate::app::dto::MessageResponse;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::context::UserContext;

const NOT_FOUND: &str = "Company not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/:id", get(get_company).put(update_company).delete(delete_company))
}

fn company_id(raw: &str) -> ApiResult<CompanyId> {
    raw.parse().map_err(|_| ApiError::NotFound(NOT_FOUND))
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Vec<Company>>> {
    Ok(Json(services.store.list_companies(user.user_id()).await?))
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<CompanyDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Company>)> {
    let Json(body) = body?;
    let company = Company::create(user.user_id(), body.validate()?, Utc::now());
    services.store.insert_company(company.clone()).await?;
    tracing::info!(user_id = %user.user_id(), company_id = %company.id, "company created");
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Company>> {
    let id = company_id(&id)?;
    services
        .store
        .get_company(user.user_id(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<CompanyDraft>, JsonRejection>,
) -> ApiResult<Json<Company>> {
    let id = company_id(&id)?;
    let Json(body) = body?;
    let fields = body.validate()?;

    let mut company = services
        .store
        .get_company(user.user_id(), id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    company.apply(fields, Utc::now());

    if !services.store.update_company(&company).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(user_id = %user.user_id(), company_id = %company.id, "company updated");
    Ok(Json(company))
}

pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = company_id(&id)?;
    if !services.store.delete_company(user.user_id(), id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(user_id = %user.user_id(), company_id = %id, "company deleted");
    Ok(Json(MessageResponse::new("Company deleted successfully")))
}

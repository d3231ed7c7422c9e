use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::Value;

use invoify_core::{ClientId, CompanyId, InvoiceId, UserId};
use invoify_documents::{invoice_pdf, pdf_filename};
use invoify_invoicing::{
    Invoice, InvoiceDetails, InvoiceDraft, InvoiceFields, InvoiceUpdate, generate_invoice_number,
};
use invoify_parties::{Client, Company};

use crate::app::dto::{InvoiceListQuery, MessageResponse, NextNumberResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::context::UserContext;

const NOT_FOUND: &str = "Invoice not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/next-number", get(next_number))
        .route("/:id", get(get_invoice).put(update_invoice).delete(delete_invoice))
        .route("/:id/pdf", get(download_pdf))
}

fn invoice_id(raw: &str) -> ApiResult<InvoiceId> {
    raw.parse().map_err(|_| ApiError::NotFound(NOT_FOUND))
}

/// Both parties on an invoice must belong to the caller.
async fn owned_parties(
    services: &AppServices,
    owner: UserId,
    client_id: ClientId,
    sender_id: CompanyId,
) -> ApiResult<(Client, Company)> {
    let client = services
        .store
        .get_client(owner, client_id)
        .await?
        .ok_or(ApiError::NotFound("Client not found"))?;
    let sender = services
        .store
        .get_company(owner, sender_id)
        .await?
        .ok_or(ApiError::NotFound("Sender company not found"))?;
    Ok((client, sender))
}

async fn load(services: &AppServices, owner: UserId, id: InvoiceId) -> ApiResult<InvoiceDetails> {
    services
        .store
        .get_invoice(owner, id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    query: Result<Query<InvoiceListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<InvoiceDetails>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    Ok(Json(services.store.list_invoices(user.user_id(), &filter).await?))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<InvoiceDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InvoiceDetails>)> {
    let Json(body) = body?;
    let now = Utc::now();
    let fields = body.validate(now.date_naive())?;
    let (client, sender) = owned_parties(&services, user.user_id(), fields.client_id, fields.sender_id).await?;

    let invoice = Invoice::create(user.user_id(), fields, now);
    services.store.insert_invoice(&invoice).await?;
    tracing::info!(
        user_id = %user.user_id(),
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        "invoice created"
    );

    Ok((
        StatusCode::CREATED,
        Json(InvoiceDetails {
            invoice,
            client,
            sender,
        }),
    ))
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<InvoiceDetails>> {
    let id = invoice_id(&id)?;
    Ok(Json(load(&services, user.user_id(), id).await?))
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<InvoiceDetails>> {
    let id = invoice_id(&id)?;
    let Json(body) = body?;
    let now = Utc::now();

    match InvoiceUpdate::from_json(body)? {
        InvoiceUpdate::StatusOnly(status) => {
            if !services.store.set_invoice_status(user.user_id(), id, status, now).await? {
                return Err(ApiError::NotFound(NOT_FOUND));
            }
            tracing::info!(user_id = %user.user_id(), invoice_id = %id, status = %status, "invoice status changed");
            Ok(Json(load(&services, user.user_id(), id).await?))
        }
        InvoiceUpdate::Full(draft) => {
            let fields = draft.validate(now.date_naive())?;
            let updated = replace(&services, user.user_id(), id, fields, now).await?;
            tracing::info!(user_id = %user.user_id(), invoice_id = %id, "invoice updated");
            Ok(Json(updated))
        }
    }
}

async fn replace(
    services: &AppServices,
    owner: UserId,
    id: InvoiceId,
    fields: InvoiceFields,
    now: chrono::DateTime<Utc>,
) -> ApiResult<InvoiceDetails> {
    let InvoiceDetails { mut invoice, .. } = load(services, owner, id).await?;
    let (client, sender) = owned_parties(services, owner, fields.client_id, fields.sender_id).await?;

    invoice.apply(fields, now);
    if !services.store.update_invoice(&invoice).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(InvoiceDetails {
        invoice,
        client,
        sender,
    })
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = invoice_id(&id)?;
    if !services.store.delete_invoice(user.user_id(), id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(user_id = %user.user_id(), invoice_id = %id, "invoice deleted");
    Ok(Json(MessageResponse::new("Invoice deleted successfully")))
}

pub async fn download_pdf(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = invoice_id(&id)?;
    let details = load(&services, user.user_id(), id).await?;
    let filename = pdf_filename(&details.invoice.invoice_number);

    // Layout and rendering are CPU-bound.
    let bytes = tokio::task::spawn_blocking(move || invoice_pdf(&details))
        .await
        .map_err(|e| ApiError::internal(format!("pdf rendering task failed: {e}")))??;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    tracing::debug!(invoice_id = %id, bytes = bytes.len(), "invoice pdf generated");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub async fn next_number() -> Json<NextNumberResponse> {
    let invoice_number = generate_invoice_number(Utc::now(), &mut rand::rng());
    Json(NextNumberResponse { invoice_number })
}

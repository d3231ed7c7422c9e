use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, rejection::QueryRejection},
};
use chrono::Utc;

use invoify_invoicing::{AnalyticsReport, DashboardSummary, InvoiceFilter, TimeRange};

use crate::app::dto::AnalyticsQuery;
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub async fn analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> ApiResult<Json<AnalyticsReport>> {
    let Query(query) = query?;
    let range = TimeRange::parse(query.time_range.as_deref());
    let since = range.start_date(Utc::now().date_naive());

    let invoices = services
        .store
        .list_invoices(user.user_id(), &InvoiceFilter::issued_since(since))
        .await?;
    tracing::debug!(range = range.as_str(), invoices = invoices.len(), "analytics computed");
    Ok(Json(AnalyticsReport::compute(&invoices)?))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<DashboardSummary>> {
    let invoices = services
        .store
        .list_invoices(user.user_id(), &InvoiceFilter::default())
        .await?;
    let clients = services.store.count_clients(user.user_id()).await?;
    Ok(Json(DashboardSummary::compute(&invoices, clients)?))
}

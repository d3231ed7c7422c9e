use axum::{Router, routing::get};

pub mod analytics;
pub mod auth;
pub mod clients;
pub mod companies;
pub mod invoices;
pub mod system;

/// Router for all authenticated (owner-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/analytics", get(analytics::analytics))
        .route("/dashboard", get(analytics::dashboard))
        .nest("/clients", clients::router())
        .nest("/companies", companies::router())
        .nest("/invoices", invoices::router())
}

//! OBAOL API Library
//!
//! Backend for the OBAOL agro-commodity marketplace: the enquiry
//! lifecycle, responsibility planning, and conversion to orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod viewer;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Web API routes, mounted under /api/v1/web
pub fn api_v1_routes() -> Router<AppState> {
    let enquiries = Router::new()
        .route(
            "/enquiry",
            post(handlers::enquiries::create_enquiry).get(handlers::enquiries::list_enquiries),
        )
        .route(
            "/enquiry/:id",
            get(handlers::enquiries::get_enquiry).patch(handlers::enquiries::update_enquiry),
        )
        .route(
            "/enquiry/:id/seller-accept",
            post(handlers::enquiries::seller_accept),
        )
        .route(
            "/enquiry/:id/buyer-confirm",
            post(handlers::enquiries::buyer_confirm),
        )
        .route(
            "/enquiry/:id/assign",
            post(handlers::enquiries::assign_employee),
        )
        .route(
            "/enquiry/:id/commit",
            post(handlers::enquiries::set_supplier_commit),
        )
        .route(
            "/enquiry/:id/convert",
            post(handlers::enquiries::convert_to_order),
        )
        .route(
            "/enquiry/:id/history",
            get(handlers::enquiries::get_history),
        );

    let orders = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route(
            "/orders/:id",
            get(handlers::orders::get_order).patch(handlers::orders::update_order),
        )
        .route(
            "/orders/:id/logistics",
            get(handlers::orders::list_logistics).post(handlers::orders::add_logistics),
        );

    Router::new().merge(enquiries).merge(orders)
}

// Operational endpoints, mounted at the root
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    Ok(Json(ApiResponse::success(json!({
        "service": "obaol-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    db::check_connection(&state.db).await?;
    Ok(Json(ApiResponse::success(json!({
        "status": "healthy",
        "database": "connected",
    }))))
}

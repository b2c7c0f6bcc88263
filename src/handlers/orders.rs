use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::order::Model as OrderModel,
    entities::order_logistics::Model as LogisticsModel,
    services::orders::{LogisticsRequest, UpdateOrderRequest},
    viewer::Viewer,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub code: String,
    pub enquiry_id: Uuid,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    pub quantity_tons: Decimal,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub procurement_by: String,
    pub certificate_by: String,
    pub transport_by: String,
    pub shipping_by: String,
    pub packaging_by: String,
    pub quality_testing_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl From<OrderModel> for OrderView {
    fn from(order: OrderModel) -> Self {
        OrderView {
            id: order.id,
            code: order.code,
            enquiry_id: order.enquiry_id,
            product_name: order.product_name,
            variant_name: order.variant_name,
            quantity_tons: order.quantity_tons,
            status: order.status,
            tracking_id: order.tracking_id,
            notes: order.notes,
            procurement_by: order.procurement_by,
            certificate_by: order.certificate_by,
            transport_by: order.transport_by,
            shipping_by: order.shipping_by,
            packaging_by: order.packaging_by,
            quality_testing_by: order.quality_testing_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
            version: order.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsView {
    pub id: Uuid,
    pub order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<LogisticsModel> for LogisticsView {
    fn from(logistics: LogisticsModel) -> Self {
        LogisticsView {
            id: logistics.id,
            order_id: logistics.order_id,
            vehicle_number: logistics.vehicle_number,
            driver_name: logistics.driver_name,
            driver_phone: logistics.driver_phone,
            transport_company: logistics.transport_company,
            current_location: logistics.current_location,
            eta: logistics.eta,
            notes: logistics.notes,
            updated_at: logistics.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    /// Restrict to the order converted from this enquiry
    pub enquiry: Option<Uuid>,
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/web/orders",
    summary = "List orders",
    description = "Paginated orders visible to the caller",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("enquiry" = Option<Uuid>, Query, description = "Filter by source enquiry"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<OrderView>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderView>> {
    let per_page = query
        .list
        .limit
        .min(state.config.api_max_page_size as u64)
        .max(1);
    let filter = crate::services::orders::OrderListFilter {
        enquiry: query.enquiry,
        status: query.status,
    };

    let page = state
        .services
        .orders
        .list_orders(&viewer, filter, query.list.page.max(1), per_page)
        .await?;

    let total_pages = if page.total == 0 {
        0
    } else {
        (page.total + per_page - 1) / per_page
    };

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: page.orders.into_iter().map(OrderView::from).collect(),
        total: page.total,
        page: page.page,
        limit: page.per_page,
        total_pages,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/web/orders/{id}",
    summary = "Get order",
    description = "Retrieve one order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderView>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderView> {
    let order = state.services.orders.get_order(&viewer, id).await?;
    Ok(Json(ApiResponse::success(OrderView::from(order))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/web/orders/{id}",
    summary = "Update order",
    description = "Partial update: status (regressions refused), tracking id, notes, responsibilities",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderView>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 422, description = "Invalid transition", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> ApiResult<OrderView> {
    let order = state
        .services
        .orders
        .update_order(&viewer, id, request)
        .await?;
    Ok(Json(ApiResponse::success(OrderView::from(order))))
}

#[utoipa::path(
    get,
    path = "/api/v1/web/orders/{id}/logistics",
    summary = "List order logistics",
    description = "Truck assignments recorded against the order, oldest first",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Logistics retrieved", body = ApiResponse<Vec<LogisticsView>>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_logistics(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<LogisticsView>> {
    let logistics = state.services.orders.list_logistics(&viewer, id).await?;
    Ok(Json(ApiResponse::success(
        logistics.into_iter().map(LogisticsView::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/orders/{id}/logistics",
    summary = "Add a logistics entry",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = LogisticsRequest,
    responses(
        (status = 200, description = "Logistics entry recorded", body = ApiResponse<LogisticsView>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn add_logistics(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<LogisticsRequest>,
) -> ApiResult<LogisticsView> {
    let logistics = state
        .services
        .orders
        .add_logistics(&viewer, id, request)
        .await?;
    Ok(Json(ApiResponse::success(LogisticsView::from(logistics))))
}

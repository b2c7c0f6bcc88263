use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::enquiry::Model as EnquiryModel,
    entities::enquiry_event::Model as EventModel,
    models::{EnquiryRole, LifecycleStage, ResponsibilityPlan},
    services::enquiries::{CreateEnquiryRequest, EnquiryListFilter, UpdateEnquiryRequest},
    viewer::Viewer,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignEmployeeRequest {
    pub employee_id: Uuid,
    #[serde(default)]
    pub employee_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierCommitRequest {
    pub commit_until: DateTime<Utc>,
}

/// A party as shown to a given viewer. Phone numbers are staff-only.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl AssociateView {
    fn build(
        id: Option<Uuid>,
        name: &Option<String>,
        company: &Option<String>,
        phone: &Option<String>,
        staff: bool,
    ) -> Option<Self> {
        id.map(|id| AssociateView {
            id,
            name: name.clone(),
            company: company.clone(),
            phone: if staff { phone.clone() } else { None },
        })
    }
}

/// The enquiry as a specific viewer sees it. Every derived field (stage,
/// net rate, trade volume) is computed against that viewer's role.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryView {
    pub id: Uuid,
    pub code: String,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    pub quantity_tons: Decimal,
    pub status: String,
    pub stage: LifecycleStage,
    pub stage_index: usize,
    pub status_message: String,
    pub viewer_role: EnquiryRole,
    pub net_rate: Decimal,
    pub trade_volume: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_profit: Option<Decimal>,
    pub can_convert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
    pub responsibilities: ResponsibilityPlan,
    pub responsibilities_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<AssociateView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<AssociateView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mediator: Option<AssociateView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_employee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_commit_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl EnquiryView {
    pub fn project(enquiry: &EnquiryModel, viewer: &Viewer) -> Self {
        let role = EnquiryRole::classify(viewer, &enquiry.parties());
        let figures = enquiry.rate_figures();
        let stage = enquiry.stage();
        let staff = role.is_staff();
        let plan = enquiry.responsibility_plan();

        EnquiryView {
            id: enquiry.id,
            code: enquiry.code.clone(),
            product_name: enquiry.product_name.clone(),
            variant_name: enquiry.variant_name.clone(),
            quantity_tons: enquiry.quantity_tons,
            status: enquiry.status.clone(),
            stage,
            stage_index: stage.index(),
            status_message: crate::models::lifecycle::status_message(&enquiry.status(), stage),
            viewer_role: role,
            net_rate: figures.net_rate(role),
            trade_volume: figures.trade_volume(enquiry.quantity_tons, role),
            estimated_profit: staff.then(|| figures.estimated_profit(enquiry.quantity_tons)),
            can_convert: enquiry.can_convert(),
            specifications: enquiry.specifications.clone(),
            responsibilities_complete: plan.is_complete(),
            responsibilities: plan.sanitized(),
            buyer: AssociateView::build(
                enquiry.buyer_id,
                &enquiry.buyer_name,
                &enquiry.buyer_company,
                &enquiry.buyer_phone,
                staff,
            ),
            seller: AssociateView::build(
                enquiry.seller_id,
                &enquiry.seller_name,
                &enquiry.seller_company,
                &enquiry.seller_phone,
                staff,
            ),
            mediator: AssociateView::build(
                enquiry.mediator_id,
                &enquiry.mediator_name,
                &enquiry.mediator_company,
                &enquiry.mediator_phone,
                staff,
            ),
            assigned_employee_id: enquiry.assigned_employee_id,
            assigned_employee_name: enquiry.assigned_employee_name.clone(),
            seller_accepted_at: enquiry.seller_accepted_at,
            buyer_confirmed_at: enquiry.buyer_confirmed_at,
            supplier_commit_until: enquiry.supplier_commit_until,
            order_id: enquiry.order_id,
            created_at: enquiry.created_at,
            updated_at: enquiry.updated_at,
            version: enquiry.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryEventView {
    pub id: Uuid,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    pub actor_role: String,
    pub created_at: DateTime<Utc>,
}

impl From<EventModel> for EnquiryEventView {
    fn from(event: EventModel) -> Self {
        EnquiryEventView {
            id: event.id,
            action: event.action,
            note: event.note,
            actor_id: event.actor_id,
            actor_role: event.actor_role,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnquiryListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry",
    summary = "Create enquiry",
    description = "Raise a new enquiry for a product variant",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry created", body = ApiResponse<EnquiryView>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<CreateEnquiryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnquiryView>>), crate::errors::ServiceError> {
    let enquiry = state.services.enquiries.create_enquiry(&viewer, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EnquiryView::project(&enquiry, &viewer))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/web/enquiry",
    summary = "List enquiries",
    description = "Paginated enquiries visible to the caller",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by raw status"),
    ),
    responses(
        (status = 200, description = "Enquiries retrieved", body = ApiResponse<PaginatedResponse<EnquiryView>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<EnquiryListQuery>,
) -> ApiResult<PaginatedResponse<EnquiryView>> {
    let per_page = query
        .list
        .limit
        .min(state.config.api_max_page_size as u64)
        .max(1);
    let filter = EnquiryListFilter {
        status: query.status,
    };

    let page = state
        .services
        .enquiries
        .list_enquiries(&viewer, filter, query.list.page.max(1), per_page)
        .await?;

    let total_pages = if page.total == 0 {
        0
    } else {
        (page.total + per_page - 1) / per_page
    };

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: page
            .enquiries
            .iter()
            .map(|e| EnquiryView::project(e, &viewer))
            .collect(),
        total: page.total,
        page: page.page,
        limit: page.per_page,
        total_pages,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/web/enquiry/{id}",
    summary = "Get enquiry",
    description = "Retrieve one enquiry projected for the caller",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry retrieved", body = ApiResponse<EnquiryView>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn get_enquiry(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<EnquiryView> {
    let enquiry = state.services.enquiries.get_enquiry(&viewer, id).await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/web/enquiry/{id}",
    summary = "Update enquiry",
    description = "Update specifications, status, or the responsibility plan",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    request_body = UpdateEnquiryRequest,
    responses(
        (status = 200, description = "Enquiry updated", body = ApiResponse<EnquiryView>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn update_enquiry(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEnquiryRequest>,
) -> ApiResult<EnquiryView> {
    let enquiry = state
        .services
        .enquiries
        .update_enquiry(&viewer, id, request)
        .await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry/{id}/seller-accept",
    summary = "Seller accept",
    description = "Record the seller's acceptance of the enquiry terms",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Acceptance recorded", body = ApiResponse<EnquiryView>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already accepted", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn seller_accept(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<EnquiryView> {
    let enquiry = state.services.enquiries.seller_accept(&viewer, id).await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry/{id}/buyer-confirm",
    summary = "Buyer confirm",
    description = "Record the buyer's confirmation; requires prior seller acceptance",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Confirmation recorded", body = ApiResponse<EnquiryView>),
        (status = 409, description = "Already confirmed", body = crate::errors::ErrorResponse),
        (status = 422, description = "Seller has not accepted yet", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn buyer_confirm(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<EnquiryView> {
    let enquiry = state.services.enquiries.buyer_confirm(&viewer, id).await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry/{id}/assign",
    summary = "Assign employee",
    description = "Assign an OBAOL employee to shepherd the enquiry",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    request_body = AssignEmployeeRequest,
    responses(
        (status = 200, description = "Employee assigned", body = ApiResponse<EnquiryView>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn assign_employee(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignEmployeeRequest>,
) -> ApiResult<EnquiryView> {
    let enquiry = state
        .services
        .enquiries
        .assign_employee(&viewer, id, request.employee_id, request.employee_name)
        .await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry/{id}/commit",
    summary = "Set supplier commit",
    description = "Record until when the supplier holds stock and price",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    request_body = SupplierCommitRequest,
    responses(
        (status = 200, description = "Commit recorded", body = ApiResponse<EnquiryView>),
        (status = 400, description = "Commit date not in the future", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn set_supplier_commit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<SupplierCommitRequest>,
) -> ApiResult<EnquiryView> {
    let enquiry = state
        .services
        .enquiries
        .set_commit_until(&viewer, id, request.commit_until)
        .await?;
    Ok(Json(ApiResponse::success(EnquiryView::project(
        &enquiry, &viewer,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/web/enquiry/{id}/convert",
    summary = "Convert to order",
    description = "Atomically create an order from a fully prepared enquiry",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 201, description = "Order created", body = ApiResponse<super::orders::OrderView>),
        (status = 409, description = "Already converted", body = crate::errors::ErrorResponse),
        (status = 422, description = "Conversion preconditions not met", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn convert_to_order(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<super::orders::OrderView>>), crate::errors::ServiceError>
{
    let order = state.services.enquiries.convert_to_order(&viewer, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(super::orders::OrderView::from(order))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/web/enquiry/{id}/history",
    summary = "Enquiry history",
    description = "Full append-only timeline for an enquiry, oldest first",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "History retrieved", body = ApiResponse<Vec<EnquiryEventView>>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "enquiries"
)]
pub async fn get_history(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<EnquiryEventView>> {
    // Visibility check rides on the enquiry fetch
    state.services.enquiries.get_enquiry(&viewer, id).await?;

    let events = state.services.enquiry_history.list_events(id).await?;
    Ok(Json(ApiResponse::success(
        events.into_iter().map(EnquiryEventView::from).collect(),
    )))
}

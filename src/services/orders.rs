use crate::{
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::order_logistics::{
        self, ActiveModel as LogisticsActiveModel, Entity as LogisticsEntity,
        Model as LogisticsModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderStatus, ResponsibilityPlan},
    viewer::Viewer,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Partial update for an order. Any combination of fields may be sent;
/// an empty body is refused.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<ResponsibilityPlan>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsRequest {
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_phone: Option<String>,
    #[serde(default)]
    pub transport_company: Option<String>,
    #[serde(default)]
    pub current_location: Option<String>,
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListFilter {
    /// Restrict to the order converted from this enquiry
    pub enquiry: Option<Uuid>,
    pub status: Option<String>,
}

pub struct OrderPage {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for orders after conversion
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Retrieves an order, enforcing party visibility for associates.
    #[instrument(skip(self), fields(order_id = %order_id, viewer_id = %viewer.id))]
    pub async fn get_order(
        &self,
        viewer: &Viewer,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order from database");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if !viewer.is_staff() && !is_party(viewer, &order) {
            // Hide existence from unrelated associates
            return Err(ServiceError::NotFound("Order not found".to_string()));
        }

        Ok(order)
    }

    /// Lists orders with pagination. Associates only see orders they are
    /// party to.
    #[instrument(skip(self, filter), fields(viewer_id = %viewer.id))]
    pub async fn list_orders(
        &self,
        viewer: &Viewer,
        filter: OrderListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderPage, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find();

        if !viewer.is_staff() {
            query = query.filter(
                Condition::any()
                    .add(order::Column::BuyerId.eq(viewer.id))
                    .add(order::Column::SellerId.eq(viewer.id))
                    .add(order::Column::MediatorId.eq(viewer.id)),
            );
        }

        if let Some(enquiry_id) = filter.enquiry {
            query = query.filter(order::Column::EnquiryId.eq(enquiry_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(order::Column::Status.eq(status.clone()));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        Ok(OrderPage {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Applies a partial update to an order. Staff only; status can move
    /// forward or to Cancelled, never backward, and terminal orders refuse
    /// every other change.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        viewer: &Viewer,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        if !viewer.is_staff() {
            return Err(ServiceError::Forbidden(
                "Only staff can update orders".to_string(),
            ));
        }

        if request.status.is_none()
            && request.tracking_id.is_none()
            && request.notes.is_none()
            && request.responsibilities.is_none()
        {
            return Err(ServiceError::ValidationError(
                "Nothing to update".to_string(),
            ));
        }

        let new_status = match &request.status {
            Some(raw) => Some(raw.parse::<OrderStatus>().map_err(|_| {
                ServiceError::InvalidStatus(format!("Unknown order status '{}'", raw))
            })?),
            None => None,
        };

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for order update");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order for update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let current = order.status().map_err(ServiceError::DatabaseError)?;
        if current.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Order in status '{}' can no longer change",
                current
            )));
        }
        if let Some(next) = new_status {
            if !current.can_transition(next) {
                return Err(ServiceError::InvalidTransition(format!(
                    "Order cannot move from '{}' to '{}'",
                    current, next
                )));
            }
        }

        let old_status = order.status.clone();
        let version = order.version;
        let mut active: OrderActiveModel = order.into();
        if let Some(next) = new_status {
            active.status = Set(next.to_string());
        }
        if let Some(tracking_id) = request.tracking_id {
            active.tracking_id = Set(Some(tracking_id));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(plan) = &request.responsibilities {
            // Unset duties fall back to obaol on the order copy
            let [procurement, certificate, transport, shipping, packaging, quality] =
                plan.owners();
            active.procurement_by = Set(procurement.to_string());
            active.certificate_by = Set(certificate.to_string());
            active.transport_by = Set(transport.to_string());
            active.shipping_by = Set(shipping.to_string());
            active.packaging_by = Set(packaging.to_string());
            active.quality_testing_by = Set(quality.to_string());
        }
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %updated.status, "Order updated");

        if let Some(next) = new_status {
            self.emit(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status: next.to_string(),
            })
            .await;
        }

        Ok(updated)
    }

    /// Records a new truck assignment against an order. Staff only.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn add_logistics(
        &self,
        viewer: &Viewer,
        order_id: Uuid,
        request: LogisticsRequest,
    ) -> Result<LogisticsModel, ServiceError> {
        if !viewer.is_staff() {
            return Err(ServiceError::Forbidden(
                "Only staff can update order logistics".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for logistics entry");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order for logistics entry");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let current = order.status().map_err(ServiceError::DatabaseError)?;
        if current.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Logistics cannot change on an order in status '{}'",
                current
            )));
        }

        let active = LogisticsActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            vehicle_number: Set(request.vehicle_number),
            driver_name: Set(request.driver_name),
            driver_phone: Set(request.driver_phone),
            transport_company: Set(request.transport_company),
            current_location: Set(request.current_location),
            eta: Set(request.eta),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let saved = active.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to save logistics entry");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit logistics transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, logistics_id = %saved.id, "Logistics entry recorded");
        self.emit(Event::OrderLogisticsUpdated(order_id)).await;

        Ok(saved)
    }

    /// Returns every truck assignment for an order the viewer can see,
    /// oldest first.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_logistics(
        &self,
        viewer: &Viewer,
        order_id: Uuid,
    ) -> Result<Vec<LogisticsModel>, ServiceError> {
        // Reuse the visibility check from get_order
        self.get_order(viewer, order_id).await?;

        let db = &*self.db_pool;
        LogisticsEntity::find()
            .filter(order_logistics::Column::OrderId.eq(order_id))
            .order_by_asc(order_logistics::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order logistics");
                ServiceError::DatabaseError(e)
            })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }
}

fn is_party(viewer: &Viewer, order: &OrderModel) -> bool {
    [order.buyer_id, order.seller_id, order.mediator_id]
        .iter()
        .any(|slot| *slot == Some(viewer.id))
}

use crate::{
    db::DbPool,
    entities::enquiry_event::{self, ActiveModel as EventActiveModel, Entity as EventEntity},
    errors::ServiceError,
    models::EnquiryRole,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

/// Appends a history row inside the caller's transaction, so the record
/// commits or rolls back with the state change it describes.
pub async fn append_event<C: ConnectionTrait>(
    conn: &C,
    enquiry_id: Uuid,
    action: &str,
    note: Option<String>,
    actor_id: Option<Uuid>,
    actor_role: EnquiryRole,
) -> Result<enquiry_event::Model, sea_orm::DbErr> {
    let event = EventActiveModel {
        id: Set(Uuid::new_v4()),
        enquiry_id: Set(enquiry_id),
        action: Set(action.to_string()),
        note: Set(note),
        actor_id: Set(actor_id),
        actor_role: Set(actor_role.to_string()),
        created_at: Set(Utc::now()),
    };

    event.insert(conn).await
}

/// Read side of the enquiry timeline.
#[derive(Clone)]
pub struct EnquiryHistoryService {
    db_pool: Arc<DbPool>,
}

impl EnquiryHistoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns the full timeline for an enquiry, oldest first.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id))]
    pub async fn list_events(
        &self,
        enquiry_id: Uuid,
    ) -> Result<Vec<enquiry_event::Model>, ServiceError> {
        let db = &*self.db_pool;

        EventEntity::find()
            .filter(enquiry_event::Column::EnquiryId.eq(enquiry_id))
            .order_by_asc(enquiry_event::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, enquiry_id = %enquiry_id, "Failed to fetch enquiry history");
                ServiceError::DatabaseError(e)
            })
    }
}

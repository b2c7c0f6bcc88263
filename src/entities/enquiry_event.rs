use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only history row for an enquiry. Rows are only ever inserted,
/// in the same transaction as the state change they record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquiry_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub enquiry_id: Uuid,

    /// Machine-readable action name, e.g. "seller_accepted"
    pub action: String,

    /// Human-readable note for the timeline
    pub note: Option<String>,

    pub actor_id: Option<Uuid>,
    pub actor_role: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enquiry::Entity",
        from = "Column::EnquiryId",
        to = "super::enquiry::Column::Id"
    )]
    Enquiry,
}

impl Related<super::enquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enquiry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

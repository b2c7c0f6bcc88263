use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::OrderStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-facing order code, e.g. "ORD-2026-0042"
    #[validate(length(
        min = 1,
        max = 50,
        message = "Order code must be between 1 and 50 characters"
    ))]
    pub code: String,

    /// The enquiry this order was converted from
    pub enquiry_id: Uuid,

    pub product_name: String,
    pub variant_name: Option<String>,

    pub quantity_tons: Decimal,
    pub rate: Decimal,
    pub admin_commission: Decimal,
    pub mediator_commission: Decimal,

    pub buyer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub mediator_id: Option<Uuid>,

    pub status: String,

    /// External shipment reference, set once the consignment is booked
    pub tracking_id: Option<String>,
    pub notes: Option<String>,

    /// Responsibility owners copied at conversion, sanitized, never empty
    pub procurement_by: String,
    pub certificate_by: String,
    pub transport_by: String,
    pub shipping_by: String,
    pub packaging_by: String,
    pub quality_testing_by: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_logistics::Entity")]
    Logistics,
}

impl Related<super::order_logistics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logistics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<OrderStatus, DbErr> {
        self.status
            .parse::<OrderStatus>()
            .map_err(|_| DbErr::Custom(format!("unknown order status '{}'", self.status)))
    }
}

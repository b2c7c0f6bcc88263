use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    derive_stage, EnquiryStatus, LifecycleStage, PartyIds, RateFigures, ResponsibilityPlan,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "enquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-facing enquiry code, e.g. "ENQ-2026-0042"
    #[validate(length(
        min = 1,
        max = 50,
        message = "Enquiry code must be between 1 and 50 characters"
    ))]
    pub code: String,

    pub product_name: String,
    pub variant_name: Option<String>,
    pub variant_rate_id: Option<Uuid>,

    /// Quantity in metric tons; rates are quoted per kilogram
    pub quantity_tons: Decimal,
    pub rate: Decimal,
    pub admin_commission: Decimal,
    pub mediator_commission: Decimal,

    pub buyer_id: Option<Uuid>,
    pub buyer_name: Option<String>,
    pub buyer_company: Option<String>,
    pub buyer_phone: Option<String>,

    pub seller_id: Option<Uuid>,
    pub seller_name: Option<String>,
    pub seller_company: Option<String>,
    pub seller_phone: Option<String>,

    pub mediator_id: Option<Uuid>,
    pub mediator_name: Option<String>,
    pub mediator_company: Option<String>,
    pub mediator_phone: Option<String>,

    pub assigned_employee_id: Option<Uuid>,
    pub assigned_employee_name: Option<String>,

    /// Free text on the wire; parsed through EnquiryStatus for decisions
    pub status: String,
    pub specifications: Option<String>,

    pub seller_accepted_at: Option<DateTime<Utc>>,
    pub buyer_confirmed_at: Option<DateTime<Utc>>,
    pub supplier_commit_until: Option<DateTime<Utc>>,

    /// Responsibility plan fields, raw as last saved ("" = never set)
    pub procurement_by: String,
    pub certificate_by: String,
    pub transport_by: String,
    pub shipping_by: String,
    pub packaging_by: String,
    pub quality_testing_by: String,

    /// Set once the enquiry has been converted
    pub order_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enquiry_event::Entity")]
    Events,
}

impl Related<super::enquiry_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> EnquiryStatus {
        EnquiryStatus::parse(&self.status)
    }

    pub fn responsibility_plan(&self) -> ResponsibilityPlan {
        ResponsibilityPlan {
            procurement_by: self.procurement_by.clone(),
            certificate_by: self.certificate_by.clone(),
            transport_by: self.transport_by.clone(),
            shipping_by: self.shipping_by.clone(),
            packaging_by: self.packaging_by.clone(),
            quality_testing_by: self.quality_testing_by.clone(),
        }
    }

    pub fn parties(&self) -> PartyIds {
        PartyIds {
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            mediator_id: self.mediator_id,
        }
    }

    pub fn rate_figures(&self) -> RateFigures {
        RateFigures {
            base_rate: self.rate,
            admin_commission: self.admin_commission,
            mediator_commission: self.mediator_commission,
        }
    }

    /// The derived lifecycle stage; never stored, always recomputed.
    pub fn stage(&self) -> LifecycleStage {
        derive_stage(
            &self.status(),
            self.seller_accepted_at.is_some(),
            self.buyer_confirmed_at.is_some(),
            self.responsibility_plan().is_complete(),
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether every conversion precondition holds. The service re-checks
    /// this inside the conversion transaction.
    pub fn can_convert(&self) -> bool {
        !self.is_terminal()
            && self.order_id.is_none()
            && self.status() != EnquiryStatus::Converted
            && self.seller_accepted_at.is_some()
            && self.buyer_confirmed_at.is_some()
            && self.responsibility_plan().is_complete()
    }
}

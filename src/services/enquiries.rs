use crate::{
    db::DbPool,
    entities::enquiry::{
        self, ActiveModel as EnquiryActiveModel, Entity as EnquiryEntity, Model as EnquiryModel,
    },
    entities::order::{ActiveModel as OrderActiveModel, Model as OrderModel},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{AssociateRef, EnquiryRole, EnquiryStatus, OrderStatus, ResponsibilityPlan},
    services::history::append_event,
    viewer::Viewer,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request types for the enquiry service
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryRequest {
    pub product_name: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub variant_rate_id: Option<Uuid>,
    pub quantity_tons: Decimal,
    pub rate: Decimal,
    #[serde(default)]
    pub admin_commission: Decimal,
    #[serde(default)]
    pub mediator_commission: Decimal,
    #[serde(default)]
    pub buyer: Option<AssociateRef>,
    #[serde(default)]
    pub seller: Option<AssociateRef>,
    #[serde(default)]
    pub mediator: Option<AssociateRef>,
    #[serde(default)]
    pub specifications: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnquiryRequest {
    #[serde(default)]
    pub specifications: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<ResponsibilityPlan>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EnquiryListFilter {
    pub status: Option<String>,
}

pub struct EnquiryPage {
    pub enquiries: Vec<EnquiryModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Generates a human-facing code like "ENQ-2026-K7M2QX". Codes are
/// unique-indexed; the entropy here makes collisions a retry case, not
/// a design case.
pub(crate) fn generate_code(prefix: &str) -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, Utc::now().format("%Y"), suffix)
}

/// Service for the enquiry side of the lifecycle
#[derive(Clone)]
pub struct EnquiryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl EnquiryService {
    /// Creates a new enquiry service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new enquiry. Staff can create on behalf of any parties;
    /// an associate must be one of the parties they name.
    #[instrument(skip(self, request), fields(viewer_id = %viewer.id, product = %request.product_name))]
    pub async fn create_enquiry(
        &self,
        viewer: &Viewer,
        request: CreateEnquiryRequest,
    ) -> Result<EnquiryModel, ServiceError> {
        if request.product_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name is required".to_string(),
            ));
        }
        if request.quantity_tons <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        if request.rate < Decimal::ZERO
            || request.admin_commission < Decimal::ZERO
            || request.mediator_commission < Decimal::ZERO
        {
            return Err(ServiceError::ValidationError(
                "Rates and commissions cannot be negative".to_string(),
            ));
        }

        let buyer_id = request.buyer.as_ref().map(AssociateRef::resolve_id);
        let seller_id = request.seller.as_ref().map(AssociateRef::resolve_id);
        let mediator_id = request.mediator.as_ref().map(AssociateRef::resolve_id);

        if !viewer.is_staff() {
            let is_party = [buyer_id, seller_id, mediator_id]
                .iter()
                .any(|slot| *slot == Some(viewer.id));
            if !is_party {
                return Err(ServiceError::Forbidden(
                    "Associates can only create enquiries they are party to".to_string(),
                ));
            }
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let enquiry_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for enquiry creation");
            ServiceError::DatabaseError(e)
        })?;

        let detail = |r: &Option<AssociateRef>, f: fn(&crate::models::AssociateDetails) -> Option<String>| {
            r.as_ref().and_then(AssociateRef::details).and_then(f)
        };

        let enquiry = EnquiryActiveModel {
            id: Set(enquiry_id),
            code: Set(generate_code("ENQ")),
            product_name: Set(request.product_name.trim().to_string()),
            variant_name: Set(request.variant_name),
            variant_rate_id: Set(request.variant_rate_id),
            quantity_tons: Set(request.quantity_tons),
            rate: Set(request.rate),
            admin_commission: Set(request.admin_commission),
            mediator_commission: Set(request.mediator_commission),
            buyer_id: Set(buyer_id),
            buyer_name: Set(detail(&request.buyer, |d| d.name.clone())),
            buyer_company: Set(detail(&request.buyer, |d| d.company.clone())),
            buyer_phone: Set(detail(&request.buyer, |d| d.phone.clone())),
            seller_id: Set(seller_id),
            seller_name: Set(detail(&request.seller, |d| d.name.clone())),
            seller_company: Set(detail(&request.seller, |d| d.company.clone())),
            seller_phone: Set(detail(&request.seller, |d| d.phone.clone())),
            mediator_id: Set(mediator_id),
            mediator_name: Set(detail(&request.mediator, |d| d.name.clone())),
            mediator_company: Set(detail(&request.mediator, |d| d.company.clone())),
            mediator_phone: Set(detail(&request.mediator, |d| d.phone.clone())),
            assigned_employee_id: Set(None),
            assigned_employee_name: Set(None),
            status: Set(EnquiryStatus::Pending.to_string()),
            specifications: Set(request.specifications),
            seller_accepted_at: Set(None),
            buyer_confirmed_at: Set(None),
            supplier_commit_until: Set(None),
            procurement_by: Set(String::new()),
            certificate_by: Set(String::new()),
            transport_by: Set(String::new()),
            shipping_by: Set(String::new()),
            packaging_by: Set(String::new()),
            quality_testing_by: Set(String::new()),
            order_id: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        };

        let model = enquiry.insert(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to create enquiry in database");
            ServiceError::DatabaseError(e)
        })?;

        let role = EnquiryRole::classify(viewer, &model.parties());
        append_event(
            &txn,
            enquiry_id,
            "created",
            Some(format!("Enquiry {} raised", model.code)),
            Some(viewer.id),
            role,
        )
        .await
        .map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to record enquiry creation");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit enquiry creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, code = %model.code, "Enquiry created successfully");

        self.emit(Event::EnquiryCreated(enquiry_id)).await;

        Ok(model)
    }

    /// Retrieves an enquiry, enforcing party visibility for associates.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn get_enquiry(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
    ) -> Result<EnquiryModel, ServiceError> {
        let db = &*self.db_pool;

        let enquiry = EnquiryEntity::find_by_id(enquiry_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, enquiry_id = %enquiry_id, "Failed to fetch enquiry from database");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound("Enquiry not found".to_string()))?;

        let role = EnquiryRole::classify(viewer, &enquiry.parties());
        if role == EnquiryRole::Other {
            // Hide existence from unrelated associates
            return Err(ServiceError::NotFound("Enquiry not found".to_string()));
        }

        Ok(enquiry)
    }

    /// Lists enquiries with pagination. Associates only see enquiries they
    /// are party to.
    #[instrument(skip(self, filter), fields(viewer_id = %viewer.id))]
    pub async fn list_enquiries(
        &self,
        viewer: &Viewer,
        filter: EnquiryListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<EnquiryPage, ServiceError> {
        let db = &*self.db_pool;

        let mut query = EnquiryEntity::find();

        if !viewer.is_staff() {
            query = query.filter(
                Condition::any()
                    .add(enquiry::Column::BuyerId.eq(viewer.id))
                    .add(enquiry::Column::SellerId.eq(viewer.id))
                    .add(enquiry::Column::MediatorId.eq(viewer.id)),
            );
        }

        if let Some(status) = &filter.status {
            query = query.filter(enquiry::Column::Status.eq(status.clone()));
        }

        let paginator = query
            .order_by_desc(enquiry::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count enquiries");
            ServiceError::DatabaseError(e)
        })?;

        let enquiries = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch enquiries page");
            ServiceError::DatabaseError(e)
        })?;

        Ok(EnquiryPage {
            enquiries,
            total,
            page,
            per_page,
        })
    }

    /// Records the seller's acceptance of the enquiry terms.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn seller_accept(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
    ) -> Result<EnquiryModel, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for seller accept");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;
        let role = EnquiryRole::classify(viewer, &enquiry.parties());
        if role == EnquiryRole::Other {
            return Err(ServiceError::NotFound("Enquiry not found".to_string()));
        }
        if !role.is_staff() && role != EnquiryRole::Seller {
            return Err(ServiceError::Forbidden(
                "Only the seller can accept an enquiry".to_string(),
            ));
        }
        ensure_open(&enquiry)?;
        if enquiry.seller_accepted_at.is_some() {
            return Err(ServiceError::Conflict(
                "Seller has already accepted this enquiry".to_string(),
            ));
        }

        let version = enquiry.version;
        let mut active: EnquiryActiveModel = enquiry.into();
        active.seller_accepted_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to record seller acceptance");
            ServiceError::DatabaseError(e)
        })?;

        append_event(
            &txn,
            enquiry_id,
            "seller_accepted",
            Some("Seller accepted the enquiry terms".to_string()),
            Some(viewer.id),
            role,
        )
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit seller accept transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, "Seller accepted enquiry");
        self.emit(Event::SellerAccepted(enquiry_id)).await;

        Ok(updated)
    }

    /// Records the buyer's confirmation. Requires the seller to have
    /// accepted first.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn buyer_confirm(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
    ) -> Result<EnquiryModel, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for buyer confirm");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;
        let role = EnquiryRole::classify(viewer, &enquiry.parties());
        if role == EnquiryRole::Other {
            return Err(ServiceError::NotFound("Enquiry not found".to_string()));
        }
        if !role.is_staff() && role != EnquiryRole::Buyer {
            return Err(ServiceError::Forbidden(
                "Only the buyer can confirm an enquiry".to_string(),
            ));
        }
        ensure_open(&enquiry)?;
        if enquiry.seller_accepted_at.is_none() {
            return Err(ServiceError::InvalidTransition(
                "Buyer cannot confirm before the seller accepts".to_string(),
            ));
        }
        if enquiry.buyer_confirmed_at.is_some() {
            return Err(ServiceError::Conflict(
                "Buyer has already confirmed this enquiry".to_string(),
            ));
        }

        let version = enquiry.version;
        let mut active: EnquiryActiveModel = enquiry.into();
        active.buyer_confirmed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to record buyer confirmation");
            ServiceError::DatabaseError(e)
        })?;

        append_event(
            &txn,
            enquiry_id,
            "buyer_confirmed",
            Some("Buyer confirmed the enquiry".to_string()),
            Some(viewer.id),
            role,
        )
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit buyer confirm transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, "Buyer confirmed enquiry");
        self.emit(Event::BuyerConfirmed(enquiry_id)).await;

        Ok(updated)
    }

    /// Updates specifications, status, and the responsibility plan.
    ///
    /// Status writes are staff only; the responsibility plan is open to
    /// the buyer party, the seller party, and staff; specifications to the
    /// buyer party and staff. Unrelated associates see no enquiry at all.
    /// Plan saves require an actual change and are frozen once the enquiry
    /// is converted or terminal.
    #[instrument(skip(self, request), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn update_enquiry(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
        request: UpdateEnquiryRequest,
    ) -> Result<EnquiryModel, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for enquiry update");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;
        let role = EnquiryRole::classify(viewer, &enquiry.parties());

        if role == EnquiryRole::Other {
            // Same as the read path: existence is not leaked
            return Err(ServiceError::NotFound("Enquiry not found".to_string()));
        }
        if request.status.is_some() && !role.is_staff() {
            return Err(ServiceError::Forbidden(
                "Only staff can change the enquiry status".to_string(),
            ));
        }
        if request.responsibilities.is_some()
            && !matches!(role, EnquiryRole::Staff | EnquiryRole::Buyer | EnquiryRole::Seller)
        {
            return Err(ServiceError::Forbidden(
                "Only the buyer, the seller, or staff can save the responsibility plan"
                    .to_string(),
            ));
        }
        if request.specifications.is_some()
            && !matches!(role, EnquiryRole::Staff | EnquiryRole::Buyer)
        {
            return Err(ServiceError::Forbidden(
                "Only the buyer or staff can edit specifications".to_string(),
            ));
        }

        ensure_open(&enquiry)?;

        let old_status = enquiry.status.clone();
        let old_specs = enquiry.specifications.clone();
        let stored_plan = enquiry.responsibility_plan();
        let version = enquiry.version;
        let converted = enquiry.status() == EnquiryStatus::Converted;
        let mut active: EnquiryActiveModel = enquiry.into();
        let mut touched = false;

        let mut specs_change: Option<(Option<String>, String)> = None;
        if let Some(specs) = request.specifications {
            if old_specs.as_deref() != Some(specs.as_str()) {
                specs_change = Some((old_specs, specs.clone()));
                active.specifications = Set(Some(specs));
                touched = true;
            }
        }

        let mut status_change: Option<(String, String)> = None;
        if let Some(new_status) = request.status {
            let parsed = EnquiryStatus::parse(&new_status);
            if parsed == EnquiryStatus::Converted {
                return Err(ServiceError::InvalidStatus(
                    "Converted is set by conversion, not by status update".to_string(),
                ));
            }
            if new_status != old_status {
                status_change = Some((old_status.clone(), new_status.clone()));
                active.status = Set(new_status);
                touched = true;
            }
        }

        let mut plan_change: Option<Vec<&'static str>> = None;
        if let Some(submitted) = request.responsibilities {
            if converted {
                return Err(ServiceError::InvalidOperation(
                    "The responsibility plan is frozen after conversion".to_string(),
                ));
            }
            let sanitized = submitted.sanitized();
            let changed = sanitized.changed_fields(&stored_plan);
            if changed.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Responsibility plan save requires at least one change".to_string(),
                ));
            }
            active.procurement_by = Set(sanitized.procurement_by.clone());
            active.certificate_by = Set(sanitized.certificate_by.clone());
            active.transport_by = Set(sanitized.transport_by.clone());
            active.shipping_by = Set(sanitized.shipping_by.clone());
            active.packaging_by = Set(sanitized.packaging_by.clone());
            active.quality_testing_by = Set(sanitized.quality_testing_by.clone());
            plan_change = Some(changed);
            touched = true;
        }

        if !touched {
            return Err(ServiceError::ValidationError(
                "Nothing to update".to_string(),
            ));
        }

        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to update enquiry");
            ServiceError::DatabaseError(e)
        })?;

        if let Some((old, new)) = &specs_change {
            append_event(
                &txn,
                enquiry_id,
                "specifications_changed",
                Some(format!(
                    "Specifications changed from '{}' to '{}'",
                    old.as_deref().unwrap_or("-"),
                    new
                )),
                Some(viewer.id),
                role,
            )
            .await
            .map_err(ServiceError::DatabaseError)?;
        }

        if let Some((old, new)) = &status_change {
            append_event(
                &txn,
                enquiry_id,
                "status_changed",
                Some(format!("Status changed from '{}' to '{}'", old, new)),
                Some(viewer.id),
                role,
            )
            .await
            .map_err(ServiceError::DatabaseError)?;
        }

        if let Some(changed) = &plan_change {
            append_event(
                &txn,
                enquiry_id,
                "responsibilities_saved",
                Some(format!(
                    "Changed {}; now {}",
                    changed.join(", "),
                    updated.responsibility_plan().summary()
                )),
                Some(viewer.id),
                role,
            )
            .await
            .map_err(ServiceError::DatabaseError)?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit enquiry update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, "Enquiry updated successfully");

        if let Some((old_status, new_status)) = status_change {
            self.emit(Event::EnquiryStatusChanged {
                enquiry_id,
                old_status,
                new_status,
            })
            .await;
        }
        if let Some(changed) = plan_change {
            self.emit(Event::ResponsibilityPlanSaved {
                enquiry_id,
                changed_fields: changed.iter().map(|f| f.to_string()).collect(),
            })
            .await;
        } else {
            self.emit(Event::EnquiryUpdated(enquiry_id)).await;
        }

        Ok(updated)
    }

    /// Assigns an OBAOL employee to shepherd the enquiry. Staff only.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, employee_id = %employee_id))]
    pub async fn assign_employee(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
        employee_id: Uuid,
        employee_name: Option<String>,
    ) -> Result<EnquiryModel, ServiceError> {
        if !viewer.is_staff() {
            return Err(ServiceError::Forbidden(
                "Only staff can assign an employee".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for assignment");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;
        ensure_open(&enquiry)?;

        let version = enquiry.version;
        let mut active: EnquiryActiveModel = enquiry.into();
        active.assigned_employee_id = Set(Some(employee_id));
        active.assigned_employee_name = Set(employee_name.clone());
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to assign employee");
            ServiceError::DatabaseError(e)
        })?;

        append_event(
            &txn,
            enquiry_id,
            "employee_assigned",
            Some(match &employee_name {
                Some(name) => format!("Assigned to {}", name),
                None => format!("Assigned to employee {}", employee_id),
            }),
            Some(viewer.id),
            EnquiryRole::Staff,
        )
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit assignment transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, employee_id = %employee_id, "Employee assigned to enquiry");
        self.emit(Event::EnquiryAssigned {
            enquiry_id,
            employee_id,
        })
        .await;

        Ok(updated)
    }

    /// Sets the date until which the supplier commits to holding stock
    /// and price. Seller or staff; the date must be in the future.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn set_commit_until(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
        commit_until: DateTime<Utc>,
    ) -> Result<EnquiryModel, ServiceError> {
        if commit_until <= Utc::now() {
            return Err(ServiceError::ValidationError(
                "Commit date must be in the future".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for supplier commit");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;
        let role = EnquiryRole::classify(viewer, &enquiry.parties());
        if !role.is_staff() && role != EnquiryRole::Seller {
            return Err(ServiceError::Forbidden(
                "Only the seller can commit stock".to_string(),
            ));
        }
        ensure_open(&enquiry)?;

        let version = enquiry.version;
        let mut active: EnquiryActiveModel = enquiry.into();
        active.supplier_commit_until = Set(Some(commit_until));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to set supplier commit");
            ServiceError::DatabaseError(e)
        })?;

        append_event(
            &txn,
            enquiry_id,
            "supplier_commit_set",
            Some(format!(
                "Supplier committed until {}",
                commit_until.format("%Y-%m-%d")
            )),
            Some(viewer.id),
            role,
        )
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit supplier commit transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, commit_until = %commit_until, "Supplier commit recorded");
        self.emit(Event::SupplierCommitSet {
            enquiry_id,
            commit_until,
        })
        .await;

        Ok(updated)
    }

    /// Converts a fully prepared enquiry into an order.
    ///
    /// All preconditions are re-checked inside the transaction: seller
    /// accepted, buyer confirmed, complete responsibility plan, not
    /// already converted, not terminal. The order is created and the
    /// enquiry linked to it atomically.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id, viewer_id = %viewer.id))]
    pub async fn convert_to_order(
        &self,
        viewer: &Viewer,
        enquiry_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        if !viewer.is_staff() {
            return Err(ServiceError::Forbidden(
                "Only staff can convert an enquiry to an order".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to start transaction for conversion");
            ServiceError::DatabaseError(e)
        })?;

        let enquiry = load_for_update(&txn, enquiry_id).await?;

        if enquiry.order_id.is_some() || enquiry.status() == EnquiryStatus::Converted {
            return Err(ServiceError::Conflict(
                "Enquiry has already been converted".to_string(),
            ));
        }
        if enquiry.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Enquiry in status '{}' cannot be converted",
                enquiry.status
            )));
        }
        if enquiry.seller_accepted_at.is_none() {
            return Err(ServiceError::ConversionBlocked(
                "Seller has not accepted the enquiry".to_string(),
            ));
        }
        if enquiry.buyer_confirmed_at.is_none() {
            return Err(ServiceError::ConversionBlocked(
                "Buyer has not confirmed the enquiry".to_string(),
            ));
        }
        let plan = enquiry.responsibility_plan();
        if !plan.is_complete() {
            return Err(ServiceError::ConversionBlocked(
                "Responsibility plan is incomplete".to_string(),
            ));
        }

        let order_id = Uuid::new_v4();
        // Unset duties default to OBAOL on the order copy
        let [procurement, certificate, transport, shipping, packaging, quality] = plan.owners();

        let order = OrderActiveModel {
            id: Set(order_id),
            code: Set(generate_code("ORD")),
            enquiry_id: Set(enquiry.id),
            product_name: Set(enquiry.product_name.clone()),
            variant_name: Set(enquiry.variant_name.clone()),
            quantity_tons: Set(enquiry.quantity_tons),
            rate: Set(enquiry.rate),
            admin_commission: Set(enquiry.admin_commission),
            mediator_commission: Set(enquiry.mediator_commission),
            buyer_id: Set(enquiry.buyer_id),
            seller_id: Set(enquiry.seller_id),
            mediator_id: Set(enquiry.mediator_id),
            status: Set(OrderStatus::Procuring.to_string()),
            tracking_id: Set(None),
            notes: Set(enquiry.specifications.clone()),
            procurement_by: Set(procurement.to_string()),
            certificate_by: Set(certificate.to_string()),
            transport_by: Set(transport.to_string()),
            shipping_by: Set(shipping.to_string()),
            packaging_by: Set(packaging.to_string()),
            quality_testing_by: Set(quality.to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        };

        let order_model = order.insert(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to create order during conversion");
            ServiceError::DatabaseError(e)
        })?;

        let version = enquiry.version;
        let mut active: EnquiryActiveModel = enquiry.into();
        active.status = Set(EnquiryStatus::Converted.to_string());
        active.order_id = Set(Some(order_id));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        active.update(&txn).await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to link enquiry to order");
            ServiceError::DatabaseError(e)
        })?;

        append_event(
            &txn,
            enquiry_id,
            "converted",
            Some(format!("Converted to order {}", order_model.code)),
            Some(viewer.id),
            EnquiryRole::Staff,
        )
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to commit conversion transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %enquiry_id, order_id = %order_id, "Enquiry converted to order");
        self.emit(Event::EnquiryConverted {
            enquiry_id,
            order_id,
        })
        .await;

        Ok(order_model)
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send enquiry event");
            }
        }
    }
}

/// Loads an enquiry inside a transaction or reports it missing.
async fn load_for_update(
    txn: &DatabaseTransaction,
    enquiry_id: Uuid,
) -> Result<EnquiryModel, ServiceError> {
    EnquiryEntity::find_by_id(enquiry_id)
        .one(txn)
        .await
        .map_err(|e| {
            error!(error = %e, enquiry_id = %enquiry_id, "Failed to load enquiry");
            ServiceError::DatabaseError(e)
        })?
        .ok_or_else(|| ServiceError::NotFound("Enquiry not found".to_string()))
}

/// Terminal enquiries are immutable apart from reads.
fn ensure_open(enquiry: &EnquiryModel) -> Result<(), ServiceError> {
    if enquiry.is_terminal() {
        return Err(ServiceError::InvalidOperation(format!(
            "Enquiry in terminal status '{}' cannot be modified",
            enquiry.status
        )));
    }
    Ok(())
}

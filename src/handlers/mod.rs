pub mod enquiries;
pub mod orders;

use crate::{
    db::DbPool,
    events::EventSender,
    services::{EnquiryHistoryService, EnquiryService, OrderService},
};
use std::sync::Arc;

/// Aggregate of the service layer, shared through AppState.
#[derive(Clone)]
pub struct AppServices {
    pub enquiries: Arc<EnquiryService>,
    pub enquiry_history: Arc<EnquiryHistoryService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            enquiries: Arc::new(EnquiryService::new(db.clone(), event_sender.clone())),
            enquiry_history: Arc::new(EnquiryHistoryService::new(db.clone())),
            orders: Arc::new(OrderService::new(db, event_sender)),
        }
    }
}

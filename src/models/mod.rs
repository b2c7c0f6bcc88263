// Domain logic for the enquiry lifecycle. Everything in here is pure:
// functions take the viewer and the enquiry snapshot explicitly and never
// touch the database or ambient state.
pub mod lifecycle;
pub mod party;
pub mod rates;
pub mod responsibility;

pub use lifecycle::{derive_stage, EnquiryStatus, LifecycleStage, OrderStatus};
pub use party::{AssociateDetails, AssociateRef};
pub use rates::{EnquiryRole, PartyIds, RateFigures};
pub use responsibility::{sanitize_owner, Owner, ResponsibilityPlan};

pub mod enquiry;
pub mod enquiry_event;
pub mod order;
pub mod order_logistics;

pub use enquiry::Entity as Enquiry;
pub use enquiry_event::Entity as EnquiryEvent;
pub use order::Entity as Order;
pub use order_logistics::Entity as OrderLogistics;

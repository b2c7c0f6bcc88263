pub mod enquiries;
pub mod history;
pub mod orders;

pub use enquiries::EnquiryService;
pub use history::EnquiryHistoryService;
pub use orders::OrderService;

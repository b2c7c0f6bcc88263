use serde::Serialize;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Enum representing the possible statuses of an enquiry.
///
/// Stored as a string; legacy records may carry values outside the known
/// set, which parse into `Other` rather than failing.
#[derive(Clone, Debug, PartialEq, Eq, Display, EnumString)]
pub enum EnquiryStatus {
    Pending,
    Converted,
    Completed,
    Closed,
    Cancelled,
    #[strum(default)]
    Other(String),
}

impl EnquiryStatus {
    /// Parses a stored status string. Never fails: unrecognized values
    /// become `Other`.
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_string()))
    }

    /// Terminal statuses freeze the enquiry; no further mutation is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Closed | Self::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// The coarse lifecycle stage shown on the enquiry stepper.
///
/// Ordered: the discriminant is the stepper index. Cancellation does not
/// have its own stage; a cancelled enquiry still resolves through the
/// priority chain and cancellation messaging is handled separately by
/// [`status_message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Display, ToSchema)]
pub enum LifecycleStage {
    #[serde(rename = "Pending")]
    #[strum(serialize = "Pending")]
    Pending = 0,
    #[serde(rename = "Supplier Accepted")]
    #[strum(serialize = "Supplier Accepted")]
    SupplierAccepted = 1,
    #[serde(rename = "Buyer Confirmed")]
    #[strum(serialize = "Buyer Confirmed")]
    BuyerConfirmed = 2,
    #[serde(rename = "Responsibilities Finalized")]
    #[strum(serialize = "Responsibilities Finalized")]
    ResponsibilitiesFinalized = 3,
    #[serde(rename = "Converted")]
    #[strum(serialize = "Converted")]
    Converted = 4,
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed = 5,
}

impl LifecycleStage {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Derives the lifecycle stage from an enquiry snapshot.
///
/// Pure priority chain, first match wins, evaluated high to low. The stage
/// is never stored; it is recomputed from the flags on every read.
pub fn derive_stage(
    status: &EnquiryStatus,
    seller_accepted: bool,
    buyer_confirmed: bool,
    plan_complete: bool,
) -> LifecycleStage {
    match status {
        EnquiryStatus::Completed | EnquiryStatus::Closed => LifecycleStage::Completed,
        EnquiryStatus::Converted => LifecycleStage::Converted,
        _ if plan_complete && buyer_confirmed => LifecycleStage::ResponsibilitiesFinalized,
        _ if buyer_confirmed => LifecycleStage::BuyerConfirmed,
        _ if seller_accepted => LifecycleStage::SupplierAccepted,
        _ => LifecycleStage::Pending,
    }
}

/// Human-readable status line for an enquiry. Kept apart from the stepper
/// index so cancellation messaging never shifts the stage.
pub fn status_message(status: &EnquiryStatus, stage: LifecycleStage) -> String {
    if status.is_cancelled() {
        "This enquiry has been cancelled".to_string()
    } else {
        stage.to_string()
    }
}

/// Enum representing the possible statuses of an order.
///
/// Orders move forward along Procuring → Loaded → In Transit → Arrived →
/// Unloading → Completed; Cancelled is reachable from any non-terminal
/// status. The order lifecycle is independent of the enquiry it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum OrderStatus {
    Procuring,
    Loaded,
    #[serde(rename = "In Transit")]
    #[strum(serialize = "In Transit")]
    InTransit,
    Arrived,
    Unloading,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Position along the execution chain; used to refuse regressions.
    fn rank(self) -> u8 {
        match self {
            Self::Procuring => 0,
            Self::Loaded => 1,
            Self::InTransit => 2,
            Self::Arrived => 3,
            Self::Unloading => 4,
            Self::Completed => 5,
            Self::Cancelled => 6,
        }
    }

    /// Whether an order may move from `self` to `next`. Forward movement
    /// along the chain (single or multi step) is allowed; regressions and
    /// transitions out of a terminal status are not.
    pub fn can_transition(self, next: Self) -> bool {
        if self.is_terminal() || next == self {
            return false;
        }
        match next {
            Self::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::viewer::{Viewer, ViewerKind};

/// Tons to kilograms; quoted rates are per kilogram.
pub const KG_PER_TON: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// The role a viewer plays relative to one specific enquiry. The same
/// associate can be the buyer on one enquiry and the mediator on another,
/// so this is always derived per enquiry, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum EnquiryRole {
    Staff,
    Mediator,
    Buyer,
    Seller,
    Other,
}

/// The participant ids attached to an enquiry, used for role derivation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartyIds {
    pub buyer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub mediator_id: Option<Uuid>,
}

impl EnquiryRole {
    /// Classifies a viewer against an enquiry's parties.
    ///
    /// Staff (admins and employees) outrank everything. For associates the
    /// match order is mediator, then buyer, then seller, so an associate
    /// listed in more than one slot gets the first that applies.
    pub fn classify(viewer: &Viewer, parties: &PartyIds) -> Self {
        match viewer.kind {
            ViewerKind::Admin | ViewerKind::Employee => EnquiryRole::Staff,
            ViewerKind::Associate => {
                if parties.mediator_id == Some(viewer.id) {
                    EnquiryRole::Mediator
                } else if parties.buyer_id == Some(viewer.id) {
                    EnquiryRole::Buyer
                } else if parties.seller_id == Some(viewer.id) {
                    EnquiryRole::Seller
                } else {
                    EnquiryRole::Other
                }
            }
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, EnquiryRole::Staff)
    }
}

/// The commission makeup of an enquiry's quoted rate, all per kilogram.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RateFigures {
    pub base_rate: Decimal,
    pub admin_commission: Decimal,
    pub mediator_commission: Decimal,
}

impl RateFigures {
    /// The effective per-kg rate for a given viewer role.
    ///
    /// Sellers see the base rate alone; they are paid it and the
    /// commissions are not their business. Everyone else, staff included,
    /// sees the all-in price the buyer actually pays.
    pub fn net_rate(&self, role: EnquiryRole) -> Decimal {
        match role {
            EnquiryRole::Seller => self.base_rate,
            _ => self.base_rate + self.admin_commission + self.mediator_commission,
        }
    }

    /// Total trade value at the role's net rate for a quantity in tons.
    pub fn trade_volume(&self, quantity_tons: Decimal, role: EnquiryRole) -> Decimal {
        quantity_tons * KG_PER_TON * self.net_rate(role)
    }

    /// OBAOL's take on the full quantity. Only ever shown to staff.
    pub fn estimated_profit(&self, quantity_tons: Decimal) -> Decimal {
        quantity_tons * KG_PER_TON * self.admin_commission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn figures() -> RateFigures {
        RateFigures {
            base_rate: dec!(100),
            admin_commission: dec!(10),
            mediator_commission: dec!(5),
        }
    }

    fn viewer(kind: ViewerKind, id: Uuid) -> Viewer {
        Viewer { id, kind }
    }

    #[test]
    fn seller_sees_base_everyone_else_sees_all_in() {
        let f = figures();
        assert_eq!(f.net_rate(EnquiryRole::Seller), dec!(100));
        assert_eq!(f.net_rate(EnquiryRole::Buyer), dec!(115));
        assert_eq!(f.net_rate(EnquiryRole::Mediator), dec!(115));
        assert_eq!(f.net_rate(EnquiryRole::Staff), dec!(115));
        assert_eq!(f.net_rate(EnquiryRole::Other), dec!(115));
    }

    #[test]
    fn trade_volume_scales_by_kilograms() {
        let f = figures();
        assert_eq!(f.trade_volume(dec!(2), EnquiryRole::Buyer), dec!(230000));
        assert_eq!(f.trade_volume(dec!(2), EnquiryRole::Seller), dec!(200000));
    }

    #[test]
    fn estimated_profit_uses_admin_commission_only() {
        assert_eq!(figures().estimated_profit(dec!(2)), dec!(20000));
    }

    #[test]
    fn staff_classification_ignores_party_slots() {
        let id = Uuid::new_v4();
        let parties = PartyIds {
            buyer_id: Some(id),
            ..Default::default()
        };
        let role = EnquiryRole::classify(&viewer(ViewerKind::Admin, id), &parties);
        assert_eq!(role, EnquiryRole::Staff);
    }

    #[test]
    fn associate_match_order_is_mediator_buyer_seller() {
        let id = Uuid::new_v4();
        let v = viewer(ViewerKind::Associate, id);

        let all_three = PartyIds {
            buyer_id: Some(id),
            seller_id: Some(id),
            mediator_id: Some(id),
        };
        assert_eq!(EnquiryRole::classify(&v, &all_three), EnquiryRole::Mediator);

        let buyer_and_seller = PartyIds {
            buyer_id: Some(id),
            seller_id: Some(id),
            mediator_id: Some(Uuid::new_v4()),
        };
        assert_eq!(
            EnquiryRole::classify(&v, &buyer_and_seller),
            EnquiryRole::Buyer
        );

        let unrelated = PartyIds::default();
        assert_eq!(EnquiryRole::classify(&v, &unrelated), EnquiryRole::Other);
    }
}

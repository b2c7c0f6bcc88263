use obaol_api::models::{
    derive_stage, sanitize_owner, EnquiryRole, EnquiryStatus, LifecycleStage, RateFigures,
    ResponsibilityPlan,
};
use proptest::prelude::*;
use rust_decimal_macros::dec;

fn arb_status() -> impl Strategy<Value = EnquiryStatus> {
    prop_oneof![
        Just(EnquiryStatus::Pending),
        Just(EnquiryStatus::Converted),
        Just(EnquiryStatus::Completed),
        Just(EnquiryStatus::Closed),
        Just(EnquiryStatus::Cancelled),
        "[a-zA-Z ]{0,16}"
            .prop_filter("reserved status name", |s| {
                !matches!(
                    s.as_str(),
                    "Pending" | "Converted" | "Completed" | "Closed" | "Cancelled"
                )
            })
            .prop_map(EnquiryStatus::Other),
    ]
}

fn arb_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("buyer".to_string()),
        Just("seller".to_string()),
        Just("obaol".to_string()),
        Just(String::new()),
        "[a-zA-Z]{1,10}",
    ]
}

fn arb_plan() -> impl Strategy<Value = ResponsibilityPlan> {
    (
        arb_token(),
        arb_token(),
        arb_token(),
        arb_token(),
        arb_token(),
        arb_token(),
    )
        .prop_map(|(a, b, c, d, e, f)| ResponsibilityPlan {
            procurement_by: a,
            certificate_by: b,
            transport_by: c,
            shipping_by: d,
            packaging_by: e,
            quality_testing_by: f,
        })
}

proptest! {
    /// Every status/flag combination resolves to exactly one stage; the
    /// function is total over arbitrary stored strings.
    #[test]
    fn stage_derivation_is_total(status in arb_status(), accepted: bool, confirmed: bool, complete: bool) {
        let stage = derive_stage(&status, accepted, confirmed, complete);
        prop_assert!(stage.index() <= LifecycleStage::Completed.index());
    }

    /// Setting more flags never moves the stepper backward, status held
    /// constant.
    #[test]
    fn stage_is_monotone_in_flags(status in arb_status(), accepted: bool, confirmed: bool, complete: bool) {
        let base = derive_stage(&status, accepted, confirmed, complete);
        let more_accepted = derive_stage(&status, true, confirmed, complete);
        let more_confirmed = derive_stage(&status, accepted, true, complete);
        prop_assert!(more_accepted >= base);
        prop_assert!(more_confirmed >= base);
    }

    /// Sanitizing twice is the same as sanitizing once.
    #[test]
    fn owner_sanitization_is_idempotent(raw in "\\PC{0,12}") {
        let once = sanitize_owner(&raw);
        let twice = sanitize_owner(&once.to_string());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn plan_sanitization_is_idempotent(plan in arb_plan()) {
        let once = plan.sanitized();
        prop_assert_eq!(once.clone(), once.sanitized());
    }

    /// A plan is complete iff all six fields hold a recognized token.
    #[test]
    fn completeness_requires_all_six_duties(plan in arb_plan()) {
        let expected = plan
            .fields()
            .iter()
            .all(|(_, v)| matches!(*v, "buyer" | "seller" | "obaol"));
        prop_assert_eq!(plan.is_complete(), expected);
    }

    /// changed_fields agrees with plain equality and is empty on self.
    #[test]
    fn changed_fields_matches_equality(a in arb_plan(), b in arb_plan()) {
        prop_assert!(a.changed_fields(&a).is_empty());
        prop_assert_eq!(a.changed_fields(&b).is_empty(), a == b);
        prop_assert_eq!(a.differs_from(&b), a != b);
    }

    /// Terminal stays terminal under reparsing the rendered status.
    #[test]
    fn status_parse_roundtrips(status in arb_status()) {
        let rendered = status.to_string();
        let reparsed = EnquiryStatus::parse(&rendered);
        prop_assert_eq!(reparsed.is_terminal(), status.is_terminal());
    }
}

#[test]
fn conversion_gate_is_the_and_of_its_three_predicates() {
    use chrono::Utc;
    use obaol_api::entities::enquiry;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    let enquiry_with = |accepted: bool, confirmed: bool, complete: bool| {
        let duty = if complete { "obaol" } else { "" }.to_string();
        enquiry::Model {
            id: Uuid::new_v4(),
            code: "ENQ-2026-0001".to_string(),
            product_name: "Basmati Rice".to_string(),
            variant_name: None,
            variant_rate_id: None,
            quantity_tons: Decimal::ONE,
            rate: Decimal::ONE,
            admin_commission: Decimal::ZERO,
            mediator_commission: Decimal::ZERO,
            buyer_id: None,
            buyer_name: None,
            buyer_company: None,
            buyer_phone: None,
            seller_id: None,
            seller_name: None,
            seller_company: None,
            seller_phone: None,
            mediator_id: None,
            mediator_name: None,
            mediator_company: None,
            mediator_phone: None,
            assigned_employee_id: None,
            assigned_employee_name: None,
            status: "Pending".to_string(),
            specifications: None,
            seller_accepted_at: accepted.then(Utc::now),
            buyer_confirmed_at: confirmed.then(Utc::now),
            supplier_commit_until: None,
            procurement_by: duty.clone(),
            certificate_by: duty.clone(),
            transport_by: duty.clone(),
            shipping_by: duty.clone(),
            packaging_by: duty.clone(),
            quality_testing_by: duty,
            order_id: None,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        }
    };

    for accepted in [false, true] {
        for confirmed in [false, true] {
            for complete in [false, true] {
                let enquiry = enquiry_with(accepted, confirmed, complete);
                assert_eq!(
                    enquiry.can_convert(),
                    accepted && confirmed && complete,
                    "gate mismatch at accepted={} confirmed={} complete={}",
                    accepted,
                    confirmed,
                    complete
                );
            }
        }
    }
}

#[test]
fn seller_sees_base_rate_others_see_all_in() {
    let figures = RateFigures {
        base_rate: dec!(100),
        admin_commission: dec!(10),
        mediator_commission: dec!(5),
    };

    assert_eq!(figures.net_rate(EnquiryRole::Seller), dec!(100));
    for role in [
        EnquiryRole::Staff,
        EnquiryRole::Mediator,
        EnquiryRole::Buyer,
        EnquiryRole::Other,
    ] {
        assert_eq!(figures.net_rate(role), dec!(115));
    }

    // Volumes are per kilogram: tons x 1000 x rate.
    assert_eq!(figures.trade_volume(dec!(2), EnquiryRole::Buyer), dec!(230000));
    assert_eq!(figures.trade_volume(dec!(2), EnquiryRole::Seller), dec!(200000));
    assert_eq!(figures.estimated_profit(dec!(2)), dec!(20000));
}

#[test]
fn cancelled_message_overrides_the_stage_label() {
    use obaol_api::models::lifecycle::status_message;

    let stage = derive_stage(&EnquiryStatus::Cancelled, true, true, false);
    assert_eq!(
        status_message(&EnquiryStatus::Cancelled, stage),
        "This enquiry has been cancelled"
    );
    assert_eq!(
        status_message(&EnquiryStatus::Pending, LifecycleStage::BuyerConfirmed),
        "Buyer Confirmed"
    );
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// The party responsible for an execution duty. OBAOL, the platform
/// operator, is the safe default for anything unrecognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Buyer,
    Seller,
    Obaol,
}

/// Sanitizes a stored or submitted owner token.
///
/// Matching is exact and case sensitive: anything outside
/// {"buyer", "seller", "obaol"} (wrong case, empty, legacy garbage)
/// sanitizes to [`Owner::Obaol`]. Idempotent by construction, and applied
/// both when reading a previously saved plan and before writing one.
pub fn sanitize_owner(raw: &str) -> Owner {
    match raw {
        "buyer" => Owner::Buyer,
        "seller" => Owner::Seller,
        _ => Owner::Obaol,
    }
}

/// Whether a raw token is one of the three recognized owner values.
pub fn is_recognized(raw: &str) -> bool {
    matches!(raw, "buyer" | "seller" | "obaol")
}

/// The six-duty responsibility assignment attached to an enquiry.
///
/// Raw tokens are kept as saved; the empty string means "never explicitly
/// set", which is what completeness really tests. Field names follow the
/// wire shape of the enquiry API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsibilityPlan {
    pub procurement_by: String,
    pub certificate_by: String,
    pub transport_by: String,
    pub shipping_by: String,
    pub packaging_by: String,
    pub quality_testing_by: String,
}

impl ResponsibilityPlan {
    /// Wire-name/value pairs, in canonical duty order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("procurementBy", self.procurement_by.as_str()),
            ("certificateBy", self.certificate_by.as_str()),
            ("transportBy", self.transport_by.as_str()),
            ("shippingBy", self.shipping_by.as_str()),
            ("packagingBy", self.packaging_by.as_str()),
            ("qualityTestingBy", self.quality_testing_by.as_str()),
        ]
    }

    /// A plan is complete iff every duty carries a recognized owner token.
    /// Unset (empty) fields make the plan incomplete; conversion is gated
    /// on this.
    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|(_, v)| is_recognized(v))
    }

    /// Sanitizes every explicitly set field, leaving unset fields unset.
    pub fn sanitized(&self) -> Self {
        let fix = |raw: &str| {
            if raw.is_empty() {
                String::new()
            } else {
                sanitize_owner(raw).to_string()
            }
        };
        Self {
            procurement_by: fix(&self.procurement_by),
            certificate_by: fix(&self.certificate_by),
            transport_by: fix(&self.transport_by),
            shipping_by: fix(&self.shipping_by),
            packaging_by: fix(&self.packaging_by),
            quality_testing_by: fix(&self.quality_testing_by),
        }
    }

    /// The owner of each duty for an order copy: unset duties default to
    /// OBAOL.
    pub fn owners(&self) -> [Owner; 6] {
        let mut out = [Owner::Obaol; 6];
        for (slot, (_, raw)) in out.iter_mut().zip(self.fields()) {
            *slot = sanitize_owner(raw);
        }
        out
    }

    /// Names of the duties whose value differs from `other`, in canonical
    /// order. Save is only allowed when this is non-empty.
    pub fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .zip(other.fields())
            .filter(|((_, a), (_, b))| a != b)
            .map(|((name, _), _)| *name)
            .collect()
    }

    pub fn differs_from(&self, other: &Self) -> bool {
        self != other
    }

    /// Compact serialization used in history notes, e.g.
    /// `procurementBy=buyer, certificateBy=-, ...` (unset shown as `-`).
    pub fn summary(&self) -> String {
        self.fields()
            .iter()
            .map(|(name, v)| {
                if v.is_empty() {
                    format!("{}=-", name)
                } else {
                    format!("{}={}", name, v)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_plan() -> ResponsibilityPlan {
        ResponsibilityPlan {
            procurement_by: "buyer".into(),
            certificate_by: "seller".into(),
            transport_by: "obaol".into(),
            shipping_by: "obaol".into(),
            packaging_by: "seller".into(),
            quality_testing_by: "buyer".into(),
        }
    }

    #[test]
    fn sanitize_is_case_sensitive_and_defaults_to_obaol() {
        assert_eq!(sanitize_owner("buyer"), Owner::Buyer);
        assert_eq!(sanitize_owner("seller"), Owner::Seller);
        assert_eq!(sanitize_owner("obaol"), Owner::Obaol);
        assert_eq!(sanitize_owner("Buyer"), Owner::Obaol);
        assert_eq!(sanitize_owner("SELLER"), Owner::Obaol);
        assert_eq!(sanitize_owner(""), Owner::Obaol);
        assert_eq!(sanitize_owner("warehouse"), Owner::Obaol);
    }

    #[test]
    fn completeness_requires_every_field_set() {
        assert!(full_plan().is_complete());
        assert!(!ResponsibilityPlan::default().is_complete());

        let mut one_missing = full_plan();
        one_missing.packaging_by.clear();
        assert!(!one_missing.is_complete());

        let mut unsanitized = full_plan();
        unsanitized.transport_by = "Obaol".into();
        // Wrong case means the raw token is unrecognized until sanitized.
        assert!(!unsanitized.is_complete());
        assert!(unsanitized.sanitized().is_complete());
    }

    #[test]
    fn sanitized_leaves_unset_fields_unset() {
        let mut plan = ResponsibilityPlan::default();
        plan.procurement_by = "Buyer".into();
        let clean = plan.sanitized();
        assert_eq!(clean.procurement_by, "obaol");
        assert_eq!(clean.certificate_by, "");
        assert!(!clean.is_complete());
    }

    #[test]
    fn order_copy_defaults_unset_duties_to_obaol() {
        let mut plan = ResponsibilityPlan::default();
        plan.shipping_by = "seller".into();
        let owners = plan.owners();
        assert_eq!(owners[3], Owner::Seller);
        assert!(owners
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .all(|(_, o)| *o == Owner::Obaol));
    }

    #[test]
    fn change_detection_is_field_by_field() {
        let saved = full_plan();
        let mut draft = saved.clone();
        assert!(!draft.differs_from(&saved));
        assert!(draft.changed_fields(&saved).is_empty());

        draft.transport_by = "buyer".into();
        assert!(draft.differs_from(&saved));
        assert_eq!(draft.changed_fields(&saved), vec!["transportBy"]);

        draft.transport_by = "obaol".into();
        assert!(!draft.differs_from(&saved));
    }

    #[test]
    fn summary_marks_unset_fields() {
        let mut plan = ResponsibilityPlan::default();
        plan.procurement_by = "buyer".into();
        let summary = plan.summary();
        assert!(summary.starts_with("procurementBy=buyer"));
        assert!(summary.contains("certificateBy=-"));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let json = serde_json::to_value(full_plan()).unwrap();
        assert_eq!(json["procurementBy"], "buyer");
        assert_eq!(json["qualityTestingBy"], "buyer");
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Contact details for an associate as embedded in enquiry payloads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateDetails {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A reference to an associate on the wire. Clients send either a bare id
/// or a populated object; identity comparisons must treat both the same.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AssociateRef {
    Id(Uuid),
    Object(AssociateDetails),
}

impl AssociateRef {
    /// The canonical id behind either representation.
    pub fn resolve_id(&self) -> Uuid {
        match self {
            AssociateRef::Id(id) => *id,
            AssociateRef::Object(details) => details.id,
        }
    }

    pub fn details(&self) -> Option<&AssociateDetails> {
        match self {
            AssociateRef::Id(_) => None,
            AssociateRef::Object(details) => Some(details),
        }
    }
}

impl From<Uuid> for AssociateRef {
    fn from(id: Uuid) -> Self {
        AssociateRef::Id(id)
    }
}

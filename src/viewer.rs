use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderMap, request::Parts},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

pub const VIEWER_ID_HEADER: &str = "x-viewer-id";
pub const VIEWER_ROLE_HEADER: &str = "x-viewer-role";

/// The account class of the caller, as established by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ViewerKind {
    Admin,
    Employee,
    Associate,
}

/// The authenticated identity a request is served as. Every read of an
/// enquiry is projected through this; there is no viewerless path.
#[derive(Clone, Copy, Debug)]
pub struct Viewer {
    pub id: Uuid,
    pub kind: ViewerKind,
}

impl Viewer {
    pub fn is_staff(&self) -> bool {
        matches!(self.kind, ViewerKind::Admin | ViewerKind::Employee)
    }

    /// Parses the identity headers the auth gateway injects upstream.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ServiceError> {
        let id = headers
            .get(VIEWER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::AuthError("missing viewer id header".to_string()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| ServiceError::AuthError("malformed viewer id".to_string()))?;

        let kind = headers
            .get(VIEWER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::AuthError("missing viewer role header".to_string()))?;
        let kind = kind
            .parse::<ViewerKind>()
            .map_err(|_| ServiceError::AuthError(format!("unknown viewer role '{}'", kind)))?;

        Ok(Viewer { id, kind })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Viewer::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn headers(id: &str, role: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(VIEWER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        map.insert(VIEWER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        map
    }

    #[test]
    fn parses_well_formed_headers() {
        let id = Uuid::new_v4();
        let viewer = Viewer::from_headers(&headers(&id.to_string(), "associate")).unwrap();
        assert_eq!(viewer.id, id);
        assert_eq!(viewer.kind, ViewerKind::Associate);
        assert!(!viewer.is_staff());
    }

    #[test]
    fn rejects_missing_or_malformed_identity() {
        let err = Viewer::from_headers(&HeaderMap::new());
        assert_matches!(err, Err(ServiceError::AuthError(_)));

        let err = Viewer::from_headers(&headers("not-a-uuid", "admin"));
        assert_matches!(err, Err(ServiceError::AuthError(_)));

        let id = Uuid::new_v4().to_string();
        let err = Viewer::from_headers(&headers(&id, "superuser"));
        assert_matches!(err, Err(ServiceError::AuthError(_)));
    }

    #[test]
    fn staff_covers_admin_and_employee() {
        let id = Uuid::new_v4().to_string();
        assert!(Viewer::from_headers(&headers(&id, "admin")).unwrap().is_staff());
        assert!(Viewer::from_headers(&headers(&id, "employee")).unwrap().is_staff());
    }
}

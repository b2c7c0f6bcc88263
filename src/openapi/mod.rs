use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OBAOL API",
        version = "1.0.0",
        description = r#"
# OBAOL Commodity Trade API

Backend for the OBAOL agro-commodity marketplace: buyers raise enquiries
against supplier rates, both sides work through acceptance, confirmation
and a responsibility plan, and staff convert a ready enquiry into an
order that is then tracked through its execution stages.

## Viewer headers

Every endpoint expects the caller's identity in two headers:

```
x-viewer-id: <uuid>
x-viewer-role: admin | employee | associate
```

Associates only see enquiries and orders where they are the buyer, the
seller or the mediator. Rate and commission figures in responses are
projected for the viewer's role on each enquiry.

## Error handling

Errors use a consistent JSON envelope with appropriate status codes:

```json
{
  "error": "Not Found",
  "message": "Enquiry not found",
  "timestamp": "2026-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20,
capped by server configuration).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Enquiries", description = "Enquiry lifecycle endpoints"),
        (name = "Orders", description = "Order tracking endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Enquiries
        crate::handlers::enquiries::create_enquiry,
        crate::handlers::enquiries::list_enquiries,
        crate::handlers::enquiries::get_enquiry,
        crate::handlers::enquiries::update_enquiry,
        crate::handlers::enquiries::seller_accept,
        crate::handlers::enquiries::buyer_confirm,
        crate::handlers::enquiries::assign_employee,
        crate::handlers::enquiries::set_supplier_commit,
        crate::handlers::enquiries::convert_to_order,
        crate::handlers::enquiries::get_history,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::list_logistics,
        crate::handlers::orders::add_logistics,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Enquiry types
            crate::handlers::enquiries::EnquiryView,
            crate::handlers::enquiries::EnquiryEventView,
            crate::handlers::enquiries::AssociateView,
            crate::handlers::enquiries::AssignEmployeeRequest,
            crate::handlers::enquiries::SupplierCommitRequest,
            crate::services::enquiries::CreateEnquiryRequest,
            crate::services::enquiries::UpdateEnquiryRequest,
            crate::models::LifecycleStage,
            crate::models::ResponsibilityPlan,
            crate::models::Owner,
            crate::models::EnquiryRole,
            crate::models::AssociateDetails,
            crate::models::AssociateRef,

            // Order types
            crate::handlers::orders::OrderView,
            crate::handlers::orders::LogisticsView,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::LogisticsRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_openapi_document() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("OBAOL API"));
        assert!(json.contains("/api/v1/web/enquiry"));
        assert!(json.contains("/api/v1/web/orders"));
    }
}

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn request(
    method: &str,
    uri: &str,
    viewer: Option<(Uuid, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = viewer {
        builder = builder
            .header("x-viewer-id", id.to_string())
            .header("x-viewer-role", role);
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_viewer_headers_are_unauthorized() {
    let app = TestApp::new().await;
    let router = app.router();

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/web/enquiry", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = Uuid::new_v4();
    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/web/enquiry",
            Some((admin, "superuser")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn enquiry_rates_are_projected_per_viewer() {
    let app = TestApp::new().await;
    let router = app.router();
    let admin = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let seller = Uuid::new_v4();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/web/enquiry",
            Some((admin, "admin")),
            Some(json!({
                "productName": "Basmati Rice",
                "quantityTons": "2",
                "rate": "100",
                "adminCommission": "10",
                "mediatorCommission": "5",
                "buyer": buyer.to_string(),
                "seller": seller.to_string(),
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    let enquiry_id = body["data"]["id"].as_str().unwrap().to_string();

    // Staff see the all-in rate and the profit estimate.
    let staff_view = &body["data"];
    assert_eq!(staff_view["viewerRole"], json!("Staff"));
    assert_eq!(staff_view["netRate"], json!("115"));
    assert_eq!(staff_view["tradeVolume"], json!("230000"));
    assert_eq!(staff_view["estimatedProfit"], json!("20000"));
    assert_eq!(staff_view["stageIndex"], json!(0));

    // The seller sees the base rate and no profit figure.
    let response = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/enquiry/{}", enquiry_id),
            Some((seller, "associate")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let seller_view = &body["data"];
    assert_eq!(seller_view["viewerRole"], json!("Seller"));
    assert_eq!(seller_view["netRate"], json!("100"));
    assert_eq!(seller_view["tradeVolume"], json!("200000"));
    assert!(seller_view.get("estimatedProfit").is_none());

    // The buyer pays all-in but still gets no profit figure.
    let response = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/enquiry/{}", enquiry_id),
            Some((buyer, "associate")),
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["viewerRole"], json!("Buyer"));
    assert_eq!(body["data"]["netRate"], json!("115"));
    assert!(body["data"].get("estimatedProfit").is_none());

    // An unrelated associate gets a 404, not a 403.
    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/enquiry/{}", enquiry_id),
            Some((Uuid::new_v4(), "associate")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lifecycle_endpoints_drive_the_stepper() {
    let app = TestApp::new().await;
    let router = app.router();
    let admin = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let seller = Uuid::new_v4();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/web/enquiry",
            Some((admin, "admin")),
            Some(json!({
                "productName": "Turmeric Fingers",
                "quantityTons": "1",
                "rate": "80",
                "buyer": buyer.to_string(),
                "seller": seller.to_string(),
            })),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/web/enquiry/{}/seller-accept", id),
            Some((seller, "associate")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["stage"], json!("Supplier Accepted"));
    assert_eq!(body["data"]["stageIndex"], json!(1));

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/web/enquiry/{}/buyer-confirm", id),
            Some((buyer, "associate")),
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["stageIndex"], json!(2));

    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/web/enquiry/{}", id),
            Some((admin, "employee")),
            Some(json!({
                "responsibilities": {
                    "procurementBy": "seller",
                    "certificateBy": "obaol",
                    "transportBy": "buyer",
                    "shippingBy": "obaol",
                    "packagingBy": "seller",
                    "qualityTestingBy": "obaol"
                }
            })),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["stage"], json!("Responsibilities Finalized"));
    assert_eq!(body["data"]["responsibilitiesComplete"], json!(true));
    assert_eq!(body["data"]["canConvert"], json!(true));

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/web/enquiry/{}/convert", id),
            Some((admin, "admin")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], json!("Procuring"));

    // History shows the whole journey.
    let response = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/enquiry/{}/history", id),
            Some((admin, "admin")),
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec![
            "created",
            "seller_accepted",
            "buyer_confirmed",
            "responsibilities_saved",
            "converted"
        ]
    );

    // The order is visible to its parties through the orders API.
    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/orders/{}", order_id),
            Some((buyer, "associate")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn error_envelope_carries_status_and_message() {
    let app = TestApp::new().await;
    let router = app.router();

    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/v1/web/enquiry/{}", Uuid::new_v4()),
            Some((Uuid::new_v4(), "admin")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], json!("Not Found"));
    assert_eq!(body["message"], json!("Not found: Enquiry not found"));
}

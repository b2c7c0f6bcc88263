use std::sync::Arc;

use axum::Router;
use obaol_api::{
    api_v1_routes,
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    handlers::AppServices,
    migrator::Migrator,
    models::ResponsibilityPlan,
    services::enquiries::CreateEnquiryRequest,
    viewer::{Viewer, ViewerKind},
    AppState,
};
use rust_decimal_macros::dec;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Test harness backed by a fresh on-disk SQLite database per test.
/// In-memory SQLite gives each pooled connection its own database, so a
/// temp file is used instead.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = tmp.path().join("obaol_test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = Database::connect(&url)
            .await
            .expect("failed to connect to test database");
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");

        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), None);

        Self {
            db,
            services,
            _tmp: tmp,
        }
    }

    /// The v1 API mounted the way main() mounts it, for oneshot requests.
    pub fn router(&self) -> Router {
        let (event_tx, _event_rx) = mpsc::channel(8);
        let state = AppState {
            db: self.db.clone(),
            config: test_config(),
            event_sender: EventSender::new(event_tx),
            services: self.services.clone(),
        };
        Router::new()
            .nest("/api/v1/web", api_v1_routes())
            .with_state(state)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: true,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        event_channel_capacity: 8,
        api_default_page_size: 20,
        api_max_page_size: 100,
    }
}

pub fn admin() -> Viewer {
    Viewer {
        id: Uuid::new_v4(),
        kind: ViewerKind::Admin,
    }
}

pub fn employee() -> Viewer {
    Viewer {
        id: Uuid::new_v4(),
        kind: ViewerKind::Employee,
    }
}

pub fn associate(id: Uuid) -> Viewer {
    Viewer {
        id,
        kind: ViewerKind::Associate,
    }
}

/// A well-formed creation request naming the given buyer and seller.
pub fn basmati_request(buyer_id: Uuid, seller_id: Uuid) -> CreateEnquiryRequest {
    CreateEnquiryRequest {
        product_name: "Basmati Rice".to_string(),
        variant_name: Some("1121 Sella".to_string()),
        variant_rate_id: None,
        quantity_tons: dec!(2),
        rate: dec!(100),
        admin_commission: dec!(10),
        mediator_commission: dec!(5),
        buyer: Some(buyer_id.into()),
        seller: Some(seller_id.into()),
        mediator: None,
        specifications: Some("Moisture below 12%".to_string()),
    }
}

/// A plan with every duty assigned to a recognized owner.
pub fn complete_plan() -> ResponsibilityPlan {
    ResponsibilityPlan {
        procurement_by: "seller".to_string(),
        certificate_by: "obaol".to_string(),
        transport_by: "buyer".to_string(),
        shipping_by: "obaol".to_string(),
        packaging_by: "seller".to_string(),
        quality_testing_by: "obaol".to_string(),
    }
}

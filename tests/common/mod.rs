use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use freightbill_api::{
    app,
    auth::add_membership,
    config::AppConfig,
    db,
    entities::{company, quote, quote_item, service, user, waybill},
    events::{self, EventSender},
    AppState,
};

/// Test harness: the full router backed by a throwaway SQLite database, with
/// documents written under a temp directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: tempfile::TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("freightbill_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.document_dir = dir.path().join("documents").display().to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = app(state.clone());

        Self {
            router,
            state,
            _dir: dir,
            _event_task: event_task,
        }
    }

    /// Bearer token for the given user.
    pub fn token_for(&self, user: &user::Model) -> String {
        self.state
            .auth_service
            .generate_token(user)
            .expect("token generation")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize request body"))
        } else {
            Body::empty()
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router call")
    }

    pub async fn seed_user(&self, name: &str, email: &str, user_type: user::UserType) -> user::Model {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            phone: Set(Some("555-0100".to_string())),
            user_type: Set(user_type),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user")
    }

    pub async fn seed_company(&self, name: &str, is_primary: bool) -> company::Model {
        company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            address_line_1: Set(Some("1 Dock Rd".to_string())),
            address_line_2: Set(None),
            address_line_3: Set(Some("Milwaukee, WI".to_string())),
            phone: Set(Some("555-0199".to_string())),
            is_primary: Set(is_primary),
            sales_rep_id: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed company")
    }

    pub async fn join_company(&self, company: &company::Model, user: &user::Model) {
        add_membership(&self.state.db, company.id, user.id)
            .await
            .expect("seed membership");
    }

    pub async fn seed_service(
        &self,
        name: &str,
        service_type: service::ServiceType,
        active: bool,
    ) -> service::Model {
        service::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            active: Set(active),
            service_type: Set(service_type),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed service")
    }

    pub async fn seed_waybill(
        &self,
        company: &company::Model,
        user: &user::Model,
        waybill_number: i64,
    ) -> waybill::Model {
        waybill::ActiveModel {
            id: Set(Uuid::new_v4()),
            waybill_number: Set(waybill_number),
            user_id: Set(user.id),
            company_id: Set(company.id),
            sales_rep_id: Set(None),
            shipper_company: Set(Some(company.name.clone())),
            shipper_contact: Set(Some(user.name.clone())),
            shipper_address_line_1: Set(company.address_line_1.clone()),
            shipper_address_line_2: Set(None),
            shipper_address_line_3: Set(company.address_line_3.clone()),
            shipper_phone: Set(company.phone.clone()),
            consignee_company: Set(Some("360 Distribution".to_string())),
            consignee_contact: Set(Some("Jamie Czajka".to_string())),
            consignee_address_line_1: Set(Some("6201 Ace Industrial Drive".to_string())),
            consignee_address_line_2: Set(None),
            consignee_address_line_3: Set(Some("Cudahy, WI 53110".to_string())),
            consignee_phone: Set(Some("866-360-7582".to_string())),
            ship_date: Set(None),
            quote_number: Set(None),
            job_reference_number: Set(None),
            notes: Set(None),
            notify_discrepancies: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed waybill")
    }

    pub async fn seed_quote(&self, company: &company::Model, job: &str) -> quote::Model {
        quote::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company.id),
            job_reference_number: Set(Some(job.to_string())),
            notes: Set(Some("dock 4".to_string())),
            waybill_id: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed quote")
    }

    pub async fn seed_quote_item(
        &self,
        quote: &quote::Model,
        service: &service::Model,
        piece_count: i32,
        pounds: Decimal,
    ) -> quote_item::Model {
        quote_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(quote.id),
            service_id: Set(service.id),
            piece_count: Set(piece_count),
            pounds: Set(pounds),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed quote item")
    }
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body json")
}

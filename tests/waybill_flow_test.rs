mod common;

use axum::http::{Method, StatusCode};
use chrono::TimeZone;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde_json::json;

use common::{body_json, TestApp};
use freightbill_api::entities::{service, user};

fn preview_body(company_id: uuid::Uuid, service_id: uuid::Uuid) -> serde_json::Value {
    json!({
        "company_id": company_id,
        "shipper_company": "Acme Freight",
        "shipper_contact": "Dana",
        "shipper_address_line_1": "1 Dock Rd",
        "shipper_address_line_3": "Milwaukee, WI",
        "shipper_phone": "555-0100",
        "consignee_company": "360 Distribution",
        "consignee_contact": "Jamie Czajka",
        "consignee_address_line_1": "6201 Ace Industrial Drive",
        "consignee_address_line_3": "Cudahy, WI 53110",
        "consignee_phone": "866-360-7582",
        "ship_date": "2026-03-14",
        "services": [
            {"service_id": service_id, "pieces": 3, "pounds": 50}
        ]
    })
}

#[tokio::test]
async fn preview_then_commit_assigns_sequential_numbers() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let svc = app
        .seed_service("Canadian Ground", service::ServiceType::Canadian, true)
        .await;
    let token = app.token_for(&shipper);

    // existing history: highest committed number is 1042
    app.seed_waybill(&company, &shipper, 1042).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/preview",
            Some(preview_body(company.id, svc.id)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["international_service_exists"], json!(false));
    assert_eq!(
        preview["draft"]["pending_services"][svc.id.to_string()]["pieces"],
        json!(3)
    );

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/commit",
            Some(json!({"notify_discrepancies": true})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let committed = body_json(response).await;
    assert_eq!(committed["waybill_number"], json!(1043));
    assert_eq!(committed["document_path"], json!("waybill-1043.txt"));

    // the draft is consumed; a second commit has nothing to work with
    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/commit",
            Some(json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // the committed waybill is visible with its service lines
    let id = committed["waybill_id"].as_str().expect("waybill id");
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/waybills/{}", id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["waybill_number"], json!(1043));
    assert_eq!(fetched["notify_discrepancies"], json!(true));
    assert_eq!(fetched["services"][0]["service_name"], json!("Canadian Ground"));
    assert_eq!(fetched["services"][0]["pieces"], json!(3));
}

#[tokio::test]
async fn international_lines_flag_the_preview() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let svc = app
        .seed_service("Overseas Air", service::ServiceType::International, true)
        .await;
    let token = app.token_for(&shipper);

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/preview",
            Some(preview_body(company.id, svc.id)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["international_service_exists"], json!(true));
}

#[tokio::test]
async fn preview_requires_membership() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let own = app.seed_company("Acme Freight", true).await;
    app.join_company(&own, &shipper).await;
    let other = app.seed_company("Rival Freight", false).await;
    let svc = app
        .seed_service("Canadian Ground", service::ServiceType::Canadian, true)
        .await;
    let token = app.token_for(&shipper);

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/preview",
            Some(preview_body(other.id, svc.id)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn negative_pieces_are_a_field_error() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let svc = app
        .seed_service("Canadian Ground", service::ServiceType::Canadian, true)
        .await;
    let token = app.token_for(&shipper);

    let mut body = preview_body(company.id, svc.id);
    body["services"][0]["pieces"] = json!(-1);

    let response = app
        .request(Method::POST, "/api/v1/waybills/preview", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn new_form_clears_the_draft_unless_resuming() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let svc = app
        .seed_service("Canadian Ground", service::ServiceType::Canadian, true)
        .await;
    let token = app.token_for(&shipper);

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/preview",
            Some(preview_body(company.id, svc.id)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // returning from the preview keeps the draft
    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills/new?resume=true",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let context = body_json(response).await;
    assert!(!context["draft"].is_null());

    // a fresh visit starts over
    let response = app
        .request(Method::GET, "/api/v1/waybills/new", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let context = body_json(response).await;
    assert!(context["draft"].is_null());
    assert_eq!(context["company"]["id"], json!(company.id));
    assert_eq!(context["services"]["canadian"][0]["name"], json!("Canadian Ground"));
}

#[tokio::test]
async fn discarding_the_draft_blocks_commit() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let svc = app
        .seed_service("Canadian Ground", service::ServiceType::Canadian, true)
        .await;
    let token = app.token_for(&shipper);

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/preview",
            Some(preview_body(company.id, svc.id)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::DELETE, "/api/v1/waybills/draft", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::POST,
            "/api/v1/waybills/commit",
            Some(json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn shipping_clerks_are_locked_out() {
    let app = TestApp::new().await;
    let clerk = app
        .seed_user("Robin", "robin@example.com", user::UserType::ShippingClerk)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &clerk).await;
    let token = app.token_for(&clerk);

    let response = app
        .request(Method::GET, "/api/v1/waybills/new", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/waybills", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_is_scoped_and_searchable() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;

    let outsider = app
        .seed_user("Pat", "pat@example.com", user::UserType::User)
        .await;
    let other = app.seed_company("Rival Freight", true).await;
    app.join_company(&other, &outsider).await;

    app.seed_waybill(&company, &shipper, 100).await;
    app.seed_waybill(&company, &shipper, 101).await;
    app.seed_waybill(&other, &outsider, 102).await;

    let token = app.token_for(&shipper);
    let response = app
        .request(Method::GET, "/api/v1/waybills", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(2));

    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills?waybill_number=101",
            None,
            Some(&token),
        )
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(1));
    assert_eq!(listing["items"][0]["waybill_number"], json!(101));
    assert_eq!(listing["search_miss"], json!(false));

    // searching another company's number is a flagged miss
    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills?waybill_number=102",
            None,
            Some(&token),
        )
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(0));
    assert_eq!(listing["search_miss"], json!(true));
}

#[tokio::test]
async fn listing_windows_by_date() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let token = app.token_for(&shipper);

    app.seed_waybill(&company, &shipper, 200).await;
    let old = app.seed_waybill(&company, &shipper, 201).await;

    // push one waybill well past the default window
    let mut archived = old.into_active_model();
    archived.created_at = Set(chrono::Utc
        .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
        .unwrap());
    archived
        .update(&*app.state.db)
        .await
        .expect("age the waybill");

    // the default listing only shows the recent waybill
    let response = app
        .request(Method::GET, "/api/v1/waybills", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(1));
    assert_eq!(listing["items"][0]["waybill_number"], json!(200));

    // the archive year brings the old one back
    let response = app
        .request(Method::GET, "/api/v1/waybills?year=2024", None, Some(&token))
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(1));
    assert_eq!(listing["items"][0]["waybill_number"], json!(201));

    // month narrows within the year
    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills?year=2024&month=3",
            None,
            Some(&token),
        )
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(1));

    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills?year=2024&month=4",
            None,
            Some(&token),
        )
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(0));

    // an exact-number search ignores the window
    let response = app
        .request(
            Method::GET,
            "/api/v1/waybills?waybill_number=201",
            None,
            Some(&token),
        )
        .await;
    let listing = body_json(response).await;
    assert_eq!(listing["total"], json!(1));
    assert_eq!(listing["search_miss"], json!(false));
}

#[tokio::test]
async fn other_companies_waybills_are_forbidden() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;

    let outsider = app
        .seed_user("Pat", "pat@example.com", user::UserType::User)
        .await;
    let other = app.seed_company("Rival Freight", true).await;
    app.join_company(&other, &outsider).await;
    let foreign = app.seed_waybill(&other, &outsider, 500).await;

    let token = app.token_for(&shipper);
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/waybills/{}", foreign.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/waybills", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

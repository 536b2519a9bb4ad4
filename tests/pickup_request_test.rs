mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp};
use freightbill_api::entities::user;

fn pickup_body(waybill_number: i64) -> serde_json::Value {
    json!({
        "waybill_number": waybill_number,
        "pickup_contact": "Dana",
        "pickup_phone": "555-0100",
        "pickup_email": "dana@example.com",
        "pickup_date": "2026-03-14",
        "pickup_company": "Acme Freight",
        "pickup_address_line_1": "1 Dock Rd",
        "pickup_address_line_3": "Milwaukee, WI",
        "pickup_ready_time": "08:00",
        "pickup_close_time": "17:00"
    })
}

#[tokio::test]
async fn pickup_with_skids_is_recorded() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    app.seed_waybill(&company, &shipper, 1043).await;
    let token = app.token_for(&shipper);

    let mut body = pickup_body(1043);
    body["skids"] = json!([
        {"length": 48, "width": 40, "height": 60, "weight": 500},
        {},
        {"length": 48, "width": 40, "height": 48, "weight": 350}
    ]);

    let response = app
        .request(Method::POST, "/api/v1/pickup-requests", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome = body_json(response).await;

    // the untouched middle group is skipped; slots keep form positions
    let skids = outcome["skids"].as_array().expect("skids");
    assert_eq!(skids.len(), 2);
    assert_eq!(skids[0]["skid_number"], json!(1));
    assert_eq!(skids[1]["skid_number"], json!(3));
    assert_eq!(outcome["pickup_request"]["pickup_contact"], json!("Dana"));
}

#[tokio::test]
async fn unknown_waybill_number_is_a_field_error() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    let token = app.token_for(&shipper);

    let response = app
        .request(
            Method::POST,
            "/api/v1/pickup-requests",
            Some(pickup_body(9999)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert_eq!(
        error["field_errors"]["waybill_number"][0],
        json!("Invalid waybill number")
    );
}

#[tokio::test]
async fn another_companys_waybill_number_reads_as_invalid() {
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
    app.seed_waybill(&other, &outsider, 777).await;

    let token = app.token_for(&shipper);
    let response = app
        .request(
            Method::POST,
            "/api/v1/pickup-requests",
            Some(pickup_body(777)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["field_errors"]["waybill_number"].is_array());
}

#[tokio::test]
async fn partial_skid_groups_are_rejected_with_slot_keys() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    app.seed_waybill(&company, &shipper, 1043).await;
    let token = app.token_for(&shipper);

    let mut body = pickup_body(1043);
    body["skids"] = json!([
        {"length": 48, "width": 40, "height": 60, "weight": 500},
        {"length": 48, "weight": 350}
    ]);

    let response = app
        .request(Method::POST, "/api/v1/pickup-requests", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["field_errors"]["skid_width_2"].is_array());
    assert!(error["field_errors"]["skid_height_2"].is_array());
    assert!(error["field_errors"].get("skid_length_1").is_none());
}

#[tokio::test]
async fn missing_required_fields_are_reported() {
    let app = TestApp::new().await;
    let shipper = app
        .seed_user("Dana", "dana@example.com", user::UserType::User)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &shipper).await;
    app.seed_waybill(&company, &shipper, 1043).await;
    let token = app.token_for(&shipper);

    let mut body = pickup_body(1043);
    body["pickup_contact"] = json!(null);
    body["pickup_email"] = json!("not-an-email");

    let response = app
        .request(Method::POST, "/api/v1/pickup-requests", Some(body), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["field_errors"]["pickup_contact"].is_array());
    assert!(error["field_errors"]["pickup_email"].is_array());
}

#[tokio::test]
async fn shipping_clerks_cannot_schedule_pickups() {
    let app = TestApp::new().await;
    let clerk = app
        .seed_user("Robin", "robin@example.com", user::UserType::ShippingClerk)
        .await;
    let company = app.seed_company("Acme Freight", true).await;
    app.join_company(&company, &clerk).await;
    app.seed_waybill(&company, &clerk, 1043).await;
    let token = app.token_for(&clerk);

    let response = app
        .request(
            Method::POST,
            "/api/v1/pickup-requests",
            Some(pickup_body(1043)),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

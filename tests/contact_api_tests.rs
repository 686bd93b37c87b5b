
use chrono::TimeDelta;
use contact_gate::clock::Clock;
use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

#[actix_rt::test]
async fn valid_submission_is_relayed_and_returns_200() {
    let app = TestApp::spawn().await;

    let response = app.post_contact(&app.valid_form()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], "receipt-1");
    assert_eq!(body["message"], "Email sent successfully");

    let sent = app.mailer.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Portfolio] Project inquiry");
    assert_eq!(sent[0].to, OWNER_EMAIL);
    assert_eq!(sent[0].reply_to, "jane@example.com");
}

#[actix_rt::test]
async fn fourth_submission_in_window_is_rate_limited_until_window_elapses() {
    let app = TestApp::spawn().await;

    for _ in 0..3 {
        let response = app.post_contact(&app.valid_form()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    app.clock.advance(TimeDelta::minutes(30));
    let response = app.post_contact(&app.valid_form()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "1800");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "rate-limited");
    assert!(body["error"].as_str().unwrap().contains("30 minutes"));
    assert_eq!(app.mailer.sent_count(), 3);

    app.clock.advance(TimeDelta::minutes(30) + TimeDelta::seconds(1));
    let response = app.post_contact(&app.valid_form()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.sent_count(), 4);
}

#[actix_rt::test]
async fn clients_behind_different_addresses_have_separate_quotas() {
    let app = TestApp::spawn().await;

    for _ in 0..3 {
        let response = app.post_contact_from("203.0.113.7", &app.valid_form()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let blocked = app.post_contact_from("203.0.113.7, 10.0.0.1", &app.valid_form()).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.post_contact_from("198.51.100.20", &app.valid_form()).await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn honeypot_submission_is_rejected_without_sending() {
    let app = TestApp::spawn().await;
    let mut form = app.valid_form();
    form["honeypot"] = "x".into();

    let response = app.post_contact(&form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "bot-honeypot");
    assert_eq!(app.mailer.sent_count(), 0);
}

#[actix_rt::test]
async fn form_submitted_too_quickly_is_rejected() {
    let app = TestApp::spawn().await;
    let form = valid_form_at(app.clock.now() - TimeDelta::milliseconds(2999));

    let response = app.post_contact(&form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "too-fast");
}

#[actix_rt::test]
async fn missing_fields_are_reported_as_validation_failure() {
    let app = TestApp::spawn().await;
    let form = serde_json::json!({ "name": "Jane", "email": "jane@example.com" });

    let response = app.post_contact(&form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "missing-fields");
    assert_eq!(body["error"], "All fields are required");
}

#[actix_rt::test]
async fn null_fields_count_against_quota_and_report_missing_fields() {
    let app = TestApp::spawn().await;
    let form = serde_json::json!({
        "name": null,
        "email": "jane@example.com",
        "subject": "Hi",
        "message": "one two three"
    });

    for _ in 0..3 {
        let response = app.post_contact(&form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "missing-fields");
    }

    let response = app.post_contact(&form).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.mailer.sent_count(), 0);

    let health: Value = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["tracked_clients"], 1);
}

#[actix_rt::test]
async fn non_post_methods_return_405() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.contact_url()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "method-not-allowed");
}

#[actix_rt::test]
async fn delivery_rejection_returns_generic_500() {
    let app = TestApp::spawn().await;
    app.mailer.set_mode(MailerMode::Reject);

    let response = app.post_contact(&app.valid_form()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await.unwrap();
    assert!(!text.contains("re_secret_detail"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["code"], "delivery-failed");
    assert_eq!(body["error"], "Error while sending the email");
}

#[actix_rt::test]
async fn unreachable_delivery_service_returns_internal_error() {
    let app = TestApp::spawn().await;
    app.mailer.set_mode(MailerMode::Unreachable);

    let response = app.post_contact(&app.valid_form()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "internal-error");
    assert!(!body["error"].as_str().unwrap().contains("resend"));
}

#[actix_rt::test]
async fn malformed_json_returns_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.contact_url())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn cors_preflight_allows_post_with_content_type() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, app.contact_url())
        .header("origin", "https://portfolio.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[actix_rt::test]
async fn health_reports_tracked_clients() {
    let app = TestApp::spawn().await;
    app.post_contact(&app.valid_form()).await;

    let body: Value = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tracked_clients"], 1);
}

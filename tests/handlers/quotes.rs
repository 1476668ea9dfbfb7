use reqwest::multipart::Form;

use crate::common::{TestApp, bearer, jpeg_part, quote_form};

async fn submit_quote(app: &TestApp, email: &str, with_photo: bool) -> serde_json::Value {
    let mut form = quote_form(email, r#"["Esthétique","Mode"]"#);
    if with_photo {
        form = form.part("photo", jpeg_part());
    }

    let response = app
        .client
        .post(app.url("/api/quotes"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["quote"].clone()
}

#[tokio::test]
async fn test_submit_quote_records_pending_request() {
    let app = TestApp::spawn("test_submit_quote_records_pending").await;
    let email = app.email("quote");

    let quote = submit_quote(&app, &email, true).await;
    assert_eq!(quote["status"], "pending");
    assert_eq!(quote["services"], serde_json::json!(["Esthétique", "Mode"]));
    assert_eq!(quote["photos"].as_array().unwrap().len(), 1);
    assert_eq!(quote["budget"], "1500-3000");

    let uploads = app.media.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1, "bambou/quotes");

    let sent = app.wait_for_emails(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, email);
}

#[tokio::test]
async fn test_quote_with_repeated_service_fields() {
    let app = TestApp::spawn("test_quote_with_repeated_services").await;

    let form = quote_form(&app.email("rep"), "Dentaire").text("services", "Cheveux");
    let response = app
        .client
        .post(app.url("/api/quotes"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["quote"]["services"], serde_json::json!(["Dentaire", "Cheveux"]));
    assert!(body["quote"]["photos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_quote_with_two_photos_is_rejected() {
    let app = TestApp::spawn("test_quote_with_two_photos").await;

    let form = quote_form(&app.email("twophotos"), "Mode")
        .part("photo", jpeg_part())
        .part("photo", jpeg_part());
    let response = app
        .client
        .post(app.url("/api/quotes"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["photo"].is_string());
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_quote_with_overlong_phone_is_rejected() {
    let app = TestApp::spawn("test_quote_overlong_phone").await;

    let form = Form::new()
        .text("firstName", "Awa")
        .text("lastName", "Koné")
        .text("country", "Sénégal")
        .text("services", "Mode")
        .text("budget", "1500-3000")
        .text("phone", "1".repeat(60))
        .text("email", app.email("longphone"));
    let response = app
        .client
        .post(app.url("/api/quotes"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["phone"].is_string());
}

#[tokio::test]
async fn test_unknown_service_is_rejected() {
    let app = TestApp::spawn("test_unknown_service_is_rejected").await;

    let response = app
        .client
        .post(app.url("/api/quotes"))
        .multipart(quote_form(&app.email("bad"), r#"["Massage"]"#))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["services"].is_string());
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_admin_lists_and_updates_quote_status() {
    let app = TestApp::spawn("test_admin_lists_and_updates_quote").await;
    let token = app.admin_token().await;
    let quote = submit_quote(&app, &app.email("status"), false).await;
    let id = quote["id"].as_str().unwrap();

    let response = app
        .client
        .patch(app.url(&format!("/api/quotes/{}/status", id)))
        .header("Authorization", bearer(&token))
        .json(&serde_json::json!({ "status": "contacted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["quote"]["status"], "contacted");

    let response = app
        .client
        .get(app.url(&format!("/api/quotes?status=contacted&search={}", app.tag)))
        .header("Authorization", bearer(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["quotes"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 1);

    let response = app
        .client
        .patch(app.url(&format!("/api/quotes/{}/status", id)))
        .header("Authorization", bearer(&token))
        .json(&serde_json::json!({ "status": "closed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_quote_listing_requires_admin() {
    let app = TestApp::spawn("test_quote_listing_requires_admin").await;

    let response = app.client.get(app.url("/api/quotes")).send().await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_delete_quote_releases_photos() {
    let app = TestApp::spawn("test_delete_quote_releases_photos").await;
    let token = app.admin_token().await;
    let quote = submit_quote(&app, &app.email("del"), true).await;
    let id = quote["id"].as_str().unwrap();
    let storage_id = quote["photos"][0]["storageId"].as_str().unwrap().to_string();

    let response = app
        .client
        .delete(app.url(&format!("/api/quotes/{}", id)))
        .header("Authorization", bearer(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(app.media.deletes(), vec![storage_id]);

    let response = app
        .client
        .get(app.url(&format!("/api/quotes/{}", id)))
        .header("Authorization", bearer(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

use reqwest::multipart::{Form, Part};

use crate::common::{TestApp, bearer, jpeg_part};

#[tokio::test]
async fn test_upload_and_delete_image() {
    let app = TestApp::spawn("test_upload_and_delete_image").await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/upload"))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().part("file", jpeg_part()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let public_id = body["data"]["publicId"].as_str().unwrap().to_string();
    assert!(public_id.starts_with("bambou/uploads/"));
    assert!(body["data"]["url"].as_str().is_some());
    assert_eq!(body["data"]["width"], 1200);

    let response = app
        .client
        .delete(app.url("/api/upload"))
        .header("Authorization", bearer(&token))
        .json(&serde_json::json!({ "publicId": public_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // The provider no longer knows the asset.
    let response = app
        .client
        .delete(app.url("/api/upload"))
        .header("Authorization", bearer(&token))
        .json(&serde_json::json!({ "public_id": public_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = TestApp::spawn("test_upload_rejects_non_image").await;
    let token = app.admin_token().await;

    let pdf = Part::bytes(b"%PDF-1.4".to_vec())
        .file_name("doc.pdf")
        .mime_str("application/pdf")
        .unwrap();

    let response = app
        .client
        .post(app.url("/api/upload"))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().part("file", pdf))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = TestApp::spawn("test_upload_without_file").await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/upload"))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().text("note", "nothing here"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["fields"]["file"].is_string());
}

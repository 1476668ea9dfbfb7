use reqwest::multipart::Form;

use crate::common::{TestApp, bearer, create_partner, jpeg_part};

#[tokio::test]
async fn test_create_partner_with_defaults() {
    let app = TestApp::spawn("test_create_partner_with_defaults").await;
    let token = app.admin_token().await;
    let name = format!("{} Clinique", app.tag);

    let form = Form::new()
        .text("name", name.clone())
        .text("specialty", "Dentaire")
        .text("instagram", "@clinique");

    let response = app
        .client
        .post(app.url("/api/partners"))
        .header("Authorization", bearer(&token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let partner = &body["partner"];
    assert_eq!(partner["name"], name.as_str());
    assert_eq!(partner["isActive"], true);
    assert_eq!(partner["rating"], 5);
    assert_eq!(partner["socialMedia"]["instagram"], "@clinique");
    assert!(partner["photoUrl"].is_null());
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_create_partner_requires_admin() {
    let app = TestApp::spawn("test_create_partner_requires_admin").await;

    let response = app
        .client
        .post(app.url("/api/partners"))
        .multipart(Form::new().text("name", format!("{} X", app.tag)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_partner_phone_longer_than_fifty_characters_is_rejected() {
    let app = TestApp::spawn("test_partner_overlong_phone").await;
    let token = app.admin_token().await;

    let form = Form::new()
        .text("name", format!("{} Clinique", app.tag))
        .text("specialty", "Dermatologie")
        .text("phone", "1".repeat(60));
    let response = app
        .client
        .post(app.url("/api/partners"))
        .header("Authorization", bearer(&token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["phone"].is_string());

    let partner = create_partner(&app, &token, &format!("{} Salon", app.tag), false).await;
    let id = partner["id"].as_str().unwrap();
    let response = app
        .client
        .put(app.url(&format!("/api/partners/{}", id)))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().text("phone", "2".repeat(60)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_create_partner_rejects_out_of_range_rating() {
    let app = TestApp::spawn("test_create_partner_rejects_rating").await;
    let token = app.admin_token().await;

    let form = Form::new()
        .text("name", format!("{} Salon", app.tag))
        .text("specialty", "Cheveux")
        .text("rating", "7");

    let response = app
        .client
        .post(app.url("/api/partners"))
        .header("Authorization", bearer(&token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["fields"]["rating"].is_string());
}

#[tokio::test]
async fn test_public_listing_and_detail() {
    let app = TestApp::spawn("test_public_listing_and_detail").await;
    let token = app.admin_token().await;
    let partner = create_partner(&app, &token, &format!("{} Studio", app.tag), true).await;
    create_partner(&app, &token, &format!("{} Atelier", app.tag), false).await;

    let response = app
        .client
        .get(app.url(&format!("/api/partners?search={}", app.tag)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["pagination"]["total"], 2);

    let id = partner["id"].as_str().unwrap();
    let response = app
        .client
        .get(app.url(&format!("/api/partners/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["partner"]["services"], serde_json::json!(["Peeling", "Soins du visage"]));
    assert!(body["partner"]["photoUrl"].as_str().is_some());

    let response = app
        .client
        .get(app.url("/api/partners/00000000-0000-0000-0000-000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_listing_filters_inactive_partners() {
    let app = TestApp::spawn("test_listing_filters_inactive").await;
    let token = app.admin_token().await;
    let partner = create_partner(&app, &token, &format!("{} Spa", app.tag), false).await;
    create_partner(&app, &token, &format!("{} Institut", app.tag), false).await;

    let id = partner["id"].as_str().unwrap();
    let response = app
        .client
        .put(app.url(&format!("/api/partners/{}", id)))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().text("isActive", "false"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url(&format!("/api/partners?active=true&search={}", app.tag)))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    let partners = body["partners"].as_array().unwrap();
    assert_eq!(partners.len(), 1);
    assert_ne!(partners[0]["id"], id);
}

#[tokio::test]
async fn test_update_changes_only_sent_fields() {
    let app = TestApp::spawn("test_update_changes_only_sent").await;
    let token = app.admin_token().await;
    let partner = create_partner(&app, &token, &format!("{} Beauté", app.tag), false).await;
    let id = partner["id"].as_str().unwrap();

    let form = Form::new().text("phone", "+225 07 00 00 00").text("rating", "3");
    let response = app
        .client
        .put(app.url(&format!("/api/partners/{}", id)))
        .header("Authorization", bearer(&token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let updated = &body["partner"];
    assert_eq!(updated["phone"], "+225 07 00 00 00");
    assert_eq!(updated["rating"], 3);
    assert_eq!(updated["name"], partner["name"]);
    assert_eq!(updated["specialty"], partner["specialty"]);
    assert_eq!(updated["services"], partner["services"]);
}

#[tokio::test]
async fn test_replacing_photo_releases_previous_one() {
    let app = TestApp::spawn("test_replacing_photo_releases").await;
    let token = app.admin_token().await;
    let partner = create_partner(&app, &token, &format!("{} Mode", app.tag), true).await;
    let id = partner["id"].as_str().unwrap();
    let old_storage_id = partner["storageId"].as_str().unwrap().to_string();

    let response = app
        .client
        .put(app.url(&format!("/api/partners/{}", id)))
        .header("Authorization", bearer(&token))
        .multipart(Form::new().part("photo", jpeg_part()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let new_storage_id = body["partner"]["storageId"].as_str().unwrap();
    assert_ne!(new_storage_id, old_storage_id);
    assert_eq!(app.media.uploads().len(), 2);
    assert_eq!(app.media.deletes(), vec![old_storage_id]);
}

#[tokio::test]
async fn test_delete_partner_releases_photo() {
    let app = TestApp::spawn("test_delete_partner_releases").await;
    let token = app.admin_token().await;
    let partner = create_partner(&app, &token, &format!("{} Ongles", app.tag), true).await;
    let id = partner["id"].as_str().unwrap();

    let response = app
        .client
        .delete(app.url(&format!("/api/partners/{}", id)))
        .header("Authorization", bearer(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(app.media.deletes(), vec![partner["storageId"].as_str().unwrap().to_string()]);

    let response = app
        .client
        .get(app.url(&format!("/api/partners/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

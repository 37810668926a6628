//! API integration tests
//!
//! These run against a live server with an administrator `admin`/`admin`.

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8000";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    login(client, "admin", "admin").await
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/token", BASE_URL))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"].as_str().expect("No token in response").to_string()
}

/// Create a non-admin account with a unique name; returns its id and token
async fn create_nurse(client: &Client, admin_token: &str) -> (i64, String) {
    let username = format!("soignant-{}", Uuid::new_v4().simple());
    let response = client
        .post(format!("{}/users/", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({ "username": username, "password": "secret", "is_admin": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_i64().expect("No id in response");

    (id, login(client, &username, "secret").await)
}

async fn current_user_id(client: &Client, token: &str) -> i64 {
    let response = client
        .get(format!("{}/users/me/", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn create_localisation(client: &Client, token: &str, resident: &str) -> Value {
    let response = client
        .post(format!("{}/localisations/", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "nom_etablissement": "Les Tilleuls",
            "secteur": "Aile B",
            "numero_chambre": "12",
            "nom_complet_resident": resident
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

async fn list(client: &Client, token: &str, path: &str) -> Vec<Value> {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

async fn create_materiel(client: &Client, token: &str, reference: &str) -> Value {
    let response = client
        .post(format!("{}/materiels/", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "reference_interne": reference,
            "material_type_id": null,
            "localisation_id": null,
            "date_livraison": "2024-05-02"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .form(&[("username", "admin"), ("password", "admin")])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .form(&[("username", "admin"), ("password", "wrong")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/users/me/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/materiels/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_filter_and_delete_materiel() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let created = create_materiel(&client, &token, "IT-LIT-0001").await;
    let id = created["id"].as_i64().expect("No id in response");
    assert!(created["material_type"].is_null());
    assert!(created["localisation"].is_null());

    // Same-day range includes the whole delivery day
    let response = client
        .get(format!("{}/materiels/", BASE_URL))
        .bearer_auth(&token)
        .query(&[
            ("search_query", "IT-LIT-0001"),
            ("start_date", "2024-05-02"),
            ("end_date", "2024-05-02"),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let rows: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(rows.iter().any(|m| m["id"].as_i64() == Some(id)));

    // Empty form values are ignored
    let response = client
        .get(format!("{}/materiels/?search_query=&material_type_id=", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/materiels/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let rows = list(&client, &token, "/materiels/?search_query=IT-LIT-0001").await;
    assert!(rows.iter().all(|m| m["id"].as_i64() != Some(id)));

    let response = client
        .delete(format!("{}/materiels/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_cart_submit_creates_batch() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let materiel = create_materiel(&client, &token, "IT-FAU-0002").await;
    let materiel_id = materiel["id"].as_i64().expect("No id in response");

    for request_type in ["LIVRAISON", "DEPANNAGE"] {
        let response = client
            .post(format!("{}/cart/items", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({
                "materiel_id": materiel_id,
                "request_type": request_type,
                "description": "integration"
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .post(format!("{}/cart/submit", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["requests_created"], 2);
    let batch_id = body["batch_id"].as_str().expect("No batch id").to_string();

    let response = client
        .get(format!("{}/cart/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let cart: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

    // A second submit on the now-empty cart is rejected
    let response = client
        .post(format!("{}/cart/submit", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/requests/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let requests: Vec<Value> = response.json().await.expect("Failed to parse response");
    let batch: Vec<&Value> = requests.iter().filter(|r| r["batch_id"] == batch_id).collect();
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|r| r["status"] == "EN ATTENTE"));

    let request_id = batch[0]["id"].as_i64().expect("No id in response");
    let response = client
        .put(format!("{}/requests/{}", BASE_URL, request_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "TERMINEE" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["status"], "TERMINEE");

    // Deleting the equipment keeps its requests
    let response = client
        .delete(format!("{}/materiels/{}", BASE_URL, materiel_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let request: Value = response.json().await.expect("Failed to parse response");
    assert!(request["materiel_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_non_admin_sees_only_own_records() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let (nurse_id, nurse) = create_nurse(&client, &admin).await;

    let theirs = create_materiel(&client, &admin, "IT-ADM-0003").await;
    let mine = create_materiel(&client, &nurse, "IT-SOI-0003").await;
    assert_eq!(mine["owner_id"].as_i64(), Some(nurse_id));
    let their_place = create_localisation(&client, &admin, "Mme Admin").await;
    let my_place = create_localisation(&client, &nurse, "M. Soignant").await;

    let materiels = list(&client, &nurse, "/materiels/").await;
    assert!(materiels.iter().all(|m| m["owner_id"].as_i64() == Some(nurse_id)));
    assert!(materiels.iter().any(|m| m["id"] == mine["id"]));
    assert!(materiels.iter().all(|m| m["id"] != theirs["id"]));

    let places = list(&client, &nurse, "/localisations/").await;
    assert!(places.iter().all(|l| l["owner_id"].as_i64() == Some(nurse_id)));
    assert!(places.iter().any(|l| l["id"] == my_place["id"]));
    assert!(places.iter().all(|l| l["id"] != their_place["id"]));

    let all = list(&client, &admin, "/materiels/").await;
    assert!(all.iter().any(|m| m["id"] == mine["id"]));
    assert!(all.iter().any(|m| m["id"] == theirs["id"]));
}

#[tokio::test]
#[ignore]
async fn test_cart_rejects_equipment_of_another_user() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let (_, nurse) = create_nurse(&client, &admin).await;
    let theirs = create_materiel(&client, &admin, "IT-ADM-0004").await;

    let response = client
        .post(format!("{}/cart/items", BASE_URL))
        .bearer_auth(&nurse)
        .json(&json!({ "materiel_id": theirs["id"], "request_type": "REPRISE" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_direct_request_is_filed_for_the_owner() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let (nurse_id, _) = create_nurse(&client, &admin).await;

    let response = client
        .post(format!("{}/materiels/", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "reference_interne": "IT-SOI-0005", "owner_id": nurse_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let materiel: Value = response.json().await.expect("Failed to parse response");
    let draft = json!({ "materiel_id": materiel["id"], "request_type": "DEPANNAGE" });

    let response = client
        .post(format!("{}/requests/direct", BASE_URL))
        .bearer_auth(&admin)
        .json(&draft)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let request: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(request["user_id"].as_i64(), Some(nurse_id));

    // Deleting the owner detaches the equipment
    let response = client
        .delete(format!("{}/users/{}", BASE_URL, nurse_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .post(format!("{}/requests/direct", BASE_URL))
        .bearer_auth(&admin)
        .json(&draft)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_delete_own_account() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let admin_id = current_user_id(&client, &admin).await;

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, admin_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_category_names_are_unique_and_required() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let name = format!("Leve-personne {}", Uuid::new_v4().simple());

    let create = |name: String| {
        let client = client.clone();
        let admin = admin.clone();
        async move {
            client
                .post(format!("{}/material_types/", BASE_URL))
                .bearer_auth(&admin)
                .json(&json!({ "name": name }))
                .send()
                .await
                .expect("Failed to send request")
                .status()
        }
    };

    assert_eq!(create(name.clone()).await, 201);
    assert_eq!(create(format!("  {}  ", name.to_uppercase())).await, 409);
    assert_eq!(create("   ".to_string()).await, 400);
}

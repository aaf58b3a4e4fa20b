use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stockmaster_auth::{JwtClaims, Role};
use stockmaster_core::{UserId, WarehouseId};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockmaster_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, role: Role, assigned_warehouse: Option<WarehouseId>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        role,
        assigned_warehouse,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_warehouse(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    code: &str,
) -> String {
    let res = client
        .post(format!("{}/warehouses", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": format!("Warehouse {code}"), "code": code, "location": "Test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    sku: &str,
) -> String {
    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": format!("Product {sku}"), "sku": sku, "category": "test", "unit": "pcs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_claims() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let assigned = WarehouseId::new();
    let token = mint_jwt(jwt_secret, Role::staff(), Some(assigned));

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"].as_str().unwrap(), "staff");
    assert_eq!(
        body["assigned_warehouse"].as_str().unwrap(),
        assigned.to_string()
    );
}

#[tokio::test]
async fn receipt_lifecycle_create_validate_query() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let manager = mint_jwt(jwt_secret, Role::manager(), None);
    let warehouse = create_warehouse(&client, &srv.base_url, &manager, "WH-1").await;
    let product = create_product(&client, &srv.base_url, &manager, "SKU-1").await;

    // Create a receipt: pending, no stock effect yet.
    let res = client
        .post(format!("{}/operations/receipts", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({
            "to_warehouse": warehouse,
            "lines": [{ "product": product, "qty": 100 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let receipt: serde_json::Value = res.json().await.unwrap();
    assert_eq!(receipt["status"].as_str().unwrap(), "pending");
    let receipt_id = receipt["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/stock/{}/{}", srv.base_url, product, warehouse))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stock["quantity"].as_i64().unwrap(), 0);

    // Validate: stock lands, one ledger entry.
    let res = client
        .post(format!("{}/operations/{}/validate", srv.base_url, receipt_id))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let validated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(validated["operation"]["status"].as_str().unwrap(), "done");
    assert_eq!(
        validated["movements"][0]["new_quantity"].as_i64().unwrap(),
        100
    );

    let res = client
        .get(format!("{}/stock/{}/{}", srv.base_url, product, warehouse))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stock["quantity"].as_i64().unwrap(), 100);

    let res = client
        .get(format!("{}/ledger?product={}", srv.base_url, product))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let ledger: serde_json::Value = res.json().await.unwrap();
    let items = ledger["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["qty"].as_i64().unwrap(), 100);
    assert_eq!(items[0]["reference"].as_str().unwrap(), receipt_id);

    // Second validation attempt conflicts.
    let res = client
        .post(format!("{}/operations/{}/validate", srv.base_url, receipt_id))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "already_validated");
}

#[tokio::test]
async fn over_delivery_clamps_and_reports_it() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let manager = mint_jwt(jwt_secret, Role::manager(), None);
    let warehouse = create_warehouse(&client, &srv.base_url, &manager, "WH-1").await;
    let product = create_product(&client, &srv.base_url, &manager, "SKU-1").await;

    for (path, body) in [
        (
            "receipts",
            json!({ "to_warehouse": warehouse, "lines": [{ "product": product, "qty": 100 }] }),
        ),
        (
            "deliveries",
            json!({ "from_warehouse": warehouse, "lines": [{ "product": product, "qty": 500 }] }),
        ),
    ] {
        let res = client
            .post(format!("{}/operations/{}", srv.base_url, path))
            .bearer_auth(&manager)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let op: serde_json::Value = res.json().await.unwrap();
        let id = op["id"].as_str().unwrap();

        let res = client
            .post(format!("{}/operations/{}/validate", srv.base_url, id))
            .bearer_auth(&manager)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        if path == "deliveries" {
            let validated: serde_json::Value = res.json().await.unwrap();
            assert!(validated["movements"][0]["clamped_to_zero"].as_bool().unwrap());
            assert_eq!(validated["movements"][0]["new_quantity"].as_i64().unwrap(), 0);
        }
    }

    // Snapshot floors at 0; the ledger keeps the requested -500.
    let res = client
        .get(format!("{}/stock/{}/{}", srv.base_url, product, warehouse))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stock["quantity"].as_i64().unwrap(), 0);

    let res = client
        .get(format!("{}/ledger?type=delivery", srv.base_url))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let ledger: serde_json::Value = res.json().await.unwrap();
    assert_eq!(ledger["items"][0]["qty"].as_i64().unwrap(), -500);
}

#[tokio::test]
async fn staff_cannot_validate_and_is_warehouse_scoped() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let manager = mint_jwt(jwt_secret, Role::manager(), None);
    let home = create_warehouse(&client, &srv.base_url, &manager, "WH-HOME").await;
    let other = create_warehouse(&client, &srv.base_url, &manager, "WH-OTHER").await;
    let product = create_product(&client, &srv.base_url, &manager, "SKU-1").await;

    let home_id: WarehouseId = home.parse().unwrap();
    let staff = mint_jwt(jwt_secret, Role::staff(), Some(home_id));

    // Staff can request a movement in their own warehouse...
    let res = client
        .post(format!("{}/operations/receipts", srv.base_url))
        .bearer_auth(&staff)
        .json(&json!({
            "to_warehouse": home,
            "lines": [{ "product": product, "qty": 10 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let receipt: serde_json::Value = res.json().await.unwrap();
    let receipt_id = receipt["id"].as_str().unwrap();

    // ...but not in another warehouse...
    let res = client
        .post(format!("{}/operations/receipts", srv.base_url))
        .bearer_auth(&staff)
        .json(&json!({
            "to_warehouse": other,
            "lines": [{ "product": product, "qty": 10 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // ...and cannot commit movements at all.
    let res = client
        .post(format!("{}/operations/{}/validate", srv.base_url, receipt_id))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The manager can.
    let res = client
        .post(format!("{}/operations/{}/validate", srv.base_url, receipt_id))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn transfer_and_adjustment_round_trip() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let manager = mint_jwt(jwt_secret, Role::manager(), None);
    let w1 = create_warehouse(&client, &srv.base_url, &manager, "WH-1").await;
    let w2 = create_warehouse(&client, &srv.base_url, &manager, "WH-2").await;
    let product = create_product(&client, &srv.base_url, &manager, "SKU-1").await;

    // Seed 100 in W1.
    let res = client
        .post(format!("{}/operations/receipts", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({ "to_warehouse": w1, "lines": [{ "product": product, "qty": 100 }] }))
        .send()
        .await
        .unwrap();
    let op: serde_json::Value = res.json().await.unwrap();
    client
        .post(format!(
            "{}/operations/{}/validate",
            srv.base_url,
            op["id"].as_str().unwrap()
        ))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();

    // Transfer 40 to W2.
    let res = client
        .post(format!("{}/operations/transfers", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({
            "from_warehouse": w1,
            "to_warehouse": w2,
            "lines": [{ "product": product, "qty": 40 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let transfer: serde_json::Value = res.json().await.unwrap();
    let transfer_id = transfer["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/operations/{}/validate", srv.base_url, transfer_id))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Per-warehouse stock mapping for the product.
    let res = client
        .get(format!("{}/stock/{}", srv.base_url, product))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    let warehouses = stock["warehouses"].as_array().unwrap();
    assert_eq!(warehouses.len(), 2);
    let quantity_of = |wh: &str| {
        warehouses
            .iter()
            .find(|l| l["warehouse"].as_str().unwrap() == wh)
            .unwrap()["quantity"]
            .as_i64()
            .unwrap()
    };
    assert_eq!(quantity_of(&w1), 60);
    assert_eq!(quantity_of(&w2), 40);

    // Exactly two transfer entries sharing the reference.
    let res = client
        .get(format!("{}/ledger?type=transfer", srv.base_url))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let ledger: serde_json::Value = res.json().await.unwrap();
    let items = ledger["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item["reference"].as_str().unwrap(), transfer_id);
    }

    // Adjust W2 down to 25: delta -15 is fixed at creation.
    let res = client
        .post(format!("{}/operations/adjustments", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({ "product": product, "warehouse": w2, "new_qty": 25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let adjustment: serde_json::Value = res.json().await.unwrap();
    assert_eq!(adjustment["lines"][0]["qty"].as_i64().unwrap(), -15);

    let res = client
        .post(format!(
            "{}/operations/{}/validate",
            srv.base_url,
            adjustment["id"].as_str().unwrap()
        ))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/stock/{}/{}", srv.base_url, product, w2))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stock["quantity"].as_i64().unwrap(), 25);
}

#[tokio::test]
async fn duplicate_sku_conflicts() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let manager = mint_jwt(jwt_secret, Role::manager(), None);
    create_product(&client, &srv.base_url, &manager, "SKU-1").await;

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({ "name": "Dup", "sku": "SKU-1", "category": "test", "unit": "pcs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

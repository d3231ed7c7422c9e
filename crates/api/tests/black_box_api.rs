use std::sync::Arc;

use chrono::Duration;
use invoify_api::app::{build_app, services::AppServices};
use invoify_auth::Hs256SessionTokens;
use invoify_infra::InMemoryStore;
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, cheap bcrypt, ephemeral port.
        let services = AppServices::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(Hs256SessionTokens::new(b"test-secret", Duration::hours(1))),
            4,
        );
        let app = build_app(Arc::new(services));
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn sign_up_and_in(client: &reqwest::Client, srv: &TestServer, email: &str) -> String {
    let res = client
        .post(srv.url("/api/auth/signup"))
        .json(&json!({ "name": "Ada", "email": email, "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url("/api/auth/signin"))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn post_json(client: &reqwest::Client, url: String, token: &str, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).bearer_auth(token).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap_or(Value::Null))
}

async fn get_json(client: &reqwest::Client, url: String, token: &str) -> (StatusCode, Value) {
    let res = client.get(url).bearer_auth(token).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap_or(Value::Null))
}

/// Creates a client and a sender company; returns their ids.
async fn seed_parties(client: &reqwest::Client, srv: &TestServer, token: &str) -> (String, String) {
    let (status, created) = post_json(
        client,
        srv.url("/api/clients"),
        token,
        json!({ "name": "Globex", "email": "billing@globex.test", "city": "Springfield" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = created["id"].as_str().unwrap().to_string();

    let (status, created) = post_json(
        client,
        srv.url("/api/companies"),
        token,
        json!({ "name": "Ada Consulting", "email": "ada@consulting.test" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sender_id = created["id"].as_str().unwrap().to_string();

    (client_id, sender_id)
}

fn invoice_body(number: &str, client_id: &str, sender_id: &str) -> Value {
    json!({
        "invoiceNumber": number,
        "title": "Website rebuild",
        "clientId": client_id,
        "senderId": sender_id,
        "issueDate": "2025-03-01",
        "taxRate": 10,
        "discount": 0,
        "items": [
            { "description": "Design", "quantity": 2, "unitPrice": 100 },
            { "description": "Hosting", "quantity": 1, "unitPrice": 20 }
        ]
    })
}

#[tokio::test]
async fn health_is_public_and_api_requires_auth() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for path in ["/api/whoami", "/api/clients", "/api/invoices", "/api/dashboard"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthorized");
    }

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_signin_and_session_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/auth/signup"))
        .json(&json!({ "name": "Ada", "email": "Ada@Example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let account: Value = res.json().await.unwrap();
    assert_eq!(account["email"], "ada@example.com");
    assert!(account.get("passwordHash").is_none());

    // Duplicate e-mail, short password.
    let res = client
        .post(srv.url("/api/auth/signup"))
        .json(&json!({ "email": "ada@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let res = client
        .post(srv.url("/api/auth/signup"))
        .json(&json!({ "email": "bob@example.com", "password": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/api/auth/signin"))
        .json(&json!({ "email": "ada@example.com", "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/api/auth/signin"))
        .json(&json!({ "email": "ADA@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("invoify_session="));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], account["id"]);
    assert!(body["expiresAt"].is_string());

    // The cookie alone authenticates.
    let session = cookie.split(';').next().unwrap().to_string();
    let res = client
        .get(srv.url("/api/whoami"))
        .header(header::COOKIE, session)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["userId"], account["id"]);
    assert_eq!(me["email"], "ada@example.com");

    let res = client.post(srv.url("/api/auth/signout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn clients_are_scoped_to_their_owner() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ada = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let bob = sign_up_and_in(&client, &srv, "bob@example.com").await;

    let (status, body) = post_json(&client, srv.url("/api/clients"), &ada, json!({ "name": "Globex" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and email are required");

    let (status, created) = post_json(
        &client,
        srv.url("/api/clients"),
        &ada,
        json!({ "name": " Globex ", "email": "billing@globex.test", "phone": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Globex");
    assert!(created["phone"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = get_json(&client, srv.url("/api/clients"), &ada).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = get_json(&client, srv.url("/api/clients"), &bob).await;
    assert!(listed.as_array().unwrap().is_empty());
    let (status, _) = get_json(&client, srv.url(&format!("/api/clients/{id}")), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let res = client
        .delete(srv.url(&format!("/api/clients/{id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(srv.url(&format!("/api/clients/{id}")))
        .bearer_auth(&ada)
        .json(&json!({ "name": "Globex Corp", "email": "ap@globex.test", "notes": "net 15" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Globex Corp");
    assert_eq!(updated["notes"], "net 15");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, _) = get_json(&client, srv.url("/api/clients/not-a-uuid"), &ada).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/api/clients/{id}")))
        .bearer_auth(&ada)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Client deleted successfully");
}

#[tokio::test]
async fn invoice_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let (client_id, sender_id) = seed_parties(&client, &srv, &token).await;

    let (status, body) = post_json(
        &client,
        srv.url("/api/invoices"),
        &token,
        json!({ "invoiceNumber": "INV-1", "clientId": client_id, "items": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invoice number, client, and items are required");

    let (status, created) = post_json(
        &client,
        srv.url("/api/invoices"),
        &token,
        invoice_body("INV-202503-001", &client_id, &sender_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["subtotal"].as_f64(), Some(220.0));
    assert_eq!(created["taxAmount"].as_f64(), Some(22.0));
    assert_eq!(created["total"].as_f64(), Some(242.0));
    assert_eq!(created["dueDate"], "2025-03-31");
    assert_eq!(created["client"]["name"], "Globex");
    assert_eq!(created["sender"]["name"], "Ada Consulting");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = get_json(&client, srv.url(&format!("/api/invoices/{id}")), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["items"].as_array().unwrap().len(), 2);

    // Status-only update.
    let res = client
        .put(srv.url(&format!("/api/invoices/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "status": "PAID" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let paid: Value = res.json().await.unwrap();
    assert_eq!(paid["status"], "PAID");
    assert_eq!(paid["items"].as_array().unwrap().len(), 2);

    let (_, listed) = get_json(&client, srv.url("/api/invoices?status=PAID"), &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = get_json(&client, srv.url("/api/invoices?status=DRAFT"), &token).await;
    assert!(listed.as_array().unwrap().is_empty());
    let (_, listed) = get_json(&client, srv.url("/api/invoices?search=globex"), &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (status, _) = get_json(&client, srv.url("/api/invoices?status=ARCHIVED"), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Full update replaces the items and resets the status.
    let mut full = invoice_body("INV-202503-001", &client_id, &sender_id);
    full["items"] = json!([{ "description": "Retainer", "quantity": 1, "unitPrice": 500 }]);
    full["taxRate"] = json!(0);
    let res = client
        .put(srv.url(&format!("/api/invoices/{id}")))
        .bearer_auth(&token)
        .json(&full)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let replaced: Value = res.json().await.unwrap();
    assert_eq!(replaced["status"], "DRAFT");
    assert_eq!(replaced["items"].as_array().unwrap().len(), 1);
    assert_eq!(replaced["total"].as_f64(), Some(500.0));
    assert_eq!(replaced["id"], created["id"]);

    // Referenced parties cannot be removed.
    let res = client
        .delete(srv.url(&format!("/api/clients/{client_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(srv.url(&format!("/api/invoices/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let (status, _) = get_json(&client, srv.url(&format!("/api/invoices/{id}")), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invoices_cannot_reference_someone_elses_parties() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ada = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let bob = sign_up_and_in(&client, &srv, "bob@example.com").await;
    let (client_id, sender_id) = seed_parties(&client, &srv, &ada).await;

    let (status, body) = post_json(
        &client,
        srv.url("/api/invoices"),
        &bob,
        invoice_body("INV-1", &client_id, &sender_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Client not found");

    let (status, created) = post_json(
        &client,
        srv.url("/api/invoices"),
        &ada,
        invoice_body("INV-1", &client_id, &sender_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, _) = get_json(&client, srv.url(&format!("/api/invoices/{id}")), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&client, srv.url(&format!("/api/invoices/{id}/pdf")), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invoice_pdf_is_an_attachment() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let (client_id, sender_id) = seed_parties(&client, &srv, &token).await;
    let (_, created) = post_json(
        &client,
        srv.url("/api/invoices"),
        &token,
        invoice_body("INV-202503-007", &client_id, &sender_id),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let res = client
        .get(srv.url(&format!("/api/invoices/{id}/pdf")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert_eq!(disposition, "attachment; filename=\"Invoice-INV-202503-007.pdf\"");
    let bytes = res.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn next_number_has_the_expected_shape() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = sign_up_and_in(&client, &srv, "ada@example.com").await;

    let (status, body) = get_json(&client, srv.url("/api/invoices/next-number"), &token).await;
    assert_eq!(status, StatusCode::OK);
    let number = body["invoiceNumber"].as_str().unwrap();
    let parts: Vec<&str> = number.split('-').collect();
    assert_eq!(parts.len(), 3, "{number}");
    assert_eq!(parts[0], "INV");
    assert_eq!(parts[1].len(), 6);
    assert_eq!(parts[2].len(), 3);
}

#[tokio::test]
async fn analytics_and_dashboard_summarise_owned_invoices() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let (client_id, sender_id) = seed_parties(&client, &srv, &token).await;

    let today = chrono::Utc::now().date_naive().to_string();
    for (number, status) in [("INV-1", "PAID"), ("INV-2", "SENT"), ("INV-3", "OVERDUE")] {
        let mut body = invoice_body(number, &client_id, &sender_id);
        body["issueDate"] = json!(today);
        body["status"] = json!(status);
        let (code, _) = post_json(&client, srv.url("/api/invoices"), &token, body).await;
        assert_eq!(code, StatusCode::CREATED);
    }
    // Outside every bounded range.
    let mut old = invoice_body("INV-0", &client_id, &sender_id);
    old["issueDate"] = json!("2019-06-01");
    let (code, _) = post_json(&client, srv.url("/api/invoices"), &token, old).await;
    assert_eq!(code, StatusCode::CREATED);

    let (status, report) = get_json(&client, srv.url("/api/analytics?timeRange=3months"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalInvoices"], 3);
    assert_eq!(report["paidInvoices"], 1);
    assert_eq!(report["pendingInvoices"], 1);
    assert_eq!(report["overdueInvoices"], 1);
    assert_eq!(report["totalClients"], 1);
    assert_eq!(report["totalRevenue"].as_f64(), Some(726.0));
    assert_eq!(report["averageInvoiceValue"].as_f64(), Some(242.0));
    assert_eq!(report["topClients"][0]["name"], "Globex");
    assert_eq!(report["monthlyRevenue"].as_array().unwrap().len(), 1);

    let (_, all) = get_json(&client, srv.url("/api/analytics?timeRange=all"), &token).await;
    assert_eq!(all["totalInvoices"], 3);

    let (status, dashboard) = get_json(&client, srv.url("/api/dashboard"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totalInvoices"], 4);
    assert_eq!(dashboard["paidInvoices"], 1);
    assert_eq!(dashboard["pendingInvoices"], 2);
    assert_eq!(dashboard["totalRevenue"].as_f64(), Some(242.0));
    assert_eq!(dashboard["totalClients"], 1);
}

#[tokio::test]
async fn out_of_range_invoices_are_rejected_and_reports_keep_working() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = sign_up_and_in(&client, &srv, "ada@example.com").await;
    let (client_id, sender_id) = seed_parties(&client, &srv, &token).await;

    let mut huge = invoice_body("INV-HUGE", &client_id, &sender_id);
    huge["status"] = json!("PAID");
    huge["items"] = json!([{ "description": "Everything", "quantity": 1, "unitPrice": "50000000000000000000000000000" }]);
    for _ in 0..2 {
        let (code, body) = post_json(&client, srv.url("/api/invoices"), &token, huge.clone()).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    let mut late = invoice_body("INV-LATE", &client_id, &sender_id);
    late["issueDate"] = json!("+262142-12-31");
    let (code, body) = post_json(&client, srv.url("/api/invoices"), &token, late).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "issue date is out of range");

    let (code, report) = get_json(&client, srv.url("/api/analytics?timeRange=all"), &token).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(report["totalInvoices"], 0);
    let (code, _) = get_json(&client, srv.url("/api/dashboard"), &token).await;
    assert_eq!(code, StatusCode::OK);
}

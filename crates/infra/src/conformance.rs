//! Behaviour every `Store` implementation must share.
//!
//! The suite always runs against `InMemoryStore`. Set `DATABASE_URL` to also
//! run it against Postgres.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

use invoify_auth::{NewAccount, UserAccount};
use invoify_core::{DomainError, InvoiceId, UserId};
use invoify_invoicing::{Invoice, InvoiceDraft, InvoiceFilter, InvoiceStatus};
use invoify_parties::{Client, ClientDraft, Company, CompanyDraft, PartyDraft};

use crate::error::StoreError;
use crate::memory::InMemoryStore;
use crate::postgres::PgStore;
use crate::store::Store;

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", UserId::new())
}

async fn account(store: &dyn Store) -> UserId {
    let account = UserAccount::register(
        NewAccount {
            name: Some("Owner".into()),
            email: unique_email("owner"),
            password: "secret1".into(),
        },
        "$2b$04$hash".into(),
        Utc::now(),
    );
    let id = account.id;
    store.create_account(account).await.unwrap();
    id
}

fn party(name: &str) -> PartyDraft {
    PartyDraft {
        name: Some(name.into()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        ..Default::default()
    }
}

async fn client(store: &dyn Store, owner: UserId, name: &str, offset_secs: i64) -> Client {
    let fields = ClientDraft { details: party(name), notes: None }.validate().unwrap();
    let client = Client::create(owner, fields, Utc::now() + Duration::seconds(offset_secs));
    store.insert_client(client.clone()).await.unwrap();
    client
}

async fn company(store: &dyn Store, owner: UserId, name: &str, offset_secs: i64) -> Company {
    let fields = CompanyDraft { details: party(name), website: None }.validate().unwrap();
    let company = Company::create(owner, fields, Utc::now() + Duration::seconds(offset_secs));
    store.insert_company(company.clone()).await.unwrap();
    company
}

fn invoice(owner: UserId, client: &Client, sender: &Company, number: &str, title: &str, offset_secs: i64) -> Invoice {
    let draft: InvoiceDraft = serde_json::from_value(json!({
        "invoiceNumber": number,
        "title": title,
        "clientId": client.id.to_string(),
        "senderId": sender.id.to_string(),
        "issueDate": "2025-03-01",
        "taxRate": 10,
        "items": [
            { "description": "Design", "quantity": 2, "unitPrice": 100 },
            { "description": "Hosting", "quantity": 1, "unitPrice": 20 }
        ]
    }))
    .unwrap();
    let fields = draft.validate(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).unwrap();
    Invoice::create(owner, fields, Utc::now() + Duration::seconds(offset_secs))
}

async fn accounts_have_unique_emails(store: &dyn Store) {
    let email = unique_email("dup");
    let make = || {
        UserAccount::register(
            NewAccount {
                name: None,
                email: email.clone(),
                password: "secret1".into(),
            },
            "hash".into(),
            Utc::now(),
        )
    };
    let first = make();
    store.create_account(first.clone()).await.unwrap();
    let err = store.create_account(make()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

    let found = store.find_account_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(store.find_account(first.id).await.unwrap().is_some());
}

async fn parties_are_owner_scoped_and_ordered(store: &dyn Store) {
    let owner = account(store).await;
    let stranger = account(store).await;

    let older = client(store, owner, "Globex", 0).await;
    let newer = client(store, owner, "Initech", 5).await;
    let listed: Vec<_> = store.list_clients(owner).await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(listed, vec![newer.id, older.id]);
    assert_eq!(store.count_clients(owner).await.unwrap(), 2);

    assert!(store.get_client(stranger, older.id).await.unwrap().is_none());
    assert!(!store.delete_client(stranger, older.id).await.unwrap());
    let mut hijack = older.clone();
    hijack.owner_id = stranger;
    assert!(!store.update_client(&hijack).await.unwrap());

    let mut renamed = older.clone();
    renamed.details.name = "Globex Corp".into();
    assert!(store.update_client(&renamed).await.unwrap());
    assert_eq!(store.get_client(owner, older.id).await.unwrap().unwrap().name(), "Globex Corp");

    let first = company(store, owner, "Alpha", 0).await;
    let second = company(store, owner, "Beta", 5).await;
    let listed: Vec<_> = store.list_companies(owner).await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(listed, vec![first.id, second.id]);
    assert!(store.list_companies(stranger).await.unwrap().is_empty());

    assert!(store.delete_client(owner, newer.id).await.unwrap());
    assert!(store.get_client(owner, newer.id).await.unwrap().is_none());
}

async fn invoices_round_trip_with_items(store: &dyn Store) {
    let owner = account(store).await;
    let stranger = account(store).await;
    let globex = client(store, owner, "Globex", 0).await;
    let sender = company(store, owner, "Me", 0).await;

    let first = invoice(owner, &globex, &sender, "INV-202503-001", "Retainer", 0);
    let second = invoice(owner, &globex, &sender, "INV-202503-002", "Website rebuild", 5);
    store.insert_invoice(&first).await.unwrap();
    store.insert_invoice(&second).await.unwrap();

    let loaded = store.get_invoice(owner, first.id).await.unwrap().unwrap();
    assert_eq!(loaded.invoice.items.len(), 2);
    assert_eq!(loaded.invoice.items[0].description, "Design");
    assert_eq!(loaded.invoice.totals, first.totals);
    assert_eq!(loaded.client.id, globex.id);
    assert_eq!(loaded.sender.id, sender.id);
    assert!(store.get_invoice(stranger, first.id).await.unwrap().is_none());

    let all = store.list_invoices(owner, &InvoiceFilter::default()).await.unwrap();
    let ids: Vec<InvoiceId> = all.iter().map(|d| d.invoice.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let search = InvoiceFilter {
        search: Some("rebuild".into()),
        ..Default::default()
    };
    let found = store.list_invoices(owner, &search).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].invoice.id, second.id);

    assert!(
        store
            .set_invoice_status(owner, first.id, InvoiceStatus::Paid, Utc::now())
            .await
            .unwrap()
    );
    assert!(
        !store
            .set_invoice_status(stranger, first.id, InvoiceStatus::Cancelled, Utc::now())
            .await
            .unwrap()
    );
    let paid = InvoiceFilter {
        status: Some(InvoiceStatus::Paid),
        ..Default::default()
    };
    assert_eq!(store.list_invoices(owner, &paid).await.unwrap().len(), 1);

    // Full update replaces the item list.
    let mut replaced = first.clone();
    replaced.items.truncate(1);
    replaced.invoice_number = "INV-202503-001A".into();
    assert!(store.update_invoice(&replaced).await.unwrap());
    let reloaded = store.get_invoice(owner, first.id).await.unwrap().unwrap();
    assert_eq!(reloaded.invoice.items.len(), 1);
    assert_eq!(reloaded.invoice.invoice_number, "INV-202503-001A");

    assert!(!store.delete_invoice(stranger, first.id).await.unwrap());
    assert!(store.delete_invoice(owner, first.id).await.unwrap());
    assert!(store.get_invoice(owner, first.id).await.unwrap().is_none());
}

async fn referenced_parties_cannot_be_deleted(store: &dyn Store) {
    let owner = account(store).await;
    let globex = client(store, owner, "Globex", 0).await;
    let sender = company(store, owner, "Me", 0).await;
    let inv = invoice(owner, &globex, &sender, "INV-1", "Work", 0);
    store.insert_invoice(&inv).await.unwrap();

    let err = store.delete_client(owner, globex.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");
    let err = store.delete_company(owner, sender.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

    assert!(store.delete_invoice(owner, inv.id).await.unwrap());
    assert!(store.delete_client(owner, globex.id).await.unwrap());
    assert!(store.delete_company(owner, sender.id).await.unwrap());
}

fn draft_at_limits(client: &Client, sender: &Company, unit_price: &str, tax_rate: &str) -> InvoiceDraft {
    serde_json::from_value(json!({
        "invoiceNumber": "INV-MAX",
        "clientId": client.id.to_string(),
        "senderId": sender.id.to_string(),
        "issueDate": "2025-03-01",
        "taxRate": tax_rate,
        "items": [
            { "description": "Retainer", "quantity": "0.0001", "unitPrice": unit_price },
            { "description": "Licences", "quantity": "99", "unitPrice": "999999999999.9999" }
        ]
    }))
    .unwrap()
}

async fn numeric_limits_survive_storage(store: &dyn Store) {
    let owner = account(store).await;
    let globex = client(store, owner, "Globex", 0).await;
    let sender = company(store, owner, "Me", 0).await;
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    let fields = draft_at_limits(&globex, &sender, "999999999999.9999", "1.0001")
        .validate(today)
        .unwrap();
    let inv = Invoice::create(owner, fields, Utc::now());
    store.insert_invoice(&inv).await.unwrap();

    let loaded = store.get_invoice(owner, inv.id).await.unwrap().unwrap().invoice;
    assert_eq!(loaded.tax_rate, inv.tax_rate);
    assert_eq!(loaded.totals, inv.totals);
    for (stored, original) in loaded.items.iter().zip(&inv.items) {
        assert_eq!(stored.quantity, original.quantity);
        assert_eq!(stored.unit_price, original.unit_price);
        assert_eq!(stored.amount, original.amount);
    }

    // Anything a column would round or overflow is refused before reaching a store.
    for (price, rate) in [("1.00001", "0"), ("1", "0.00001"), ("1", "100000"), ("1000000000000", "0")] {
        let err = draft_at_limits(&globex, &sender, price, rate).validate(today).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{price}/{rate}: {err:?}");
    }
    let err = draft_at_limits(&globex, &sender, "1", "10").validate(today).unwrap_err();
    assert_eq!(err, DomainError::validation("invoice amounts are out of range"));
}

async fn run_suite(store: Arc<dyn Store>) {
    accounts_have_unique_emails(store.as_ref()).await;
    parties_are_owner_scoped_and_ordered(store.as_ref()).await;
    invoices_round_trip_with_items(store.as_ref()).await;
    referenced_parties_cannot_be_deleted(store.as_ref()).await;
    numeric_limits_survive_storage(store.as_ref()).await;
}

#[tokio::test]
async fn in_memory_store_conforms() {
    run_suite(Arc::new(InMemoryStore::new())).await;
}

#[tokio::test]
async fn postgres_store_conforms() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping postgres store suite");
        return;
    };
    let store = PgStore::connect(&url, 2).await.unwrap();
    store.apply_schema().await.unwrap();
    // Idempotent.
    store.apply_schema().await.unwrap();
    run_suite(Arc::new(store)).await;
}

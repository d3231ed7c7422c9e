//! Postgres-backed store.
//!
//! Runtime-checked `sqlx` queries against the bundled `schema.sql`. Invoice
//! writes touch two tables and always run in a transaction.
//!
//! ## Error mapping
//!
//! | SQLSTATE | Meaning | StoreError |
//! |----------|---------|------------|
//! | `23505` | unique violation (duplicate e-mail) | `Conflict` |
//! | `23503` | foreign key violation (party still referenced) | `Conflict` |
//! | other / IO / pool | | `Backend` |

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use invoify_auth::UserAccount;
use invoify_core::{ClientId, CompanyId, InvoiceId, InvoiceItemId, UserId};
use invoify_invoicing::{Invoice, InvoiceDetails, InvoiceFilter, InvoiceItem, InvoiceStatus, InvoiceTotals};
use invoify_parties::{Client, Company, PartyDetails, PostalAddress};

use crate::error::{StoreError, StoreResult};
use crate::store::{AccountStore, ClientStore, CompanyStore, InvoiceStore};

const SCHEMA: &str = include_str!("schema.sql");

const PARTY_COLUMNS: &str =
    "id, user_id, name, email, phone, address, city, state, zip_code, country, tax_id, created_at, updated_at";

const INVOICE_COLUMNS: &str = "i.id, i.user_id, i.invoice_number, i.title, i.description, i.status, \
     i.issue_date, i.due_date, i.client_id, i.sender_id, i.tax_rate, i.subtotal, i.tax_amount, \
     i.discount, i.total, i.notes, i.payment_terms, i.created_at, i.updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables and indexes.
    pub async fn apply_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        tracing::info!("database schema applied");
        Ok(())
    }

    async fn begin(&self, operation: &str) -> StoreResult<Transaction<'_, Postgres>> {
        self.pool.begin().await.map_err(|e| map_sqlx_error(operation, e))
    }

    /// Join loaded invoice rows with their parties and items.
    async fn hydrate(&self, owner: UserId, invoices: Vec<Invoice>) -> StoreResult<Vec<InvoiceDetails>> {
        if invoices.is_empty() {
            return Ok(Vec::new());
        }

        let invoice_ids: Vec<Uuid> = invoices.iter().map(|i| Uuid::from(i.id)).collect();
        let client_ids: Vec<Uuid> = invoices.iter().map(|i| Uuid::from(i.client_id)).collect();
        let sender_ids: Vec<Uuid> = invoices.iter().map(|i| Uuid::from(i.sender_id)).collect();

        let clients: HashMap<ClientId, Client> = sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, notes FROM clients WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(Uuid::from(owner))
        .bind(&client_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_invoice_clients", e))?
        .iter()
        .map(|row| client_from_row(row).map(|c| (c.id, c)))
        .collect::<StoreResult<_>>()?;

        let senders: HashMap<CompanyId, Company> = sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, website FROM companies WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(Uuid::from(owner))
        .bind(&sender_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_invoice_senders", e))?
        .iter()
        .map(|row| company_from_row(row).map(|c| (c.id, c)))
        .collect::<StoreResult<_>>()?;

        let mut items: HashMap<Uuid, Vec<InvoiceItem>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, description, quantity, unit_price, amount
            FROM invoice_items
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, position
            "#,
        )
        .bind(&invoice_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_invoice_items", e))?;
        for row in &rows {
            let invoice_id: Uuid = row.try_get("invoice_id").map_err(corrupt)?;
            items.entry(invoice_id).or_default().push(item_from_row(row)?);
        }

        invoices
            .into_iter()
            .map(|mut invoice| {
                invoice.items = items.remove(&Uuid::from(invoice.id)).unwrap_or_default();
                let client = clients
                    .get(&invoice.client_id)
                    .cloned()
                    .ok_or_else(|| StoreError::corrupt(format!("invoice {} references a missing client", invoice.id)))?;
                let sender = senders
                    .get(&invoice.sender_id)
                    .cloned()
                    .ok_or_else(|| StoreError::corrupt(format!("invoice {} references a missing sender", invoice.id)))?;
                Ok(InvoiceDetails { invoice, client, sender })
            })
            .collect()
    }
}

async fn insert_items(tx: &mut Transaction<'_, Postgres>, invoice: &Invoice) -> StoreResult<()> {
    for (position, item) in invoice.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (id, invoice_id, position, description, quantity, unit_price, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(item.id))
        .bind(Uuid::from(invoice.id))
        .bind(position as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.amount)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice_items", e))?;
    }
    Ok(())
}

#[async_trait]
impl AccountStore for PgStore {
    #[instrument(skip(self, account), fields(user_id = %account.id), err)]
    async fn create_account(&self, account: UserAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(account.id))
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        sqlx::query("SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account_by_email", e))?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }

    async fn find_account(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        sqlx::query("SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account", e))?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }
}

#[async_trait]
impl ClientStore for PgStore {
    async fn list_clients(&self, owner: UserId) -> StoreResult<Vec<Client>> {
        sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, notes FROM clients WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(Uuid::from(owner))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_clients", e))?
        .iter()
        .map(client_from_row)
        .collect()
    }

    async fn get_client(&self, owner: UserId, id: ClientId) -> StoreResult<Option<Client>> {
        sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, notes FROM clients WHERE user_id = $1 AND id = $2"
        ))
        .bind(Uuid::from(owner))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_client", e))?
        .as_ref()
        .map(client_from_row)
        .transpose()
    }

    async fn count_clients(&self, owner: UserId) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE user_id = $1")
            .bind(Uuid::from(owner))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_clients", e))?;
        Ok(count.max(0) as usize)
    }

    #[instrument(skip(self, client), fields(client_id = %client.id), err)]
    async fn insert_client(&self, client: Client) -> StoreResult<()> {
        let d = &client.details;
        sqlx::query(
            r#"
            INSERT INTO clients
                (id, user_id, name, email, phone, address, city, state, zip_code, country, tax_id, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(Uuid::from(client.id))
        .bind(Uuid::from(client.owner_id))
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.phone)
        .bind(&d.address.address)
        .bind(&d.address.city)
        .bind(&d.address.state)
        .bind(&d.address.zip_code)
        .bind(&d.address.country)
        .bind(&d.tax_id)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_client", e))?;
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> StoreResult<bool> {
        let d = &client.details;
        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = $3, email = $4, phone = $5, address = $6, city = $7, state = $8,
                zip_code = $9, country = $10, tax_id = $11, notes = $12, updated_at = $13
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(Uuid::from(client.id))
        .bind(Uuid::from(client.owner_id))
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.phone)
        .bind(&d.address.address)
        .bind(&d.address.city)
        .bind(&d.address.state)
        .bind(&d.address.zip_code)
        .bind(&d.address.country)
        .bind(&d.tax_id)
        .bind(&client.notes)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_client", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_client(&self, owner: UserId, id: ClientId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_client", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CompanyStore for PgStore {
    async fn list_companies(&self, owner: UserId) -> StoreResult<Vec<Company>> {
        sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, website FROM companies WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(Uuid::from(owner))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_companies", e))?
        .iter()
        .map(company_from_row)
        .collect()
    }

    async fn get_company(&self, owner: UserId, id: CompanyId) -> StoreResult<Option<Company>> {
        sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS}, website FROM companies WHERE user_id = $1 AND id = $2"
        ))
        .bind(Uuid::from(owner))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_company", e))?
        .as_ref()
        .map(company_from_row)
        .transpose()
    }

    #[instrument(skip(self, company), fields(company_id = %company.id), err)]
    async fn insert_company(&self, company: Company) -> StoreResult<()> {
        let d = &company.details;
        sqlx::query(
            r#"
            INSERT INTO companies
                (id, user_id, name, email, phone, address, city, state, zip_code, country, tax_id, website, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(Uuid::from(company.id))
        .bind(Uuid::from(company.owner_id))
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.phone)
        .bind(&d.address.address)
        .bind(&d.address.city)
        .bind(&d.address.state)
        .bind(&d.address.zip_code)
        .bind(&d.address.country)
        .bind(&d.tax_id)
        .bind(&company.website)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_company", e))?;
        Ok(())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<bool> {
        let d = &company.details;
        let result = sqlx::query(
            r#"
            UPDATE companies SET
                name = $3, email = $4, phone = $5, address = $6, city = $7, state = $8,
                zip_code = $9, country = $10, tax_id = $11, website = $12, updated_at = $13
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(Uuid::from(company.id))
        .bind(Uuid::from(company.owner_id))
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.phone)
        .bind(&d.address.address)
        .bind(&d.address.city)
        .bind(&d.address.state)
        .bind(&d.address.zip_code)
        .bind(&d.address.country)
        .bind(&d.tax_id)
        .bind(&company.website)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_company", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_company(&self, owner: UserId, id: CompanyId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_company", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InvoiceStore for PgStore {
    #[instrument(skip(self, owner, filter), fields(user_id = %owner), err)]
    async fn list_invoices(&self, owner: UserId, filter: &InvoiceFilter) -> StoreResult<Vec<InvoiceDetails>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices i JOIN clients c ON c.id = i.client_id WHERE i.user_id = "
        ));
        query.push_bind(Uuid::from(owner));

        if let Some(status) = filter.status {
            query.push(" AND i.status = ").push_bind(status.as_str());
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND i.client_id = ").push_bind(Uuid::from(client_id));
        }
        if let Some(from) = filter.issued_from {
            query.push(" AND i.issue_date >= ").push_bind(from);
        }
        if let Some(term) = filter.search_term() {
            let pattern = format!("%{}%", escape_like(term));
            query
                .push(" AND (i.invoice_number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR i.title ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY i.created_at DESC, i.id DESC");

        let invoices = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_invoices", e))?
            .iter()
            .map(invoice_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        self.hydrate(owner, invoices).await
    }

    async fn get_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<InvoiceDetails>> {
        let row = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.user_id = $1 AND i.id = $2"
        ))
        .bind(Uuid::from(owner))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_invoice", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let invoice = invoice_from_row(&row)?;
        Ok(self.hydrate(owner, vec![invoice]).await?.into_iter().next())
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, items = invoice.items.len()), err)]
    async fn insert_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut tx = self.begin("insert_invoice").await?;
        let t = &invoice.totals;
        sqlx::query(
            r#"
            INSERT INTO invoices
                (id, user_id, invoice_number, title, description, status, issue_date, due_date,
                 client_id, sender_id, tax_rate, subtotal, tax_amount, discount, total,
                 notes, payment_terms, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(Uuid::from(invoice.id))
        .bind(Uuid::from(invoice.owner_id))
        .bind(&invoice.invoice_number)
        .bind(&invoice.title)
        .bind(&invoice.description)
        .bind(invoice.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(Uuid::from(invoice.client_id))
        .bind(Uuid::from(invoice.sender_id))
        .bind(invoice.tax_rate)
        .bind(t.subtotal)
        .bind(t.tax_amount)
        .bind(t.discount)
        .bind(t.total)
        .bind(&invoice.notes)
        .bind(&invoice.payment_terms)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice", e))?;

        insert_items(&mut tx, invoice).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("insert_invoice", e))
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, items = invoice.items.len()), err)]
    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<bool> {
        let mut tx = self.begin("update_invoice").await?;
        let t = &invoice.totals;
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                invoice_number = $3, title = $4, description = $5, status = $6, issue_date = $7,
                due_date = $8, client_id = $9, sender_id = $10, tax_rate = $11, subtotal = $12,
                tax_amount = $13, discount = $14, total = $15, notes = $16, payment_terms = $17,
                updated_at = $18
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(Uuid::from(invoice.id))
        .bind(Uuid::from(invoice.owner_id))
        .bind(&invoice.invoice_number)
        .bind(&invoice.title)
        .bind(&invoice.description)
        .bind(invoice.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(Uuid::from(invoice.client_id))
        .bind(Uuid::from(invoice.sender_id))
        .bind(invoice.tax_rate)
        .bind(t.subtotal)
        .bind(t.tax_amount)
        .bind(t.discount)
        .bind(t.total)
        .bind(&invoice.notes)
        .bind(&invoice.payment_terms)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_invoice", e))?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| map_sqlx_error("update_invoice", e))?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(Uuid::from(invoice.id))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_invoice_items", e))?;
        insert_items(&mut tx, invoice).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_invoice", e))?;
        Ok(true)
    }

    async fn set_invoice_status(
        &self,
        owner: UserId,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE invoices SET status = $3, updated_at = $4 WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_invoice_status", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool> {
        // Items go with the invoice via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invoice", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn corrupt(err: sqlx::Error) -> StoreError {
    StoreError::corrupt(err.to_string())
}

fn account_from_row(row: &PgRow) -> StoreResult<UserAccount> {
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(corrupt)?),
        name: row.try_get("name").map_err(corrupt)?,
        email: row.try_get("email").map_err(corrupt)?,
        password_hash: row.try_get("password_hash").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
    })
}

fn party_from_row(row: &PgRow) -> StoreResult<PartyDetails> {
    Ok(PartyDetails {
        name: row.try_get("name").map_err(corrupt)?,
        email: row.try_get("email").map_err(corrupt)?,
        phone: row.try_get("phone").map_err(corrupt)?,
        address: PostalAddress {
            address: row.try_get("address").map_err(corrupt)?,
            city: row.try_get("city").map_err(corrupt)?,
            state: row.try_get("state").map_err(corrupt)?,
            zip_code: row.try_get("zip_code").map_err(corrupt)?,
            country: row.try_get("country").map_err(corrupt)?,
        },
        tax_id: row.try_get("tax_id").map_err(corrupt)?,
    })
}

fn client_from_row(row: &PgRow) -> StoreResult<Client> {
    Ok(Client {
        id: ClientId::from_uuid(row.try_get("id").map_err(corrupt)?),
        owner_id: UserId::from_uuid(row.try_get("user_id").map_err(corrupt)?),
        details: party_from_row(row)?,
        notes: row.try_get("notes").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
        updated_at: row.try_get("updated_at").map_err(corrupt)?,
    })
}

fn company_from_row(row: &PgRow) -> StoreResult<Company> {
    Ok(Company {
        id: CompanyId::from_uuid(row.try_get("id").map_err(corrupt)?),
        owner_id: UserId::from_uuid(row.try_get("user_id").map_err(corrupt)?),
        details: party_from_row(row)?,
        website: row.try_get("website").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
        updated_at: row.try_get("updated_at").map_err(corrupt)?,
    })
}

/// Items are attached later by [`PgStore::hydrate`].
fn invoice_from_row(row: &PgRow) -> StoreResult<Invoice> {
    let status: String = row.try_get("status").map_err(corrupt)?;
    let status: InvoiceStatus = status
        .parse()
        .map_err(|e| StoreError::corrupt(format!("invoice status: {e}")))?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get("id").map_err(corrupt)?),
        owner_id: UserId::from_uuid(row.try_get("user_id").map_err(corrupt)?),
        invoice_number: row.try_get("invoice_number").map_err(corrupt)?,
        title: row.try_get("title").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
        status,
        issue_date: row.try_get("issue_date").map_err(corrupt)?,
        due_date: row.try_get("due_date").map_err(corrupt)?,
        client_id: ClientId::from_uuid(row.try_get("client_id").map_err(corrupt)?),
        sender_id: CompanyId::from_uuid(row.try_get("sender_id").map_err(corrupt)?),
        items: Vec::new(),
        tax_rate: row.try_get("tax_rate").map_err(corrupt)?,
        totals: InvoiceTotals {
            subtotal: row.try_get("subtotal").map_err(corrupt)?,
            tax_amount: row.try_get("tax_amount").map_err(corrupt)?,
            discount: row.try_get("discount").map_err(corrupt)?,
            total: row.try_get("total").map_err(corrupt)?,
        },
        notes: row.try_get("notes").map_err(corrupt)?,
        payment_terms: row.try_get("payment_terms").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
        updated_at: row.try_get("updated_at").map_err(corrupt)?,
    })
}

fn item_from_row(row: &PgRow) -> StoreResult<InvoiceItem> {
    Ok(InvoiceItem {
        id: InvoiceItemId::from_uuid(row.try_get("id").map_err(corrupt)?),
        description: row.try_get("description").map_err(corrupt)?,
        quantity: row.try_get("quantity").map_err(corrupt)?,
        unit_price: row.try_get("unit_price").map_err(corrupt)?,
        amount: row.try_get("amount").map_err(corrupt)?,
    })
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::backend(format!("connection pool closed in {operation}")),
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

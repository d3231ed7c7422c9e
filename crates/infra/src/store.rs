use async_trait::async_trait;
use chrono::{DateTime, Utc};

use invoify_auth::UserAccount;
use invoify_core::{ClientId, CompanyId, InvoiceId, UserId};
use invoify_invoicing::{Invoice, InvoiceDetails, InvoiceFilter, InvoiceStatus};
use invoify_parties::{Client, Company};

use crate::error::StoreResult;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account; `Conflict` if the e-mail is taken.
    async fn create_account(&self, account: UserAccount) -> StoreResult<()>;

    /// Lookup by lower-cased e-mail.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    async fn find_account(&self, id: UserId) -> StoreResult<Option<UserAccount>>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Newest first.
    async fn list_clients(&self, owner: UserId) -> StoreResult<Vec<Client>>;

    async fn get_client(&self, owner: UserId, id: ClientId) -> StoreResult<Option<Client>>;

    async fn count_clients(&self, owner: UserId) -> StoreResult<usize>;

    async fn insert_client(&self, client: Client) -> StoreResult<()>;

    /// Replace the stored record; `false` if it does not exist for `client.owner_id`.
    async fn update_client(&self, client: &Client) -> StoreResult<bool>;

    /// `Conflict` while any invoice references the client.
    async fn delete_client(&self, owner: UserId, id: ClientId) -> StoreResult<bool>;
}

#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Oldest first.
    async fn list_companies(&self, owner: UserId) -> StoreResult<Vec<Company>>;

    async fn get_company(&self, owner: UserId, id: CompanyId) -> StoreResult<Option<Company>>;

    async fn insert_company(&self, company: Company) -> StoreResult<()>;

    async fn update_company(&self, company: &Company) -> StoreResult<bool>;

    /// `Conflict` while any invoice names the company as sender.
    async fn delete_company(&self, owner: UserId, id: CompanyId) -> StoreResult<bool>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Newest first, joined with client and sender.
    async fn list_invoices(&self, owner: UserId, filter: &InvoiceFilter) -> StoreResult<Vec<InvoiceDetails>>;

    async fn get_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<InvoiceDetails>>;

    /// Insert the invoice and its items atomically.
    async fn insert_invoice(&self, invoice: &Invoice) -> StoreResult<()>;

    /// Replace every field and the full item list atomically.
    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<bool>;

    async fn set_invoice_status(
        &self,
        owner: UserId,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Removes the invoice and its items.
    async fn delete_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool>;
}

/// Everything the API needs from persistence.
pub trait Store: AccountStore + ClientStore + CompanyStore + InvoiceStore {}

impl<T> Store for T where T: AccountStore + ClientStore + CompanyStore + InvoiceStore {}

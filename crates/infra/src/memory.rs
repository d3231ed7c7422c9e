//! In-memory store for tests and local development.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use invoify_auth::UserAccount;
use invoify_core::{ClientId, CompanyId, InvoiceId, Owned, UserId};
use invoify_invoicing::{Invoice, InvoiceDetails, InvoiceFilter, InvoiceStatus};
use invoify_parties::{Client, Company};

use crate::error::{StoreError, StoreResult};
use crate::store::{AccountStore, ClientStore, CompanyStore, InvoiceStore};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<UserId, UserAccount>,
    clients: HashMap<ClientId, Client>,
    companies: HashMap<CompanyId, Company>,
    invoices: HashMap<InvoiceId, Invoice>,
}

impl State {
    fn owned<'a, K, V>(map: &'a HashMap<K, V>, owner: UserId, id: &K) -> Option<&'a V>
    where
        K: Eq + std::hash::Hash,
        V: Owned,
    {
        map.get(id).filter(|v| v.is_owned_by(owner))
    }

    fn details(&self, invoice: &Invoice) -> StoreResult<InvoiceDetails> {
        let client = Self::owned(&self.clients, invoice.owner_id, &invoice.client_id)
            .ok_or_else(|| StoreError::corrupt(format!("invoice {} references a missing client", invoice.id)))?;
        let sender = Self::owned(&self.companies, invoice.owner_id, &invoice.sender_id)
            .ok_or_else(|| StoreError::corrupt(format!("invoice {} references a missing sender", invoice.id)))?;
        Ok(InvoiceDetails {
            invoice: invoice.clone(),
            client: client.clone(),
            sender: sender.clone(),
        })
    }

    fn check_references(&self, invoice: &Invoice) -> StoreResult<()> {
        if Self::owned(&self.clients, invoice.owner_id, &invoice.client_id).is_none() {
            return Err(StoreError::conflict("invoice client does not exist"));
        }
        if Self::owned(&self.companies, invoice.owner_id, &invoice.sender_id).is_none() {
            return Err(StoreError::conflict("invoice sender does not exist"));
        }
        Ok(())
    }
}

/// Everything lives behind one lock so multi-map writes stay consistent.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, account: UserAccount) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::conflict("email already registered"));
        }
        state.accounts.insert(account.id, account);
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let state = self.read()?;
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        Ok(self.read()?.accounts.get(&id).cloned())
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn list_clients(&self, owner: UserId) -> StoreResult<Vec<Client>> {
        let state = self.read()?;
        let mut clients: Vec<Client> = state
            .clients
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(clients)
    }

    async fn get_client(&self, owner: UserId, id: ClientId) -> StoreResult<Option<Client>> {
        let state = self.read()?;
        Ok(State::owned(&state.clients, owner, &id).cloned())
    }

    async fn count_clients(&self, owner: UserId) -> StoreResult<usize> {
        let state = self.read()?;
        Ok(state.clients.values().filter(|c| c.is_owned_by(owner)).count())
    }

    async fn insert_client(&self, client: Client) -> StoreResult<()> {
        self.write()?.clients.insert(client.id, client);
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.clients.get_mut(&client.id) {
            Some(existing) if existing.is_owned_by(client.owner_id) => {
                *existing = client.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_client(&self, owner: UserId, id: ClientId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if State::owned(&state.clients, owner, &id).is_none() {
            return Ok(false);
        }
        if state.invoices.values().any(|i| i.client_id == id) {
            return Err(StoreError::conflict("client is referenced by invoices"));
        }
        state.clients.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl CompanyStore for InMemoryStore {
    async fn list_companies(&self, owner: UserId) -> StoreResult<Vec<Company>> {
        let state = self.read()?;
        let mut companies: Vec<Company> = state
            .companies
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(companies)
    }

    async fn get_company(&self, owner: UserId, id: CompanyId) -> StoreResult<Option<Company>> {
        let state = self.read()?;
        Ok(State::owned(&state.companies, owner, &id).cloned())
    }

    async fn insert_company(&self, company: Company) -> StoreResult<()> {
        self.write()?.companies.insert(company.id, company);
        Ok(())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.companies.get_mut(&company.id) {
            Some(existing) if existing.is_owned_by(company.owner_id) => {
                *existing = company.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_company(&self, owner: UserId, id: CompanyId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if State::owned(&state.companies, owner, &id).is_none() {
            return Ok(false);
        }
        if state.invoices.values().any(|i| i.sender_id == id) {
            return Err(StoreError::conflict("company is referenced by invoices"));
        }
        state.companies.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn list_invoices(&self, owner: UserId, filter: &InvoiceFilter) -> StoreResult<Vec<InvoiceDetails>> {
        let state = self.read()?;
        let mut out = Vec::new();
        for invoice in state.invoices.values().filter(|i| i.is_owned_by(owner)) {
            let details = state.details(invoice)?;
            if filter.matches(&details) {
                out.push(details);
            }
        }
        out.sort_by(|a, b| {
            b.invoice
                .created_at
                .cmp(&a.invoice.created_at)
                .then_with(|| b.invoice.id.cmp(&a.invoice.id))
        });
        Ok(out)
    }

    async fn get_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<InvoiceDetails>> {
        let state = self.read()?;
        State::owned(&state.invoices, owner, &id)
            .map(|invoice| state.details(invoice))
            .transpose()
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut state = self.write()?;
        state.check_references(invoice)?;
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<bool> {
        let mut state = self.write()?;
        if State::owned(&state.invoices, invoice.owner_id, &invoice.id).is_none() {
            return Ok(false);
        }
        state.check_references(invoice)?;
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(true)
    }

    async fn set_invoice_status(
        &self,
        owner: UserId,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.invoices.get_mut(&id) {
            Some(invoice) if invoice.is_owned_by(owner) => {
                invoice.set_status(status, now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_invoice(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if State::owned(&state.invoices, owner, &id).is_none() {
            return Ok(false);
        }
        state.invoices.remove(&id);
        Ok(true)
    }
}

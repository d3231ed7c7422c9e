use chrono::NaiveDate;

use invoify_core::ClientId;

use crate::invoice::InvoiceDetails;
use crate::status::InvoiceStatus;

/// Optional narrowing of an invoice listing. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<ClientId>,
    /// Case-insensitive substring of invoice number, client name or title.
    pub search: Option<String>,
    /// Only invoices issued on or after this date.
    pub issued_from: Option<NaiveDate>,
}

impl InvoiceFilter {
    pub fn issued_since(date: NaiveDate) -> Self {
        Self {
            issued_from: Some(date),
            ..Self::default()
        }
    }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, details: &InvoiceDetails) -> bool {
        let invoice = &details.invoice;

        if self.status.is_some_and(|status| invoice.status != status) {
            return false;
        }
        if self.client_id.is_some_and(|id| invoice.client_id != id) {
            return false;
        }
        if self.issued_from.is_some_and(|from| invoice.issue_date < from) {
            return false;
        }

        match self.search_term() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                let hit = |s: &str| s.to_lowercase().contains(&needle);
                hit(&invoice.invoice_number)
                    || hit(details.client.name())
                    || invoice.title.as_deref().is_some_and(hit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invoify_core::UserId;
    use invoify_parties::{Client, ClientDraft, Company, CompanyDraft, PartyDraft};
    use serde_json::json;

    use crate::invoice::{Invoice, InvoiceDraft};

    fn details(number: &str, client_name: &str, title: Option<&str>) -> InvoiceDetails {
        let owner = UserId::new();
        let now = Utc::now();
        let client = Client::create(
            owner,
            ClientDraft {
                details: PartyDraft {
                    name: Some(client_name.into()),
                    email: Some("billing@example.com".into()),
                    ..Default::default()
                },
                notes: None,
            }
            .validate()
            .unwrap(),
            now,
        );
        let sender = Company::create(
            owner,
            CompanyDraft {
                details: PartyDraft {
                    name: Some("Me Ltd".into()),
                    email: Some("me@example.com".into()),
                    ..Default::default()
                },
                website: None,
            }
            .validate()
            .unwrap(),
            now,
        );
        let draft: InvoiceDraft = serde_json::from_value(json!({
            "invoiceNumber": number,
            "title": title,
            "clientId": client.id.to_string(),
            "senderId": sender.id.to_string(),
            "issueDate": "2025-02-10",
            "items": [{ "description": "Work", "quantity": 1, "unitPrice": 10 }]
        }))
        .unwrap();
        let invoice = Invoice::create(owner, draft.validate(now.date_naive()).unwrap(), now);
        InvoiceDetails { invoice, client, sender }
    }

    #[test]
    fn search_covers_number_client_and_title() {
        let d = details("INV-202502-042", "Globex", Some("Website rebuild"));
        let search = |term: &str| InvoiceFilter {
            search: Some(term.into()),
            ..Default::default()
        };
        assert!(search("042").matches(&d));
        assert!(search("globex").matches(&d));
        assert!(search("REBUILD").matches(&d));
        assert!(!search("initech").matches(&d));
        assert!(search("   ").matches(&d));
    }

    #[test]
    fn status_and_date_must_match() {
        let d = details("INV-1", "Globex", None);
        let paid = InvoiceFilter {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        };
        assert!(!paid.matches(&d));

        let since = |y, m, day| InvoiceFilter::issued_since(NaiveDate::from_ymd_opt(y, m, day).unwrap());
        assert!(since(2025, 2, 10).matches(&d));
        assert!(!since(2025, 2, 11).matches(&d));
    }
}

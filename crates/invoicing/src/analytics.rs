//! Revenue analytics and the dashboard summary.
//!
//! Both are pure roll-ups over already-loaded invoices; callers narrow the
//! input (owner, time range) before computing. Sums are checked, so records
//! that bypassed validation produce an error instead of overflowing.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use invoify_core::{ClientId, DomainError, DomainResult};

use crate::invoice::InvoiceDetails;
use crate::status::InvoiceStatus;
use crate::totals::round_money;

fn add_money(acc: &mut Decimal, amount: Decimal) -> DomainResult<()> {
    *acc = acc
        .checked_add(amount)
        .ok_or_else(|| DomainError::validation("invoice amounts are out of range"))?;
    Ok(())
}

/// Reporting window selected by `?timeRange=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeRange {
    #[serde(rename = "3months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "12months")]
    TwelveMonths,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Unknown or missing values fall back to six months.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("3months") => TimeRange::ThreeMonths,
            Some("12months") => TimeRange::TwelveMonths,
            Some("all") => TimeRange::All,
            _ => TimeRange::SixMonths,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::ThreeMonths => "3months",
            TimeRange::SixMonths => "6months",
            TimeRange::TwelveMonths => "12months",
            TimeRange::All => "all",
        }
    }

    /// First issue date included in the window.
    pub fn start_date(self, today: NaiveDate) -> NaiveDate {
        let month_start = today.with_day(1).unwrap_or(today);
        let back = |months: u32| {
            month_start
                .checked_sub_months(Months::new(months))
                .unwrap_or(month_start)
        };
        match self {
            TimeRange::ThreeMonths => back(3),
            TimeRange::SixMonths => back(6),
            // Twelve calendar months including the current one.
            TimeRange::TwelveMonths => back(11),
            TimeRange::All => NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// `"Jan 2025"`.
    pub month: String,
    pub revenue: Decimal,
    pub invoices: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    #[serde(skip)]
    pub status: InvoiceStatus,
    /// Display label (`"Paid"`).
    #[serde(rename = "status")]
    pub label: &'static str,
    pub count: u32,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRevenue {
    pub client_id: ClientId,
    pub name: String,
    pub email: String,
    pub total_revenue: Decimal,
    pub invoice_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_revenue: Decimal,
    pub total_invoices: u32,
    pub paid_invoices: u32,
    pub pending_invoices: u32,
    pub overdue_invoices: u32,
    pub total_clients: u32,
    pub average_invoice_value: Decimal,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub status_breakdown: Vec<StatusSlice>,
    pub top_clients: Vec<ClientRevenue>,
}

impl AnalyticsReport {
    pub fn compute(invoices: &[InvoiceDetails]) -> DomainResult<Self> {
        let mut total_revenue = Decimal::ZERO;
        let mut paid = 0u32;
        let mut pending = 0u32;
        let mut overdue = 0u32;
        let mut clients = HashSet::new();
        let mut monthly: BTreeMap<(i32, u32), (Decimal, u32)> = BTreeMap::new();
        let mut by_status: BTreeMap<InvoiceStatus, (u32, Decimal)> = BTreeMap::new();
        let mut by_client: HashMap<ClientId, ClientRevenue> = HashMap::new();

        for details in invoices {
            let invoice = &details.invoice;
            let total = invoice.totals.total;
            add_money(&mut total_revenue, total)?;

            match invoice.status {
                InvoiceStatus::Paid => paid += 1,
                InvoiceStatus::Overdue => overdue += 1,
                status if status.is_pending() => pending += 1,
                _ => {}
            }
            clients.insert(invoice.client_id);

            let month = monthly
                .entry((invoice.issue_date.year(), invoice.issue_date.month()))
                .or_insert((Decimal::ZERO, 0));
            add_money(&mut month.0, total)?;
            month.1 += 1;

            let slice = by_status.entry(invoice.status).or_insert((0, Decimal::ZERO));
            slice.0 += 1;
            add_money(&mut slice.1, total)?;

            let client = by_client.entry(invoice.client_id).or_insert_with(|| ClientRevenue {
                client_id: invoice.client_id,
                name: details.client.name().to_string(),
                email: details.client.email().to_string(),
                total_revenue: Decimal::ZERO,
                invoice_count: 0,
            });
            add_money(&mut client.total_revenue, total)?;
            client.invoice_count += 1;
        }

        let total_invoices = invoices.len() as u32;
        let average_invoice_value = if total_invoices == 0 {
            Decimal::ZERO
        } else {
            round_money(total_revenue / Decimal::from(total_invoices))
        };

        let monthly_revenue = monthly
            .into_iter()
            .map(|((year, month), (revenue, count))| MonthlyRevenue {
                month: month_label(year, month),
                revenue,
                invoices: count,
            })
            .collect();

        let status_breakdown = by_status
            .into_iter()
            .map(|(status, (count, value))| StatusSlice {
                status,
                label: status.label(),
                count,
                value,
            })
            .collect();

        let mut top_clients: Vec<ClientRevenue> = by_client.into_values().collect();
        top_clients.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Self {
            total_revenue,
            total_invoices,
            paid_invoices: paid,
            pending_invoices: pending,
            overdue_invoices: overdue,
            total_clients: clients.len() as u32,
            average_invoice_value,
            monthly_revenue,
            status_breakdown,
            top_clients,
        })
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{month:02}/{year}"))
}

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_invoices: u32,
    /// Sum of totals of `PAID` invoices only.
    pub total_revenue: Decimal,
    pub paid_invoices: u32,
    pub pending_invoices: u32,
    pub total_clients: u32,
}

impl DashboardSummary {
    pub fn compute(invoices: &[InvoiceDetails], total_clients: usize) -> DomainResult<Self> {
        let mut summary = Self {
            total_invoices: invoices.len() as u32,
            total_revenue: Decimal::ZERO,
            paid_invoices: 0,
            pending_invoices: 0,
            total_clients: total_clients as u32,
        };
        for details in invoices {
            let invoice = &details.invoice;
            if invoice.status == InvoiceStatus::Paid {
                summary.paid_invoices += 1;
                add_money(&mut summary.total_revenue, invoice.totals.total)?;
            } else if invoice.status.is_pending() {
                summary.pending_invoices += 1;
            }
        }
        Ok(summary)
    }
}

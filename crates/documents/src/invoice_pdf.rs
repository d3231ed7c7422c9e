//! Invoice page layout.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use invoify_invoicing::{Invoice, InvoiceDetails};

use crate::layout::{Align, Color, Document, DrawOp, Font, PageSize, truncate, wrap_text};

const MARGIN: f32 = 25.0;
const ACCENT: Color = Color::rgb(41, 128, 185);
const SHADE: Color = Color::rgb(248, 250, 252);
const RULE: Color = Color::rgb(229, 231, 235);

/// Description, Qty, Unit Price, Amount.
const COLUMN_WIDTHS: [f32; 4] = [85.0, 20.0, 30.0, 35.0];
const HEADER_HEIGHT: f32 = 12.0;
const ROW_HEIGHT: f32 = 12.0;
/// Rows starting below `page height − this` go to a fresh page.
const ROW_LIMIT_FROM_BOTTOM: f32 = 80.0;
const DESCRIPTION_MAX_CHARS: usize = 40;
const TOTALS_WIDTH: f32 = 80.0;
const TOTALS_BOX_HEIGHT: f32 = 40.0;
const FOOTER_FROM_BOTTOM: f32 = 25.0;

pub const FOOTER_THANKS: &str = "Thank you for your business!";
pub const FOOTER_GENERATED: &str = "Generated by Invoify - Professional Invoice Management";

/// Builds the printable [`Document`] for one invoice.
pub struct InvoiceLayout {
    doc: Document,
    y: f32,
}

impl InvoiceLayout {
    pub fn build(details: &InvoiceDetails) -> Document {
        let invoice = &details.invoice;
        let mut layout = Self {
            doc: Document::new(format!("Invoice {}", invoice.invoice_number), PageSize::A4),
            y: MARGIN,
        };

        layout.heading(invoice);
        layout.title_block(invoice);
        layout.parties(details);
        layout.items_table(invoice);
        layout.totals(invoice);
        layout.notes(invoice);
        layout.footers();
        layout.doc
    }

    fn page_width(&self) -> f32 {
        self.doc.size.width
    }

    fn page_height(&self) -> f32 {
        self.doc.size.height
    }

    fn content_width(&self) -> f32 {
        self.page_width() - 2.0 * MARGIN
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, font: Font, color: Color) {
        self.aligned(text, x, y, size, font, color, Align::Left);
    }

    #[allow(clippy::too_many_arguments)]
    fn aligned(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, font: Font, color: Color, align: Align) {
        self.doc.current().ops.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            size,
            font,
            color,
            align,
        });
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.doc.current().ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, thickness: f32, color: Color) {
        self.doc.current().ops.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            thickness,
            color,
        });
    }

    /// Start a new page if `needed` millimetres do not fit above the footer.
    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > self.page_height() - FOOTER_FROM_BOTTOM - 5.0 {
            self.doc.add_page();
            self.y = MARGIN;
        }
    }

    fn heading(&mut self, invoice: &Invoice) {
        self.text("INVOICE", MARGIN, self.y, 20.0, Font::Bold, Color::BLACK);
        self.y += 20.0;

        let y = self.y;
        self.text(
            format!("Invoice Number: {}", invoice.invoice_number),
            MARGIN,
            y,
            11.0,
            Font::Regular,
            Color::BLACK,
        );
        self.text(
            format!("Issue Date: {}", long_date(invoice.issue_date)),
            MARGIN,
            y + 8.0,
            11.0,
            Font::Regular,
            Color::BLACK,
        );
        let right_col = self.page_width() - MARGIN - 70.0;
        self.text(
            format!("Due Date: {}", long_date(invoice.due_date)),
            right_col,
            y + 8.0,
            11.0,
            Font::Regular,
            Color::BLACK,
        );
        if let Some(terms) = &invoice.payment_terms {
            self.text(
                format!("Payment Terms: {terms}"),
                MARGIN,
                y + 16.0,
                11.0,
                Font::Regular,
                Color::BLACK,
            );
        }
        self.y += 35.0;
    }

    fn title_block(&mut self, invoice: &Invoice) {
        if let Some(title) = &invoice.title {
            self.text(title.clone(), MARGIN, self.y, 14.0, Font::Bold, Color::BLACK);
            self.y += 12.0;
        }
        if let Some(description) = &invoice.description {
            let lines = wrap_text(description, Font::Regular, 10.0, self.content_width());
            let count = lines.len();
            for (i, line) in lines.into_iter().enumerate() {
                self.text(line, MARGIN, self.y + i as f32 * 5.0, 10.0, Font::Regular, Color::BLACK);
            }
            self.y += count as f32 * 5.0 + 15.0;
        }
    }

    fn parties(&mut self, details: &InvoiceDetails) {
        let sender = &details.sender.details;
        let client = &details.client.details;
        let top = self.y;

        self.text("FROM:", MARGIN, top, 12.0, Font::Bold, Color::BLACK);
        let sender_y = top + 10.0;
        self.text(sender.name.clone(), MARGIN, sender_y, 11.0, Font::Regular, Color::BLACK);
        self.text(sender.email.clone(), MARGIN, sender_y + 7.0, 11.0, Font::Regular, Color::BLACK);
        if let Some(phone) = &sender.phone {
            self.text(phone.clone(), MARGIN, sender_y + 14.0, 11.0, Font::Regular, Color::BLACK);
        }

        let bill_x = self.page_width() / 2.0 + 20.0;
        let bill_top = sender_y;
        self.text("BILL TO:", bill_x, bill_top, 12.0, Font::Bold, Color::BLACK);
        let client_y = bill_top + 10.0;
        let box_width = self.page_width() - bill_x - MARGIN + 3.0;
        self.fill(bill_x - 3.0, client_y - 5.0, box_width, 25.0, SHADE);

        self.text(client.name.clone(), bill_x, client_y, 11.0, Font::Regular, Color::BLACK);
        self.text(client.email.clone(), bill_x, client_y + 7.0, 11.0, Font::Regular, Color::BLACK);
        let address = client.address.lines();
        for (i, line) in address.iter().enumerate() {
            self.text(
                line.clone(),
                bill_x,
                client_y + 14.0 + i as f32 * 6.0,
                11.0,
                Font::Regular,
                Color::BLACK,
            );
        }

        self.y = (client_y + 14.0 + address.len() as f32 * 6.0 + 15.0).max(sender_y + 45.0);
    }

    fn column_x(index: usize) -> f32 {
        MARGIN + COLUMN_WIDTHS[..index].iter().sum::<f32>()
    }

    fn table_header(&mut self, top: f32) {
        let width = self.content_width();
        self.fill(MARGIN, top, width, HEADER_HEIGHT, ACCENT);
        let y = top + 8.0;
        self.text("Description", Self::column_x(0) + 3.0, y, 10.0, Font::Bold, Color::WHITE);
        self.text("Qty", Self::column_x(1) + 8.0, y, 10.0, Font::Bold, Color::WHITE);
        self.text("Unit Price", Self::column_x(2) + 3.0, y, 10.0, Font::Bold, Color::WHITE);
        self.text("Amount", Self::column_x(3) + 10.0, y, 10.0, Font::Bold, Color::WHITE);
    }

    fn items_table(&mut self, invoice: &Invoice) {
        self.ensure_space(HEADER_HEIGHT + ROW_HEIGHT + 6.0);
        self.table_header(self.y);
        let mut row_y = self.y + 18.0;
        let width = self.content_width();

        for (index, item) in invoice.items.iter().enumerate() {
            if row_y > self.page_height() - ROW_LIMIT_FROM_BOTTOM {
                self.doc.add_page();
                self.table_header(MARGIN);
                row_y = MARGIN + 18.0;
            }
            if index % 2 == 0 {
                self.fill(MARGIN, row_y - 5.0, width, 10.0, SHADE);
            }

            self.text(
                truncate(&item.description, DESCRIPTION_MAX_CHARS),
                Self::column_x(0) + 3.0,
                row_y,
                9.0,
                Font::Regular,
                Color::BLACK,
            );
            self.aligned(
                item.quantity.normalize().to_string(),
                Self::column_x(1) + 8.0,
                row_y,
                9.0,
                Font::Regular,
                Color::BLACK,
                Align::Center,
            );
            self.text(money(item.unit_price), Self::column_x(2) + 3.0, row_y, 9.0, Font::Regular, Color::BLACK);
            self.aligned(
                money(item.amount),
                Self::column_x(3) + COLUMN_WIDTHS[3] - 3.0,
                row_y,
                9.0,
                Font::Regular,
                Color::BLACK,
                Align::Right,
            );
            row_y += ROW_HEIGHT;
        }

        self.y = row_y + 15.0;
    }

    fn totals(&mut self, invoice: &Invoice) {
        self.ensure_space(TOTALS_BOX_HEIGHT);
        let x = self.page_width() - MARGIN - TOTALS_WIDTH;
        let value_x = x + TOTALS_WIDTH - 10.0;
        let totals = &invoice.totals;

        self.fill(x - 5.0, self.y - 5.0, TOTALS_WIDTH + 10.0, TOTALS_BOX_HEIGHT, SHADE);

        let mut y = self.y;
        self.totals_line("Subtotal:", money(totals.subtotal), x, y);
        y += 8.0;
        if invoice.tax_rate > Decimal::ZERO {
            self.totals_line(format!("Tax ({}%):", invoice.tax_rate.normalize()), money(totals.tax_amount), x, y);
            y += 8.0;
        }
        if totals.discount > Decimal::ZERO {
            self.totals_line("Discount:", format!("-{}", money(totals.discount)), x, y);
            y += 8.0;
        }

        self.rule(x, x + TOTALS_WIDTH, y + 2.0, 0.5, ACCENT);
        y += 10.0;
        self.text("TOTAL:", x, y, 12.0, Font::Bold, ACCENT);
        self.aligned(money(totals.total), value_x, y, 12.0, Font::Bold, ACCENT, Align::Right);

        self.y = y + 25.0;
    }

    fn totals_line(&mut self, label: impl Into<String>, value: String, x: f32, y: f32) {
        self.text(label, x, y, 10.0, Font::Regular, Color::BLACK);
        self.aligned(value, x + TOTALS_WIDTH - 10.0, y, 10.0, Font::Regular, Color::BLACK, Align::Right);
    }

    fn notes(&mut self, invoice: &Invoice) {
        let Some(notes) = &invoice.notes else {
            return;
        };
        self.ensure_space(16.0);
        self.text("Notes:", MARGIN, self.y, 10.0, Font::Bold, Color::BLACK);
        self.y += 8.0;

        for line in wrap_text(notes, Font::Regular, 9.0, self.content_width()) {
            self.ensure_space(4.0);
            self.text(line, MARGIN, self.y, 9.0, Font::Regular, Color::BLACK);
            self.y += 4.0;
        }
        self.y += 10.0;
    }

    fn footers(&mut self) {
        let footer_y = self.page_height() - FOOTER_FROM_BOTTOM;
        let left = MARGIN;
        let right = self.page_width() - MARGIN;
        for page in &mut self.doc.pages {
            page.ops.push(DrawOp::Line {
                x1: left,
                y1: footer_y,
                x2: right,
                y2: footer_y,
                thickness: 0.3,
                color: RULE,
            });
            for (text, x, align) in [
                (FOOTER_THANKS, left, Align::Left),
                (FOOTER_GENERATED, right, Align::Right),
            ] {
                page.ops.push(DrawOp::Text {
                    text: text.to_string(),
                    x,
                    y: footer_y + 8.0,
                    size: 8.0,
                    font: Font::Regular,
                    color: Color::GREY,
                    align,
                });
            }
        }
    }
}

/// `$1234.50`
fn money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

/// `January 5, 2025`
fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Download name for an invoice PDF. Characters outside `[A-Za-z0-9._-]`
/// become `_`.
pub fn pdf_filename(invoice_number: &str) -> String {
    let safe: String = invoice_number
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let safe = if safe.is_empty() { "invoice".to_string() } else { safe };
    format!("Invoice-{safe}.pdf")
}

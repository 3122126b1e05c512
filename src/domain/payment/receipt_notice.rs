//! Receipt email content.

use crate::domain::lead::{format_eur, Lead, Receipt};

/// Subject and body for a payment receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptNotice {
    pub subject: String,
    pub html: String,
}

impl ReceiptNotice {
    /// Receipt addressed to the customer.
    pub fn for_payer(lead: &Lead, receipt: &Receipt) -> Self {
        let amount = format_eur(receipt.amount_cents);
        let subject = format!("Payment received: {amount} {}", receipt.payment_type.label().to_lowercase());
        let greeting = format!("<p>Hi {},</p>", escape_html(first_name(&lead.name)));
        let html = format!(
            "{greeting}<p>Thanks, we have received your payment.</p>{}{}<p>Next Level Web</p>",
            details_table(lead, receipt),
            receipt_link(receipt),
        );
        Self { subject, html }
    }

    /// Copy for the business inbox.
    pub fn for_operator(lead: &Lead, receipt: &Receipt) -> Self {
        let amount = format_eur(receipt.amount_cents);
        let subject = format!(
            "{} paid {amount} ({})",
            lead.name,
            receipt.payment_type.as_str()
        );
        let html = format!(
            "<p>Payment recorded for {} &lt;{}&gt; (lead {}).</p>{}{}",
            escape_html(&lead.name),
            escape_html(lead.email.as_str()),
            lead.id,
            details_table(lead, receipt),
            receipt_link(receipt),
        );
        Self { subject, html }
    }
}

fn details_table(lead: &Lead, receipt: &Receipt) -> String {
    format!(
        "<table>\
         <tr><td>Amount</td><td>{}</td></tr>\
         <tr><td>Payment</td><td>{}</td></tr>\
         <tr><td>Package</td><td>{}</td></tr>\
         <tr><td>Date</td><td>{}</td></tr>\
         </table>",
        format_eur(receipt.amount_cents),
        receipt.payment_type.label(),
        lead.package_label(),
        receipt.paid_at.display_date(),
    )
}

fn receipt_link(receipt: &Receipt) -> String {
    match &receipt.receipt_url {
        Some(url) => format!(
            "<p><a href=\"{}\">View your receipt</a></p>",
            escape_html(url)
        ),
        None => String::new(),
    }
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("there")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

//! Approval alert composition.
//!
//! The alert is HTML-formatted, so every interpolated value is escaped.
//! The deep link back to the approval page is attached as an inline
//! keyboard button only when Telegram will accept it: buttons pointing at
//! localhost, `.local` hosts, or private address space are rejected by
//! the Bot API, so those fall back to a plain-text link.

use rust_decimal::Decimal;
use serde::Serialize;

use quotedesk_core::format;

use crate::client::OutboundMessage;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// Everything the approver needs at a glance: quote reference, customer,
/// system, total, who asked, and where to act on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalAlert {
    pub quote_ref: String,
    pub company_name: String,
    pub system_name: String,
    pub total: Decimal,
    pub requester_label: Option<String>,
    pub approval_url: String,
}

impl ApprovalAlert {
    pub fn to_message(&self) -> OutboundMessage {
        let quote_ref = escape_html(&self.quote_ref);
        let company = escape_html(display_or_dash(&self.company_name));
        let system = escape_html(display_or_dash(&self.system_name));
        let total = escape_html(&format::baht(self.total));
        let url = escape_html(&self.approval_url);
        let inline_safe = url_is_inline_safe(&self.approval_url);

        let mut lines = vec![
            "มีใบเสนอราคาขออนุมัติ".to_string(),
            format!("เลขที่: {quote_ref}"),
            format!("ลูกค้า: {company}"),
            format!("ระบบ: {system}"),
            format!("ยอดรวม: {total}"),
        ];
        if let Some(requester) = self.requester_label.as_deref().filter(|r| !r.trim().is_empty()) {
            lines.push(format!("ผู้ขอ: {}", escape_html(requester)));
        }
        if inline_safe {
            lines.push(format!("ตรวจสอบและอนุมัติ: <a href=\"{url}\">เปิดใบเสนอราคา</a>"));
        } else {
            lines.push(format!("ตรวจสอบและอนุมัติ: {url}"));
        }

        OutboundMessage {
            text: lines.join("\n"),
            parse_mode: Some("HTML"),
            disable_web_page_preview: true,
            reply_markup: inline_safe.then(|| InlineKeyboard {
                inline_keyboard: vec![vec![InlineKeyboardButton {
                    text: "เปิดใบเสนอราคา".to_string(),
                    url: self.approval_url.clone(),
                }]],
            }),
        }
    }
}

fn display_or_dash(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "-"
    } else {
        trimmed
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether the Bot API will accept this URL on an inline button.
pub fn url_is_inline_safe(url: &str) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };

    if host == "localhost" || host.ends_with(".local") {
        return false;
    }

    !is_private_ipv4(&host)
}

fn host_of(url: &str) -> Option<String> {
    let rest = url.strip_prefix("http://").or_else(|| url.strip_prefix("https://"))?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split_once(']').map_or(bracketed, |(host, _)| host)
    } else {
        host_port.split(':').next().unwrap_or(host_port)
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

fn is_private_ipv4(host: &str) -> bool {
    let parts: Vec<i64> = match host.split('.').map(str::parse).collect() {
        Ok(parts) => parts,
        Err(_) => return false,
    };
    if parts.len() != 4 {
        return false;
    }

    let (a, b) = (parts[0], parts[1]);
    a == 10
        || a == 127
        || a == 0
        || (a == 192 && b == 168)
        || (a == 169 && b == 254)
        || (a == 172 && (16..=31).contains(&b))
        || (a == 100 && (64..=127).contains(&b))
}

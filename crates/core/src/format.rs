//! Currency display helpers shared by the notification text and the
//! rendered quotation document.

use rust_decimal::Decimal;

/// Whole-baht display with a currency sign, e.g. `฿28,100`.
pub fn baht(value: Decimal) -> String {
    let rounded = value.round_dp(0);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let grouped = group_thousands(digits.split('.').next().unwrap_or("0"));
    if negative {
        format!("-฿{grouped}")
    } else {
        format!("฿{grouped}")
    }
}

/// Plain two-decimal display used in document tables, e.g. `2,650.00`.
pub fn baht_plain(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, format!("{frac_part:0<2}")),
        None => (text.as_str(), "00".to_string()),
    };
    let grouped = group_thousands(int_part);
    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

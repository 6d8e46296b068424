//! Currency amount formatting shared by every report format.

use rust_decimal::{Decimal, RoundingStrategy};

/// Default currency symbol. Builtin PDF fonts cannot draw `₱`, so the ISO
/// code is used everywhere to keep all formats identical.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "PHP";

/// Round a monetary amount to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format `amount` as `"{symbol} 1,234.56"`.
///
/// ```
/// use rust_decimal::Decimal;
/// use trackwise_domain::money::format_money;
///
/// assert_eq!(format_money("PHP", Decimal::new(123456, 2)), "PHP 1,234.56");
/// assert_eq!(format_money("PHP", Decimal::ZERO), "PHP 0.00");
/// ```
pub fn format_money(symbol: &str, amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{symbol} {sign}{grouped}.{cents}")
}

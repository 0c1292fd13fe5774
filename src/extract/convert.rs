//! Value conversion from list item payloads to row values

use crate::schema::ColumnMeta;
use crate::types::JsonValue;
use serde_json::Number;

/// SharePoint type whose values are rewritten as fixed-point strings
pub const CURRENCY_TYPE: &str = "Currency";

/// Digits after the decimal point of a formatted currency value
const CURRENCY_SCALE: usize = 6;

/// Convert a raw item value for the column described by `meta`
///
/// Only `Currency` values are rewritten; everything else is passed through
/// and left to the sink to coerce.
pub fn convert(meta: &ColumnMeta, value: JsonValue) -> JsonValue {
    if meta.sharepoint_type == CURRENCY_TYPE {
        format_currency(value)
    } else {
        value
    }
}

/// Format a currency value with six fractional digits
///
/// Null stays null. Strings that are not plain decimals and non-scalar
/// values are returned unchanged.
pub fn format_currency(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => JsonValue::String(format_number(&n)),
        JsonValue::String(s) => match fixed_point(&s) {
            Some(formatted) => JsonValue::String(formatted),
            None => JsonValue::String(s),
        },
        other => other,
    }
}

/// Numbers keep their source text, so fractions are rescaled without a float
fn format_number(n: &Number) -> String {
    fixed_point(&n.to_string())
        .unwrap_or_else(|| format!("{:.*}", CURRENCY_SCALE, n.as_f64().unwrap_or_default()))
}

/// Rescale decimal text to six fractional digits, rounding half up
fn fixed_point(text: &str) -> Option<String> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(
        frac_part
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(CURRENCY_SCALE),
    );

    if frac_part.len() > CURRENCY_SCALE && frac_part.as_bytes()[CURRENCY_SCALE] >= b'5' {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - CURRENCY_SCALE;
    let mut whole = std::str::from_utf8(&digits[..split]).ok()?.trim_start_matches('0');
    if whole.is_empty() {
        whole = "0";
    }
    let frac = std::str::from_utf8(&digits[split..]).ok()?;

    let is_zero = whole == "0" && frac.bytes().all(|b| b == b'0');
    let sign = if negative && !is_zero { "-" } else { "" };
    Some(format!("{sign}{whole}.{frac}"))
}

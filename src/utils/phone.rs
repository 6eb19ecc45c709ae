/// Country code prepended to stored phone numbers
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Keeps digits (and a leading '+'), dropping the usual separators.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed.starts_with('+') {
        format!("+{}", digits)
    } else {
        digits
    }
}

/// E.164 address for the messaging API
pub fn to_e164(raw: &str) -> String {
    let normalized = normalize(raw);
    if normalized.starts_with('+') {
        normalized
    } else {
        format!("{}{}", DEFAULT_COUNTRY_CODE, normalized)
    }
}

/// A stored phone is a 10-digit national number or an explicit +E.164 one.
pub fn is_valid(raw: &str) -> bool {
    let normalized = normalize(raw);
    match normalized.strip_prefix('+') {
        Some(rest) => (8..=15).contains(&rest.len()),
        None => normalized.len() == 10,
    }
}

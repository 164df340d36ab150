use std::sync::OnceLock;

use regex::Regex;

fn re_health_secretariat_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^SES[\-\s./]*").expect("valid secretariat prefix regex"))
}

fn re_trailing_code() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z]{2})$").expect("valid region code regex"))
}

/// Reduces a raw state label such as `"SES-SP"` or `" rj "` to its two-letter code.
///
/// Labels without a trailing letter pair keep their first two characters.
/// Blank input yields `None`.
pub fn normalize_region_code(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let stripped = re_health_secretariat_prefix().replace(&upper, "");
    if let Some(caps) = re_trailing_code().captures(&stripped) {
        return Some(caps[1].to_string());
    }
    let head: String = stripped.chars().take(2).collect();
    (!head.is_empty()).then_some(head)
}

/// Trims the value and drops it entirely when nothing is left, so
/// "absent" and "blank" collapse into the same thing before insert.
pub fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// [`normalize`], then uppercases (state codes, last initials).
pub fn normalize_upper(value: Option<String>) -> Option<String> {
    normalize(value).map(|v| v.to_uppercase())
}

/// [`normalize`], then lowercases (email addresses).
pub fn normalize_lower(value: Option<String>) -> Option<String> {
    normalize(value).map(|v| v.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_collapse_to_none() {
        assert_eq!(normalize(Some("  ".into())), None);
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some(" Dallas ".into())), Some("Dallas".into()));
    }

    #[test]
    fn casing_helpers() {
        assert_eq!(normalize_upper(Some(" tx ".into())), Some("TX".into()));
        assert_eq!(
            normalize_lower(Some("Joe@Example.COM ".into())),
            Some("joe@example.com".into())
        );
    }
}

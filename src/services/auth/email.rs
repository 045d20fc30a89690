/*
 * Responsibility
 * - identity key (email) の正規化と形式チェック
 * - signup / login DTO と BOOTSTRAP_ADMIN_EMAIL で同じ規則を使う
 * - 大文字小文字は畳まない (owner 比較は完全一致)
 */

pub const MAX_EMAIL_CHARS: usize = 255;

/// Trim `raw` and check it looks like `local@domain`.
///
/// Returns the trimmed address, which is the form stored and compared everywhere.
pub fn normalize_email(raw: &str) -> Result<&str, &'static str> {
    let email = raw.trim();
    if email.is_empty() {
        return Err("email is required");
    }
    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err("email must be <= 255 chars");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err("email is not a valid address"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrounding_whitespace_is_dropped() {
        assert_eq!(normalize_email("  a@x.com \t"), Ok("a@x.com"));
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(normalize_email("A@X.com"), Ok("A@X.com"));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert_eq!(normalize_email("   "), Err("email is required"));
        for raw in ["no-at-sign", "@x.com", "a@"] {
            assert_eq!(normalize_email(raw), Err("email is not a valid address"), "{raw}");
        }
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 3 bytes per char in UTF-8
        let local = "가".repeat(MAX_EMAIL_CHARS - 2);
        let ok = format!("{local}@x");
        assert!(ok.len() > MAX_EMAIL_CHARS);
        assert_eq!(normalize_email(&ok), Ok(ok.as_str()));

        let too_long = format!("{local}가@x");
        assert_eq!(normalize_email(&too_long), Err("email must be <= 255 chars"));
    }
}

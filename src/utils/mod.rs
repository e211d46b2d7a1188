pub mod ip;
pub mod password;

/// 粗略的邮箱格式检查：`local@domain.tld`，不含空白
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email("ada@example."));
    }
}

//! Where session credentials live.

/// Key of the access token in the persistent key-value store.
pub const ACCESS_TOKEN_KEY: &str = "jwt";

/// Name of the cookie mirroring the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "jwt";

/// Name of the cookie holding the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Parse a `Cookie:` style header (`a=1; b=2`) into name/value pairs.
///
/// Pairs without `=` are skipped. Values keep any inner `=` characters.
#[must_use]
pub fn parse_cookie_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Read a single cookie value out of a `Cookie:` style header.
#[must_use]
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    parse_cookie_pairs(header)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; refreshToken=abc.def==; jwt=xyz";
        assert_eq!(
            cookie_value(header, REFRESH_TOKEN_COOKIE),
            Some("abc.def==".to_string())
        );
        assert_eq!(cookie_value(header, ACCESS_TOKEN_COOKIE), Some("xyz".to_string()));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        assert_eq!(cookie_value("refreshToken=; a=b", REFRESH_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_parse_cookie_pairs_skips_garbage() {
        let pairs = parse_cookie_pairs(" a=1 ;; novalue; =x; b = 2 ");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }
}

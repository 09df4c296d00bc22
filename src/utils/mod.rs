//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Trim and collapse every whitespace run to a single space.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://finfast.se/lediga-objekt"),
            Some("finfast.se".to_string())
        );
        assert_eq!(
            get_domain("https://www.example.com:8080/path"),
            Some("www.example.com".to_string())
        );
        assert_eq!(get_domain("not a url"), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  4 rum\n\t  Storgatan   1 "),
            "4 rum Storgatan 1"
        );
        assert_eq!(normalize_whitespace(" \n "), "");
    }
}

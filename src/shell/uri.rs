//! Turning address-bar input into something loadable

use url::Url;

// Schemes passed through as typed.
const KNOWN_SCHEMES: [&str; 5] = ["http", "https", "about", "file", "data"];

/// Guess the URI the user meant. Absolute URIs with a known scheme are kept,
/// anything else is assumed to be a host and gets `http://` in front.
pub fn guess_uri(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    match Url::parse(input) {
        Ok(url) if KNOWN_SCHEMES.contains(&url.scheme()) => input.to_string(),
        _ => format!("http://{input}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_known_schemes() {
        assert_eq!(guess_uri("https://example.com"), "https://example.com");
        assert_eq!(guess_uri("http://example.com/a?b"), "http://example.com/a?b");
        assert_eq!(guess_uri("about:blank"), "about:blank");
        assert_eq!(guess_uri("file:///tmp/x.html"), "file:///tmp/x.html");
    }

    #[test]
    fn test_prefixes_bare_hosts() {
        assert_eq!(guess_uri("example.com"), "http://example.com");
        assert_eq!(guess_uri("  example.com/path "), "http://example.com/path");
    }

    #[test]
    fn test_host_with_port_is_not_a_scheme() {
        assert_eq!(guess_uri("localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(guess_uri(""), "");
        assert_eq!(guess_uri("   "), "");
    }
}

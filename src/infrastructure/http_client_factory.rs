use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates an HTTP client with retry middleware for the price
    /// source: exponential backoff, max 3 retries on transient failures.
    pub fn create_client() -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Percent-encode one query component. Service keys arrive pre-encoded
/// and are appended verbatim by the callers; this is for free-text
/// values such as feed search queries.
pub fn encode_query_component(s: &str) -> String {
    let mut encoded = String::new();
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => {
                encoded.push(c);
            }
            _ => {
                for byte in c.to_string().as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_passes_unreserved_chars() {
        assert_eq!(encode_query_component("abc-DEF_0.9~"), "abc-DEF_0.9~");
    }

    #[test]
    fn test_encode_escapes_spaces_and_multibyte() {
        assert_eq!(encode_query_component("a b"), "a%20b");
        assert_eq!(encode_query_component("삼성"), "%EC%82%BC%EC%84%B1");
    }
}

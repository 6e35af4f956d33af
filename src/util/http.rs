use std::time::Duration;

use curl::easy::Easy;
use serde_json::Value;

use crate::{error::FetchError, logvbln, util::time::Benchmark};

/// Blocking libcurl GETs, moved off the event loop onto tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    timeout: Duration,
}

impl HttpClient {
    const CC: &str = "HttpClient";

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn get_json(&self, url: String) -> Result<Value, FetchError> {
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || HttpClient::blocking_get(&url, timeout)).await?
    }

    fn blocking_get(url: &str, timeout: Duration) -> Result<Value, FetchError> {
        // query strings may carry api keys
        let _benchmark = Benchmark::start(format!("GET {}", HttpClient::without_query(url)));

        let mut handle = Easy::new();
        handle.get(true)?;
        handle.url(url)?;
        handle.timeout(timeout)?;
        handle.follow_location(true)?;

        let mut buffer_response = Vec::new();
        {
            let mut transfer = handle.transfer();
            transfer.write_function(|data| {
                buffer_response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = handle.response_code()?;
        logvbln!("{} -> {} ({} bytes)", HttpClient::without_query(url), status, buffer_response.len());

        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }

        let body = std::str::from_utf8(&buffer_response)?;
        Ok(serde_json::from_str(body)?)
    }

    pub fn url_encode(text: &str) -> String {
        Easy::new().url_encode(text.as_bytes())
    }

    fn without_query(url: &str) -> &str {
        url.split('?').next().unwrap_or(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_text_is_percent_encoded() {
        assert_eq!(HttpClient::url_encode("Бутово 1&2"), "%D0%91%D1%83%D1%82%D0%BE%D0%B2%D0%BE%201%262");
    }

    #[test]
    fn keys_stay_out_of_log_labels() {
        assert_eq!(
            HttpClient::without_query("https://catalog.api.2gis.com/3.0/suggests?key=abc"),
            "https://catalog.api.2gis.com/3.0/suggests"
        );
    }
}

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{Error, PageFetcher, Result};
use reqwest::{Client, StatusCode};
use tracing::debug;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// reqwest-backed page fetcher. Redirects are followed by the client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
        url::Url::parse(url)?;
        self.client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("{} after {:?}", url, timeout))
                } else {
                    Error::Http(e)
                }
            })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self.send(url, timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Extraction(format!("Failed to download page: HTTP {}", status)));
        }
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("{} after {:?}", url, timeout))
            } else {
                Error::Http(e)
            }
        })?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.send(url, timeout).await?;
        if response.status() != StatusCode::OK {
            return Err(Error::Feed(format!(
                "Following {} ended with HTTP {}",
                url,
                response.status()
            )));
        }
        Ok(response.url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/articles/abc"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/news/story", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let resolved = fetcher
            .resolve(&format!("{}/rss/articles/abc", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(resolved, format!("{}/news/story", server.uri()));
    }

    #[tokio::test]
    async fn test_resolve_requires_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .resolve(&format!("{}/gone", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Feed(_)));
    }

    #[tokio::test]
    async fn test_get_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .get(&format!("{}/slow", server.uri()), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_get_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .get(&format!("{}/broken", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.get("not a url", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}

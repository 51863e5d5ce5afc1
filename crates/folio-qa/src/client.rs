//! HTTP client for the QA endpoint

use async_trait::async_trait;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::{
    error::{Error, Result},
    types::QaRequest,
};

/// Raw body chunks of a streamed answer
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Anything that can open a streamed answer for a question
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Issue the request and hand back the body as it arrives.
    ///
    /// Fails before any chunk is produced when the request cannot be sent
    /// or the endpoint answers with a non-success status.
    async fn open(&self, request: &QaRequest) -> Result<ByteStream>;
}

/// QA endpoint client
pub struct QaClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl QaClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got {:?}",
                endpoint
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: None,
        })
    }

    /// Send a bearer token with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QaBackend for QaClient {
    async fn open(&self, request: &QaRequest) -> Result<ByteStream> {
        tracing::debug!(
            endpoint = %self.endpoint,
            history = request.history.len(),
            "opening QA stream"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("accept", "text/event-stream")
            .json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(Error::from));
        Ok(Box::pin(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(matches!(
            QaClient::new("ftp://example.com/qa"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(QaClient::new("").is_err());
    }

    #[test]
    fn test_accepts_http_endpoint() {
        let client = QaClient::new("http://127.0.0.1:8777/api/qanything")
            .unwrap()
            .with_api_key("secret");
        assert_eq!(client.endpoint(), "http://127.0.0.1:8777/api/qanything");
    }

    #[tokio::test]
    async fn test_connection_failure_is_http_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let client = QaClient::new("http://127.0.0.1:9/qa").unwrap();
        let result = client.open(&QaRequest::new("hi", vec![])).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}

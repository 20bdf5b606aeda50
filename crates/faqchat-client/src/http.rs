use std::time::Duration;

use async_trait::async_trait;
use faqchat_schema::{CatalogEntry, QueryResult, ServiceInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CatalogQuery, FaqApi, TransportError};

#[derive(Debug, Serialize)]
struct ChatQueryBody<'a> {
    message: &'a str,
}

/// `FaqApi` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpFaqClient {
    client: reqwest::Client,
    api_base: String,
}

impl HttpFaqClient {
    /// Client without a request timeout.
    pub fn new(api_base: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(api_base, None)
    }

    pub fn with_timeout(
        api_base: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        url::Url::parse(&api_base).map_err(|source| TransportError::InvalidBaseUrl {
            url: api_base.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, TransportError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status { status });
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl FaqApi for HttpFaqClient {
    async fn submit_query(&self, text: &str) -> Result<QueryResult, TransportError> {
        let url = self.endpoint("/api/chat/query");
        let message = text.trim();
        tracing::debug!(%url, chars = message.chars().count(), "submitting chat query");

        let resp = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&ChatQueryBody { message })
            .send()
            .await?;

        let result: QueryResult = Self::decode(resp).await?;
        tracing::debug!(intent = ?result.intent, confidence = result.confidence, "chat query answered");
        Ok(result)
    }

    async fn search_catalog_page(
        &self,
        query: &CatalogQuery,
    ) -> Result<Vec<CatalogEntry>, TransportError> {
        let url = self.endpoint("/api/faq");
        let params = query.params();
        tracing::debug!(%url, ?params, "listing catalog");

        let resp = self.client.get(url).query(&params).send().await?;
        Self::decode(resp).await
    }

    async fn health(&self) -> Result<ServiceInfo, TransportError> {
        let resp = self.client.get(self.endpoint("/")).send().await?;
        Self::decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpFaqClient::new("http://localhost:8000///").unwrap();
        assert_eq!(client.api_base(), "http://localhost:8000");
        assert_eq!(
            client.endpoint("/api/faq"),
            "http://localhost:8000/api/faq"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        let err = HttpFaqClient::new("not a url").unwrap_err();
        assert!(matches!(err, TransportError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn accepts_timeout() {
        let client =
            HttpFaqClient::with_timeout("https://faq.example.com", Some(Duration::from_secs(5)));
        assert!(client.is_ok());
    }
}

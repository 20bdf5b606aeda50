//! Transport boundary between the chat widget and the remote FAQ service.
//!
//! Every call is a single independent round trip: no caching, retries,
//! deduplication or cancellation.

pub mod error;
pub mod http;
pub mod query;

use async_trait::async_trait;
use faqchat_schema::{CatalogEntry, QueryResult, ServiceInfo};

pub use error::TransportError;
pub use http::HttpFaqClient;
pub use query::CatalogQuery;

#[async_trait]
pub trait FaqApi: Send + Sync {
    /// Asks the service a free-text question. The text is sent trimmed.
    async fn submit_query(&self, text: &str) -> Result<QueryResult, TransportError>;

    async fn search_catalog_page(
        &self,
        query: &CatalogQuery,
    ) -> Result<Vec<CatalogEntry>, TransportError>;

    /// Lists the catalog, filtered server-side when `term` is non-empty.
    async fn search_catalog(&self, term: &str) -> Result<Vec<CatalogEntry>, TransportError> {
        self.search_catalog_page(&CatalogQuery::search(term)).await
    }

    async fn health(&self) -> Result<ServiceInfo, TransportError>;
}

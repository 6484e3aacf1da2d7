//! Where the operator document comes from.

use crate::error::GraphError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Result of fetching a document
pub type FetchResult = Result<String, GraphError>;

/// Capability that retrieves an HTML document by URL
pub trait DocumentSource: Send + Sync {
    /// Fetch the body of `url`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Fetch`] when the request or body read fails and
    /// [`GraphError::Status`] for non-success responses.
    fn fetch(&self, url: &str) -> Pin<Box<dyn Future<Output = FetchResult> + Send>>;
}

/// Fetches documents over HTTP(S)
#[derive(Clone, Debug)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
}

impl HttpDocumentSource {
    /// Creates a source whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Fetch`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, GraphError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("operators-graph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GraphError::Fetch {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Creates an Arc-wrapped instance for sharing
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Fetch`] if the HTTP client cannot be built.
    pub fn shared(timeout: Duration) -> Result<Arc<dyn DocumentSource>, GraphError> {
        Ok(Arc::new(Self::new(timeout)?))
    }
}

impl DocumentSource for HttpDocumentSource {
    fn fetch(&self, url: &str) -> Pin<Box<dyn Future<Output = FetchResult> + Send>> {
        let client = self.client.clone();
        let url = url.to_string();

        Box::pin(async move {
            tracing::info!(%url, "Fetching document");

            let fetch_error = |e: reqwest::Error| GraphError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            };

            let response = client.get(&url).send().await.map_err(fetch_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(GraphError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }

            let body = response.text().await.map_err(fetch_error)?;
            tracing::debug!(%url, bytes = body.len(), "Document fetched");
            Ok(body)
        })
    }
}

/// Serves one fixed document (or one fixed failure) for every URL
#[derive(Clone, Debug)]
pub struct StaticDocumentSource {
    response: FetchResult,
}

impl StaticDocumentSource {
    /// Source that always returns `html`
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            response: Ok(html.into()),
        }
    }

    /// Source that always fails with `error`
    #[must_use]
    pub const fn failing(error: GraphError) -> Self {
        Self {
            response: Err(error),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn DocumentSource> {
        Arc::new(self)
    }
}

impl DocumentSource for StaticDocumentSource {
    fn fetch(&self, url: &str) -> Pin<Box<dyn Future<Output = FetchResult> + Send>> {
        tracing::debug!(%url, "Serving static document");
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

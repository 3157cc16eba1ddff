//! Dify dataset API client
//!
//! Provides a typed HTTP client for the Dify knowledge-base ("dataset") API.
//! Handles the bearer header, JSON bodies, pagination and the mapping of
//! failures onto [`RemoteError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use difysync_dify::client::DifyClient;
//!
//! # async fn example() -> Result<(), difysync_core::ports::RemoteError> {
//! let client = DifyClient::new("http://localhost", "dataset-xxxx");
//! for dataset in client.list_datasets().await? {
//!     println!("{} {}", dataset.id, dataset.name);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use difysync_core::ports::RemoteError;

/// Page size used when none is configured
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

// ============================================================================
// Dify API request/response types
// ============================================================================

/// A dataset as returned by `GET /v1/datasets`
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetResponse {
    pub id: String,
    pub name: String,
}

/// A document as returned by `GET /v1/datasets/{id}/documents`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
}

/// One page of a list endpoint
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CreateDatasetRequest<'a> {
    name: &'a str,
    permission: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateDatasetResponse {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProcessRule {
    mode: &'static str,
}

const AUTOMATIC: ProcessRule = ProcessRule { mode: "automatic" };

#[derive(Debug, Serialize)]
struct CreateDocumentRequest<'a> {
    name: &'a str,
    text: &'a str,
    indexing_technique: &'a str,
    process_rule: ProcessRule,
}

#[derive(Debug, Serialize)]
struct UpdateDocumentRequest<'a> {
    name: &'a str,
    text: &'a str,
    process_rule: ProcessRule,
}

/// Create-by-text responses nest the document; some versions also echo a top-level `id`
#[derive(Debug, Deserialize)]
struct CreateDocumentResponse {
    document: Option<CreateDocumentInner>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateDocumentInner {
    id: Option<String>,
}

impl CreateDocumentResponse {
    fn into_id(self) -> Option<String> {
        self.document.and_then(|d| d.id).or(self.id)
    }
}

// ============================================================================
// DifyClient
// ============================================================================

/// HTTP client for the Dify dataset API
///
/// Wraps `reqwest::Client` with the API key and base URL. Every request
/// carries `Authorization: Bearer <api_key>`.
#[derive(Debug, Clone)]
pub struct DifyClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_limit: u32,
}

impl DifyClient {
    /// Creates a client for the deployment at `base_url` (without `/v1`)
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Sets the page size used by the list endpoints
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Creates an authenticated request builder for `path` (e.g. "/v1/datasets")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url).bearer_auth(&self.api_key)
    }

    /// Sends a request and rejects non-2xx responses
    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!(%url, status = status.as_u16(), "Request rejected");
        Err(RemoteError::Status {
            status: status.as_u16(),
            url,
            body,
        })
    }

    /// Sends a request and decodes its JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(builder).await?;
        let url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::Decode(format!("invalid response from {url}: {e}")))
    }

    /// Lists every dataset, following pagination
    ///
    /// Stops at a short page, at `has_more: false`, or once `total`
    /// datasets have been collected.
    #[tracing::instrument(skip(self))]
    pub async fn list_datasets(&self) -> Result<Vec<DatasetResponse>, RemoteError> {
        let limit = self.page_limit;
        let mut datasets = Vec::new();
        let mut page = 1u32;

        loop {
            let result: Page<DatasetResponse> = self
                .send_json(
                    self.request(Method::GET, "/v1/datasets")
                        .query(&[("page", page), ("limit", limit)]),
                )
                .await?;

            let received = result.data.len();
            datasets.extend(result.data);
            debug!(page, received, collected = datasets.len(), "Fetched dataset page");

            let short_page = received < limit as usize;
            let no_more = result.has_more == Some(false);
            let reached_total = result
                .total
                .is_some_and(|total| datasets.len() as u64 >= total);
            if short_page || no_more || reached_total {
                break;
            }
            page += 1;
        }

        Ok(datasets)
    }

    /// Creates a dataset and returns its ID
    #[tracing::instrument(skip(self))]
    pub async fn create_dataset(
        &self,
        name: &str,
        permission: &str,
    ) -> Result<String, RemoteError> {
        let result: CreateDatasetResponse = self
            .send_json(
                self.request(Method::POST, "/v1/datasets")
                    .json(&CreateDatasetRequest { name, permission }),
            )
            .await?;

        result
            .id
            .ok_or_else(|| RemoteError::Decode(format!("dataset '{name}' created without an id")))
    }

    /// Lists every document of a dataset, following `has_more`
    #[tracing::instrument(skip(self))]
    pub async fn list_documents(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<DocumentResponse>, RemoteError> {
        let path = format!("/v1/datasets/{dataset_id}/documents");
        let limit = self.page_limit;
        let mut documents = Vec::new();
        let mut page = 1u32;

        loop {
            let result: Page<DocumentResponse> = self
                .send_json(
                    self.request(Method::GET, &path)
                        .query(&[("page", page), ("limit", limit)]),
                )
                .await?;

            let received = result.data.len();
            documents.extend(result.data);
            if received == 0 || result.has_more != Some(true) {
                break;
            }
            page += 1;
        }

        debug!(count = documents.len(), "Fetched documents");
        Ok(documents)
    }

    /// Creates a document from text and returns its ID
    #[tracing::instrument(skip(self, text), fields(bytes = text.len()))]
    pub async fn create_document_by_text(
        &self,
        dataset_id: &str,
        name: &str,
        text: &str,
        indexing_technique: &str,
    ) -> Result<String, RemoteError> {
        let path = format!("/v1/datasets/{dataset_id}/document/create-by-text");
        let result: CreateDocumentResponse = self
            .send_json(
                self.request(Method::POST, &path)
                    .json(&CreateDocumentRequest {
                        name,
                        text,
                        indexing_technique,
                        process_rule: AUTOMATIC,
                    }),
            )
            .await?;

        result.into_id().ok_or_else(|| {
            RemoteError::Decode(format!("document '{name}' created without an id"))
        })
    }

    /// Replaces the name and text of a document
    #[tracing::instrument(skip(self, text), fields(bytes = text.len()))]
    pub async fn update_document_by_text(
        &self,
        dataset_id: &str,
        document_id: &str,
        name: &str,
        text: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("/v1/datasets/{dataset_id}/documents/{document_id}/update-by-text");
        self.send(
            self.request(Method::POST, &path)
                .json(&UpdateDocumentRequest {
                    name,
                    text,
                    process_rule: AUTOMATIC,
                }),
        )
        .await?;
        Ok(())
    }

    /// Deletes a document
    #[tracing::instrument(skip(self))]
    pub async fn delete_document(
        &self,
        dataset_id: &str,
        document_id: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("/v1/datasets/{dataset_id}/documents/{document_id}");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

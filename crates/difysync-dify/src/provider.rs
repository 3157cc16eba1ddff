//! DifyRemoteDirectory - RemoteDirectory implementation for the Dify API
//!
//! Wraps the [`DifyClient`] and converts its string IDs into the validated
//! domain newtypes. Datasets play the role of collections.
//!
//! ## Design Notes
//!
//! - Dataset permission and indexing technique come from configuration and
//!   are applied to every collection and document this adapter creates.
//! - An ID the service returns that fails newtype validation is reported as
//!   [`RemoteError::Decode`].

use async_trait::async_trait;
use tracing::debug;

use difysync_core::config::DifyConfig;
use difysync_core::domain::{Collection, CollectionId, DocumentId, RemoteDocument};
use difysync_core::ports::{RemoteDirectory, RemoteError};

use crate::client::DifyClient;

/// Default permission for created datasets
pub const DEFAULT_PERMISSION: &str = "only_me";

/// Default indexing technique for created documents
pub const DEFAULT_INDEXING_TECHNIQUE: &str = "high_quality";

/// [`RemoteDirectory`] backed by a Dify deployment
#[derive(Debug, Clone)]
pub struct DifyRemoteDirectory {
    client: DifyClient,
    dataset_permission: String,
    indexing_technique: String,
}

impl DifyRemoteDirectory {
    pub fn new(client: DifyClient) -> Self {
        Self {
            client,
            dataset_permission: DEFAULT_PERMISSION.to_string(),
            indexing_technique: DEFAULT_INDEXING_TECHNIQUE.to_string(),
        }
    }

    /// Builds the client and adapter from the `dify` configuration section
    pub fn from_config(config: &DifyConfig) -> Self {
        let client = DifyClient::new(&config.base_url, &config.api_key)
            .with_page_limit(config.page_limit);
        Self {
            client,
            dataset_permission: config.dataset_permission.clone(),
            indexing_technique: config.indexing_technique.clone(),
        }
    }

    pub fn with_dataset_permission(mut self, permission: impl Into<String>) -> Self {
        self.dataset_permission = permission.into();
        self
    }

    pub fn client(&self) -> &DifyClient {
        &self.client
    }
}

fn parse_collection_id(raw: String) -> Result<CollectionId, RemoteError> {
    CollectionId::new(raw).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn parse_document_id(raw: String) -> Result<DocumentId, RemoteError> {
    DocumentId::new(raw).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteDirectory for DifyRemoteDirectory {
    async fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
        let datasets = self.client.list_datasets().await?;
        debug!(count = datasets.len(), "Listed datasets");
        datasets
            .into_iter()
            .map(|d| Ok(Collection::new(parse_collection_id(d.id)?, d.name)))
            .collect()
    }

    async fn create_collection(&self, name: &str) -> Result<CollectionId, RemoteError> {
        let id = self
            .client
            .create_dataset(name, &self.dataset_permission)
            .await?;
        parse_collection_id(id)
    }

    async fn list_documents(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Vec<RemoteDocument>, RemoteError> {
        self.client
            .list_documents(collection_id.as_str())
            .await?
            .into_iter()
            .map(|d| Ok(RemoteDocument::new(parse_document_id(d.id)?, d.name)))
            .collect()
    }

    async fn create_document(
        &self,
        collection_id: &CollectionId,
        name: &str,
        content: &str,
    ) -> Result<DocumentId, RemoteError> {
        let id = self
            .client
            .create_document_by_text(
                collection_id.as_str(),
                name,
                content,
                &self.indexing_technique,
            )
            .await?;
        parse_document_id(id)
    }

    async fn update_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
        name: &str,
        content: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .update_document_by_text(collection_id.as_str(), document_id.as_str(), name, content)
            .await
    }

    async fn delete_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
    ) -> Result<(), RemoteError> {
        self.client
            .delete_document(collection_id.as_str(), document_id.as_str())
            .await
    }
}

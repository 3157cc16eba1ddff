//! In-memory [`RemoteDirectory`] used by the engine and scheduler tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use difysync_core::domain::{Collection, CollectionId, DocumentId, RemoteDocument};
use difysync_core::ports::{RemoteDirectory, RemoteError};

/// A remote call as observed by [`FakeRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListCollections,
    CreateCollection(String),
    ListDocuments(CollectionId),
    CreateDocument {
        collection: CollectionId,
        name: String,
        content: String,
    },
    UpdateDocument {
        collection: CollectionId,
        document: DocumentId,
        name: String,
        content: String,
    },
    DeleteDocument {
        collection: CollectionId,
        document: DocumentId,
    },
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub name: String,
    pub content: String,
}

#[derive(Default)]
struct State {
    collections: Vec<Collection>,
    documents: HashMap<CollectionId, Vec<StoredDocument>>,
    calls: Vec<Call>,
    next_id: u32,
    fail_list_collections: bool,
    fail_create_collection: bool,
    fail_list_documents: bool,
    fail_create_document: bool,
    fail_update_document: bool,
    fail_delete: bool,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

fn injected() -> RemoteError {
    RemoteError::Status {
        status: 500,
        url: "http://fake/v1".to_string(),
        body: "injected failure".to_string(),
    }
}

/// Records every call and keeps collections and documents in memory
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<State>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection as if it had been created out-of-band
    pub fn seed_collection(&self, name: &str) -> CollectionId {
        let mut state = self.state.lock().unwrap();
        let id = CollectionId::new(state.next_id("ds")).unwrap();
        state.collections.push(Collection::new(id.clone(), name));
        id
    }

    /// Adds a document as if it had been created out-of-band
    pub fn seed_document(&self, collection: &CollectionId, name: &str) -> DocumentId {
        let mut state = self.state.lock().unwrap();
        let id = DocumentId::new(state.next_id("doc")).unwrap();
        state
            .documents
            .entry(collection.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                name: name.to_string(),
                content: String::new(),
            });
        id
    }

    pub fn set_fail_list_collections(&self, fail: bool) {
        self.state.lock().unwrap().fail_list_collections = fail;
    }

    pub fn set_fail_create_collection(&self, fail: bool) {
        self.state.lock().unwrap().fail_create_collection = fail;
    }

    pub fn set_fail_list_documents(&self, fail: bool) {
        self.state.lock().unwrap().fail_list_documents = fail;
    }

    pub fn set_fail_create_document(&self, fail: bool) {
        self.state.lock().unwrap().fail_create_document = fail;
    }

    pub fn set_fail_update_document(&self, fail: bool) {
        self.state.lock().unwrap().fail_update_document = fail;
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .collections
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn collection_id(&self, name: &str) -> Option<CollectionId> {
        self.state
            .lock()
            .unwrap()
            .collections
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id.clone())
    }

    /// Documents stored in the collection called `name`
    pub fn documents_in(&self, name: &str) -> Vec<StoredDocument> {
        let Some(id) = self.collection_id(name) else {
            return Vec::new();
        };
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteDirectory for FakeRemote {
    async fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListCollections);
        if state.fail_list_collections {
            return Err(injected());
        }
        Ok(state.collections.clone())
    }

    async fn create_collection(&self, name: &str) -> Result<CollectionId, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateCollection(name.to_string()));
        if state.fail_create_collection {
            return Err(injected());
        }
        let id = CollectionId::new(state.next_id("ds")).unwrap();
        state.collections.push(Collection::new(id.clone(), name));
        Ok(id)
    }

    async fn list_documents(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Vec<RemoteDocument>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListDocuments(collection_id.clone()));
        if state.fail_list_documents {
            return Err(injected());
        }
        Ok(state
            .documents
            .get(collection_id)
            .map(|docs| {
                docs.iter()
                    .map(|d| RemoteDocument::new(d.id.clone(), d.name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_document(
        &self,
        collection_id: &CollectionId,
        name: &str,
        content: &str,
    ) -> Result<DocumentId, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateDocument {
            collection: collection_id.clone(),
            name: name.to_string(),
            content: content.to_string(),
        });
        if state.fail_create_document {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        let id = DocumentId::new(state.next_id("doc")).unwrap();
        state
            .documents
            .entry(collection_id.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                name: name.to_string(),
                content: content.to_string(),
            });
        Ok(id)
    }

    async fn update_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
        name: &str,
        content: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateDocument {
            collection: collection_id.clone(),
            document: document_id.clone(),
            name: name.to_string(),
            content: content.to_string(),
        });
        if state.fail_update_document {
            return Err(injected());
        }
        let doc = state
            .documents
            .get_mut(collection_id)
            .and_then(|docs| docs.iter_mut().find(|d| &d.id == document_id))
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                url: format!("http://fake/v1/datasets/{collection_id}/documents/{document_id}"),
                body: "document not found".to_string(),
            })?;
        doc.name = name.to_string();
        doc.content = content.to_string();
        Ok(())
    }

    async fn delete_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteDocument {
            collection: collection_id.clone(),
            document: document_id.clone(),
        });
        if state.fail_delete {
            return Err(injected());
        }
        if let Some(docs) = state.documents.get_mut(collection_id) {
            docs.retain(|d| &d.id != document_id);
        }
        Ok(())
    }
}

//! Repository layer: ports to the document store and the identity provider

pub mod credentials;
pub mod firestore;
pub mod identity;
pub mod memory;
#[cfg(test)]
mod stub;
pub mod value;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config::{FirebaseConfig, StoreConfig},
    models::{Document, Fields},
};

/// Length of store-generated document ids
pub const AUTO_ID_LENGTH: usize = 20;

/// Errors raised by store and identity adapters
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("credential error: {0}")]
    Credentials(String),

    #[error("malformed store payload: {0}")]
    Decode(String),

    #[error("identity provider error: {0}")]
    Identity(String),

    #[error("invalid store configuration: {0}")]
    Configuration(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Schemaless document collections addressed by string ids
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, in the store's default (id) order
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// A single document, `None` when absent
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Insert under a fresh store-generated id and return it
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Create or fully overwrite the document at `id`
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Overlay `fields` onto the document at `id`, creating it if absent
    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Remove the document at `id`; removing a missing document succeeds
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Authentication principals (email + password credentials)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provision a principal and return its id
    async fn create_principal(&self, email: &str, password: &str) -> StoreResult<String>;

    async fn delete_principal(&self, id: &str) -> StoreResult<()>;
}

/// Main repository struct holding both external collaborators
#[derive(Clone)]
pub struct Repository {
    pub documents: Arc<dyn DocumentStore>,
    pub identities: Arc<dyn IdentityProvider>,
}

impl Repository {
    pub fn new(documents: Arc<dyn DocumentStore>, identities: Arc<dyn IdentityProvider>) -> Self {
        Self {
            documents,
            identities,
        }
    }

    /// Repository backed by process-local maps
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(memory::MemoryStore::new()),
            Arc::new(memory::MemoryIdentity::new()),
        )
    }

    /// Repository backed by Firestore and Firebase Authentication
    pub fn firestore(store: &StoreConfig, firebase: &FirebaseConfig) -> StoreResult<Self> {
        let project_id = firebase
            .project_id
            .clone()
            .ok_or_else(|| StoreError::Credentials("missing firebase.project_id".to_string()))?;

        let http = reqwest::Client::new();
        let tokens = Arc::new(if store.emulator {
            credentials::TokenSource::emulator()
        } else {
            credentials::TokenSource::service_account(http.clone(), firebase)?
        });

        let documents = firestore::FirestoreStore::new(
            http.clone(),
            &store.firestore_url,
            &project_id,
            &store.database,
            tokens.clone(),
        )?;
        let identities =
            identity::FirebaseIdentity::new(http, &store.identity_url, &project_id, tokens)?;

        Ok(Self::new(Arc::new(documents), Arc::new(identities)))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Turn a non-2xx Google API response into `StoreError::Rejected`
pub(crate) async fn ensure_success(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn join_url(base: &Url, segments: &[&str]) -> StoreResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::Configuration(format!("cannot use {} as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn parse_base_url(raw: &str) -> StoreResult<Url> {
    Url::parse(raw).map_err(|e| StoreError::Configuration(format!("invalid URL {:?}: {}", raw, e)))
}

/// Random alphanumeric id in the same shape Firestore clients generate
pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

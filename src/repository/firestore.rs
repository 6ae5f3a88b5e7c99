//! Firestore REST adapter for the document store port

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{
    auto_id,
    credentials::TokenSource,
    ensure_success, join_url, parse_base_url,
    value::{decode_fields, encode_fields, field_paths},
    DocumentStore, StoreError, StoreResult,
};
use crate::models::{Document, Fields};

const PAGE_SIZE: &str = "300";

/// Document resource as returned by the REST API
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

impl RawDocument {
    fn into_document(self) -> StoreResult<Document> {
        let id = document_id(&self.name)
            .ok_or_else(|| StoreError::Decode(format!("bad document name {:?}", self.name)))?;
        Ok(Document {
            id: id.to_string(),
            data: decode_fields(&self.fields)?,
        })
    }
}

/// Last segment of a fully-qualified document name
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

pub struct FirestoreStore {
    http: reqwest::Client,
    /// `{base}/projects/{project}/databases/{database}`
    database_url: Url,
    /// `projects/{project}/databases/{database}`, used in request bodies
    database_name: String,
    tokens: Arc<TokenSource>,
}

impl FirestoreStore {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project_id: &str,
        database: &str,
        tokens: Arc<TokenSource>,
    ) -> StoreResult<Self> {
        let base = parse_base_url(base_url)?;
        let database_url = join_url(&base, &["projects", project_id, "databases", database])?;

        Ok(Self {
            http,
            database_url,
            database_name: format!("projects/{}/databases/{}", project_id, database),
            tokens,
        })
    }

    fn collection_url(&self, collection: &str) -> StoreResult<Url> {
        join_url(&self.database_url, &["documents", collection])
    }

    fn document_url(&self, collection: &str, id: &str) -> StoreResult<Url> {
        join_url(&self.database_url, &["documents", collection, id])
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_name, collection, id)
    }

    async fn request(&self, method: reqwest::Method, url: Url) -> StoreResult<reqwest::RequestBuilder> {
        let token = self.tokens.bearer().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let url = self.collection_url(collection)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .request(reqwest::Method::GET, url.clone())
                .await?
                .query(&query)
                .send()
                .await?;
            let page: ListDocumentsResponse = ensure_success(response).await?.json().await?;

            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let url = self.document_url(collection, id)?;
        let response = self.request(reqwest::Method::GET, url).await?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let raw: RawDocument = ensure_success(response).await?.json().await?;
        raw.into_document().map(Some)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = auto_id();
        let url = self.collection_url(collection)?;

        let response = self
            .request(reqwest::Method::POST, url)
            .await?
            .query(&[("documentId", id.as_str())])
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        ensure_success(response).await?;

        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        // PATCH without an update mask replaces the whole document
        let url = self.document_url(collection, id)?;
        let response = self
            .request(reqwest::Method::PATCH, url)
            .await?
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        // An explicit (possibly empty) mask keeps untouched fields in place
        let url = join_url(&self.database_url, &["documents:commit"])?;
        let body = json!({
            "writes": [{
                "update": {
                    "name": self.document_name(collection, id),
                    "fields": encode_fields(&fields),
                },
                "updateMask": { "fieldPaths": field_paths(&fields) },
            }]
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .await?
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let url = self.document_url(collection, id)?;
        let response = self.request(reqwest::Method::DELETE, url).await?.send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

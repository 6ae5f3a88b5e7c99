//! Firebase Authentication (Identity Toolkit REST) adapter

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    credentials::TokenSource, ensure_success, join_url, parse_base_url, IdentityProvider,
    StoreError, StoreResult,
};

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountResponse {
    local_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    local_id: &'a str,
}

pub struct FirebaseIdentity {
    http: reqwest::Client,
    /// `{base}/projects/{project}`
    project_url: Url,
    tokens: Arc<TokenSource>,
}

impl FirebaseIdentity {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project_id: &str,
        tokens: Arc<TokenSource>,
    ) -> StoreResult<Self> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http,
            project_url: join_url(&base, &["projects", project_id])?,
            tokens,
        })
    }

    fn accounts_url(&self, action: &str) -> StoreResult<Url> {
        join_url(&self.project_url, &[action])
    }
}

/// Identity Toolkit reports failures such as `EMAIL_EXISTS` in the message
fn identity_error(error: StoreError) -> StoreError {
    match error {
        StoreError::Rejected { message, .. } => StoreError::Identity(message),
        other => other,
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn create_principal(&self, email: &str, password: &str) -> StoreResult<String> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(self.accounts_url("accounts")?)
            .bearer_auth(token)
            .json(&CreateAccountRequest { email, password })
            .send()
            .await?;

        let created: CreateAccountResponse = ensure_success(response)
            .await
            .map_err(identity_error)?
            .json()
            .await?;

        tracing::info!("Provisioned authentication principal {}", created.local_id);
        Ok(created.local_id)
    }

    async fn delete_principal(&self, id: &str) -> StoreResult<()> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(self.accounts_url("accounts:delete")?)
            .bearer_auth(token)
            .json(&DeleteAccountRequest { local_id: id })
            .send()
            .await?;
        ensure_success(response).await.map_err(identity_error)?;

        tracing::info!("Deleted authentication principal {}", id);
        Ok(())
    }
}

//! OAuth access tokens for Google APIs, minted from a service account key

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{StoreError, StoreResult};
use crate::config::FirebaseConfig;

const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                      https://www.googleapis.com/auth/datastore \
                      https://www.googleapis.com/auth/identitytoolkit";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;
/// Token accepted by the Firebase emulators
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

struct ServiceAccount {
    http: reqwest::Client,
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    key: EncodingKey,
    cached: Mutex<Option<AccessToken>>,
}

enum Source {
    Fixed(String),
    ServiceAccount(Box<ServiceAccount>),
}

/// Hands out bearer tokens for store and identity requests
pub struct TokenSource {
    source: Source,
}

impl TokenSource {
    /// Tokens for the local Firebase emulators
    pub fn emulator() -> Self {
        Self {
            source: Source::Fixed(EMULATOR_TOKEN.to_string()),
        }
    }

    /// Tokens exchanged from a signed service account assertion
    pub fn service_account(http: reqwest::Client, firebase: &FirebaseConfig) -> StoreResult<Self> {
        let missing = |field: &str| StoreError::Credentials(format!("missing firebase.{}", field));

        let client_email = firebase.client_email.clone().ok_or_else(|| missing("client_email"))?;
        let token_uri = firebase.token_uri.clone().ok_or_else(|| missing("token_uri"))?;
        let pem = firebase.private_key.as_deref().ok_or_else(|| missing("private_key"))?;

        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("invalid private key: {}", e)))?;

        Ok(Self {
            source: Source::ServiceAccount(Box::new(ServiceAccount {
                http,
                client_email,
                token_uri,
                key_id: firebase.private_key_id.clone(),
                key,
                cached: Mutex::new(None),
            })),
        })
    }

    /// Current bearer token, refreshed when close to expiry
    pub async fn bearer(&self) -> StoreResult<String> {
        match &self.source {
            Source::Fixed(token) => Ok(token.clone()),
            Source::ServiceAccount(account) => account.bearer().await,
        }
    }
}

impl ServiceAccount {
    async fn bearer(&self) -> StoreResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let token = self.exchange(now).await?;
        tracing::debug!("Obtained access token valid until {}", token.expires_at);
        let bearer = token.token.clone();
        *cached = Some(token);
        Ok(bearer)
    }

    fn assertion(&self, now: DateTime<Utc>) -> StoreResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        encode(&header, &claims, &self.key)
            .map_err(|e| StoreError::Credentials(format!("failed to sign assertion: {}", e)))
    }

    async fn exchange(&self, now: DateTime<Utc>) -> StoreResult<AccessToken> {
        let assertion = self.assertion(now)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Credentials(format!(
                "token exchange rejected ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let body: TokenResponse = response.json().await?;
        Ok(AccessToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in),
        })
    }
}

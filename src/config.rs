//! Configuration management for the Biblioteca server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Which document store / identity provider pair backs the API
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Firestore,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the Firestore REST API (or emulator)
    pub firestore_url: String,
    /// Base URL of the Identity Toolkit REST API (or auth emulator)
    pub identity_url: String,
    pub database: String,
    /// Talk to the Firebase emulators: no OAuth exchange, fixed `owner` token
    pub emulator: bool,
}

/// Service account credentials, as found in a Firebase key file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FirebaseConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
    pub auth_provider_x509_cert_url: Option<String>,
    pub client_x509_cert_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
}

/// Legacy environment variables mapped onto `firebase.*` keys
const FIREBASE_ENV: &[(&str, &str)] = &[
    ("firebase.type", "FIREBASE_TYPE"),
    ("firebase.project_id", "FIREBASE_PROJECT_ID"),
    ("firebase.private_key_id", "FIREBASE_PRIVATE_KEY_ID"),
    ("firebase.private_key", "FIREBASE_PRIVATE_KEY"),
    ("firebase.client_email", "FIREBASE_CLIENT_EMAIL"),
    ("firebase.client_id", "FIREBASE_CLIENT_ID"),
    ("firebase.auth_uri", "FIREBASE_AUTH_URI"),
    ("firebase.token_uri", "FIREBASE_TOKEN_URI"),
    (
        "firebase.auth_provider_x509_cert_url",
        "FIREBASE_AUTH_PROVIDER_X509_CERT_URL",
    ),
    ("firebase.client_x509_cert_url", "FIREBASE_CLIENT_X509_CERT_URL"),
];

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. BIBLIOTECA__SERVER__PORT)
            .add_source(
                Environment::with_prefix("BIBLIOTECA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Plain PORT wins, as on most hosting platforms
            .set_override_option("server.port", non_empty_var("PORT"))?;

        for (key, var) in FIREBASE_ENV {
            builder = builder.set_override_option(*key, non_empty_var(var))?;
        }

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.firebase.normalize();
        Ok(config)
    }
}

/// Environment variable value, treating an empty one as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl FirebaseConfig {
    /// Key material pasted into an env var usually carries escaped newlines
    fn normalize(&mut self) {
        if let Some(key) = self.private_key.as_mut() {
            *key = key.replace("\\n", "\n");
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Firestore,
            firestore_url: "https://firestore.googleapis.com/v1".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            database: "(default)".to_string(),
            emulator: false,
        }
    }
}

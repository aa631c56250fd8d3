// ABOUTME: Google service-account authentication for the Sheets API
// ABOUTME: Signs an RS256 JWT bearer assertion and exchanges it for an access token

use anyhow::{bail, Context, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OAuth scope granting read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account JSON key file this crate needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// A bearer token returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid credentials file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).context("Failed to parse service account key")?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            bail!("Service account key is missing client_email or private_key");
        }
        Ok(key)
    }

    fn claims<'a>(&'a self, scope: &'a str, now: i64) -> Claims<'a> {
        Claims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign the JWT bearer assertion for `scope`.
    pub fn assertion(&self, scope: &str) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("Service account private_key is not a valid RSA PEM key")?;
        let claims = self.claims(scope, chrono::Utc::now().timestamp());
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .context("Failed to sign service account assertion")
    }

    /// Exchange a signed assertion for an access token.
    pub async fn fetch_access_token(
        &self,
        http: &reqwest::Client,
        scope: &str,
    ) -> Result<AccessToken> {
        let assertion = self.assertion(scope)?;

        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("Failed to reach Google OAuth token endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!(
                "Token exchange for {} failed with status {}: {}",
                self.client_email,
                status,
                body
            );
        }

        let token: AccessToken = response
            .json()
            .await
            .context("Failed to parse access token response")?;
        tracing::debug!(
            "Obtained Sheets access token for {} (expires in {}s)",
            self.client_email,
            token.expires_in
        );
        Ok(token)
    }
}

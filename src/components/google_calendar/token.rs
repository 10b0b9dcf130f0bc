use super::credentials::Credentials;
use crate::error::{credentials_error, google_calendar_error, BotResult};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Grant type for exchanging a signed JWT for an access token
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for the assertion, Google's maximum
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Exchanges service account credentials for OAuth access tokens
#[derive(Clone)]
pub struct TokenManager {
    credentials: Credentials,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, client: Client) -> Self {
        Self {
            credentials,
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token, reusing the cached one while it is still valid
    pub async fn get_token(&self) -> BotResult<String> {
        let now = Utc::now().timestamp();

        if let Some(token) = self.cached.read().await.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token(now).await?;
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);

        Ok(access_token)
    }

    /// Sign an assertion for the configured scopes
    fn signed_assertion(&self, now: i64) -> BotResult<String> {
        let claims = Claims {
            iss: self.credentials.client_email(),
            scope: self.credentials.scopes().join(" "),
            aud: self.credentials.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.credentials.key_id().map(str::to_string);

        encode(&header, &claims, self.credentials.encoding_key())
            .map_err(|e| credentials_error(&format!("Failed to sign token assertion: {}", e)))
    }

    async fn request_token(&self, now: i64) -> BotResult<CachedToken> {
        let assertion = self.signed_assertion(now)?;

        debug!(
            "Requesting access token for {} from {}",
            self.credentials.client_email(),
            self.credentials.token_uri()
        );

        let response = self
            .client
            .post(self.credentials.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to request token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to request token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        })
    }
}

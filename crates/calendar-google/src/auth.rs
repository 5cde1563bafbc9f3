//! Google OAuth2 credentials and access tokens.
//!
//! Two credential files are understood, told apart by their `"type"` field:
//!
//! - `service_account`: a signed RS256 JWT is exchanged for an access token
//!   (JWT bearer grant).
//! - `authorized_user`: a stored refresh token is exchanged for an access
//!   token (refresh token grant).
//!
//! Tokens are cached until shortly before they expire.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{CalendarError, Result};

/// OAuth2 scope for read/write calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Google's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for service account assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Contents of a Google credentials JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// A service account key.
    ServiceAccount {
        /// Account e-mail, used as JWT issuer.
        client_email: String,
        /// PEM-encoded RSA private key.
        private_key: String,
        /// Token endpoint.
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
    /// An end-user OAuth client with a stored refresh token.
    AuthorizedUser {
        /// OAuth client ID.
        client_id: String,
        /// OAuth client secret.
        client_secret: String,
        /// Long-lived refresh token.
        refresh_token: String,
        /// Token endpoint.
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
}

impl Credentials {
    /// Reads credentials from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::Credentials(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CalendarError::Credentials(e.to_string()))
    }

    fn token_uri(&self) -> &str {
        match self {
            Self::ServiceAccount { token_uri, .. } | Self::AuthorizedUser { token_uri, .. } => {
                token_uri
            }
        }
    }
}

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
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

enum TokenSource {
    Fixed(String),
    Credentials(Credentials),
}

/// Supplies bearer tokens for calendar requests.
pub struct TokenProvider {
    source: TokenSource,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Creates a provider that exchanges `credentials` for access tokens.
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            source: TokenSource::Credentials(credentials),
            http,
            cache: Mutex::new(None),
        }
    }

    /// Creates a provider that always returns `token`.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Fixed(token.into()),
            http: reqwest::Client::new(),
            cache: Mutex::new(None),
        }
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        let credentials = match &self.source {
            TokenSource::Fixed(token) => return Ok(token.clone()),
            TokenSource::Credentials(credentials) => credentials,
        };

        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let response = self.fetch(credentials).await?;
        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(3600));
        debug!(expires_in = lifetime.as_secs(), "Obtained access token");

        let token = CachedToken {
            value: response.access_token,
            expires_at: Instant::now() + lifetime,
        };
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }

    async fn fetch(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let token_uri = credentials.token_uri();
        let request = match credentials {
            Credentials::ServiceAccount {
                client_email,
                private_key,
                ..
            } => {
                let assertion = sign_assertion(client_email, private_key, token_uri)?;
                info!(client_email = %client_email, "Requesting service account token");
                self.http
                    .post(token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            }
            Credentials::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
                ..
            } => {
                info!("Refreshing user access token");
                self.http.post(token_uri).form(&[
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ])
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| CalendarError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| CalendarError::Auth(format!("invalid token response: {e}")))
    }
}

/// Signs a service account JWT assertion for the calendar scope.
fn sign_assertion(client_email: &str, private_key: &str, audience: &str) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| CalendarError::Credentials(format!("invalid private key: {e}")))?;

    let iat = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: client_email,
        scope: CALENDAR_SCOPE,
        aud: audience,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| CalendarError::Auth(format!("failed to sign assertion: {e}")))
}

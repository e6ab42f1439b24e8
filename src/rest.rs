use crate::client::{create_http_client, Config};
use crate::credentials::{ClientAuthMethod, ClientCredentials};
use crate::error::{ReckonError, Result};
use crate::models::{Book, Contact};
use crate::redirect::{get_following_redirects, RedirectPolicy};
use crate::token::{TokenGrant, TokenRequest, TokenResponse};
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, Error as _};
use std::time::{Duration, Instant};
use url::Url;

/// Client for the Reckon identity and API hosts.
///
/// Holds the authorization code, application credentials and redirect URI
/// given at construction, plus one HTTP client shared by every call. Nothing
/// changes after construction, so a `ReckonClient` can be cloned or shared
/// across threads freely. Tokens are returned to the caller and never kept.
#[derive(Clone)]
pub struct ReckonClient {
    http: Client,
    config: Config,
    credentials: ClientCredentials,
    store_code: String,
    redirect_uri: String,
}

impl ReckonClient {
    /// Create a client against the production hosts with a 30 second timeout.
    ///
    /// No request is made here.
    pub fn new(
        code: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(
            code,
            ClientCredentials::new(client_id, client_secret),
            redirect_uri,
            Config::default(),
        )
    }

    /// Create a client with custom configuration
    pub fn with_config(
        code: impl Into<String>,
        credentials: ClientCredentials,
        redirect_uri: impl Into<String>,
        config: Config,
    ) -> Result<Self> {
        Ok(ReckonClient {
            http: create_http_client(&config)?,
            config,
            credentials,
            store_code: code.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    /// Authorization code supplied at construction
    pub fn store_code(&self) -> &str {
        &self.store_code
    }

    /// Redirect URI registered for the application
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Application credentials
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Exchange the stored authorization code for an access token
    pub fn acquire_access_token(&self) -> Result<TokenGrant> {
        let request = TokenRequest::authorization_code(&self.store_code, &self.redirect_uri)
            .with_scope(self.config.scope.as_deref());
        self.exchange(request, "access token request")
    }

    /// Exchange a refresh token for a new access token
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let request = TokenRequest::refresh_token(refresh_token, &self.redirect_uri)
            .with_scope(self.config.scope.as_deref());
        self.exchange(request, "refresh token request")
    }

    /// List the cashbooks the token grants access to
    pub fn fetch_books(&self, token: &str) -> Result<Vec<Book>> {
        let url = self.config.api_endpoint(&["r1", "cashbooks"])?;
        self.get_json(url, token, "cashbooks request")
    }

    /// List the contacts of one cashbook
    pub fn fetch_contacts(&self, token: &str, book_id: &str) -> Result<Vec<Contact>> {
        if book_id.is_empty() {
            return Err(ReckonError::Configuration("book id must not be empty".to_string()));
        }
        let url = self.config.api_endpoint(&["r1", book_id, "contacts"])?;
        self.get_json(url, token, "contacts request")
    }

    /// Post a token request and turn a 200 response into a grant
    fn exchange(&self, request: TokenRequest, context: &'static str) -> Result<TokenGrant> {
        let url = self.config.token_url()?;

        tracing::debug!(endpoint = %url, grant_type = %request.grant_type, "requesting token");

        let mut builder = self.http.post(url);
        let request = match self.config.client_auth {
            ClientAuthMethod::BasicHeader => {
                builder = builder.header(AUTHORIZATION, sensitive(&self.credentials.basic_authorization())?);
                request
            }
            ClientAuthMethod::RequestBody => request.with_client_credentials(&self.credentials),
        };

        let start = Instant::now();
        let response = builder.form(&request).send()?;
        let status = response.status();
        let body = response.bytes()?;
        self.log_timing(context, status, start);

        if status != StatusCode::OK {
            tracing::warn!(
                status = status.as_u16(),
                body_len = body.len(),
                grant_type = %request.grant_type,
                "token endpoint rejected the request"
            );
            return Err(ReckonError::status(context, status, String::from_utf8_lossy(&body).to_string()));
        }

        let token: TokenResponse = serde_json::from_slice(&body)?;
        if token.access_token.is_empty() {
            return Err(ReckonError::Decode(serde_json::Error::custom(
                "token response has an empty access_token",
            )));
        }
        Ok(TokenGrant::from_response(token, self.config.expiry_unit, Utc::now()))
    }

    /// Bearer-authenticated GET returning a decoded JSON body
    fn get_json<T>(&self, url: Url, token: &str, context: &'static str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {}", token))?);

        let policy = RedirectPolicy {
            max_redirects: self.config.max_redirects,
            trusted_origins: &self.config.trusted_redirect_origins,
        };

        tracing::debug!(endpoint = %url, "requesting resource");

        let start = Instant::now();
        let response = get_following_redirects(&self.http, url, &headers, policy)?;
        let status = response.status();
        let body = response.bytes()?;
        self.log_timing(context, status, start);

        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), body_len = body.len(), "{} failed", context);
            return Err(ReckonError::status(context, status, String::from_utf8_lossy(&body).to_string()));
        }

        let records: Vec<T> = serde_json::from_slice(&body)?;
        tracing::debug!(count = records.len(), "{} decoded", context);
        Ok(records)
    }

    fn log_timing(&self, context: &str, status: StatusCode, start: Instant) {
        let elapsed_ms = elapsed_millis(start.elapsed());
        if self.config.debug {
            tracing::info!(status = status.as_u16(), elapsed_ms, "{}", context);
        } else {
            tracing::debug!(status = status.as_u16(), elapsed_ms, "{}", context);
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

// Implement Debug manually to keep the authorization code out of logs
impl std::fmt::Debug for ReckonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReckonClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("store_code", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Header value hidden from Debug output
fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        ReckonError::Configuration("credential contains characters not allowed in a header".to_string())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

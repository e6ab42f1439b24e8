use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::ClientCredentials;

/// Grant type for exchanging an authorization code
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";

/// Grant type for exchanging a refresh token
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// Form parameters posted to the token endpoint.
///
/// Fields serialize in declaration order and empty fields are left out, so an
/// authorization-code exchange encodes as
/// `grant_type=authorization_code&code=..&redirect_uri=..`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenRequest {
    pub grant_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Only set when the client authenticates in the form body
    /// ([`crate::credentials::ClientAuthMethod::RequestBody`]) instead of the Basic header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl TokenRequest {
    /// Request exchanging an authorization code
    pub fn authorization_code(code: &str, redirect_uri: &str) -> Self {
        TokenRequest {
            grant_type: GRANT_AUTHORIZATION_CODE.to_string(),
            code: Some(code.to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            ..Default::default()
        }
    }

    /// Request exchanging a refresh token
    pub fn refresh_token(refresh_token: &str, redirect_uri: &str) -> Self {
        TokenRequest {
            grant_type: GRANT_REFRESH_TOKEN.to_string(),
            refresh_token: Some(refresh_token.to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            ..Default::default()
        }
    }

    /// Set the requested scope
    pub fn with_scope(mut self, scope: Option<&str>) -> Self {
        self.scope = scope.map(|s| s.to_string());
        self
    }

    /// Carry the client credentials as form parameters
    pub fn with_client_credentials(mut self, credentials: &ClientCredentials) -> Self {
        self.client_id = Some(credentials.client_id.clone());
        self.client_secret = Some(credentials.client_secret().to_string());
        self
    }
}

/// Token endpoint response body.
///
/// `access_token` and `expires_in` are required; a refresh grant may omit
/// `refresh_token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    /// Lifetime of the access token, in the unit given by [`ExpiryUnit`]
    pub expires_in: i64,
}

/// Unit in which the token endpoint reports `expires_in`.
///
/// OAuth2 defines seconds. `Milliseconds` reproduces older integrations that
/// treated the value as milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl ExpiryUnit {
    /// Convert a raw `expires_in` value into a duration, `None` if out of range
    pub fn duration(self, expires_in: i64) -> Option<Duration> {
        match self {
            ExpiryUnit::Seconds => Duration::try_seconds(expires_in),
            ExpiryUnit::Milliseconds => Duration::try_milliseconds(expires_in),
        }
    }
}

/// Tokens issued by a successful exchange.
///
/// The caller owns storage and expiry tracking; the client never keeps them.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Raw `expires_in` as returned by the server
    pub expires_in: i64,
    /// Absolute expiry: time of receipt plus `expires_in`
    pub expires_at: DateTime<Utc>,
}

impl TokenGrant {
    /// Build a grant from a token response received at `received_at`
    pub fn from_response(response: TokenResponse, unit: ExpiryUnit, received_at: DateTime<Utc>) -> Self {
        let expires_at = unit
            .duration(response.expires_in)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        TokenGrant {
            expires_at,
            expires_in: response.expires_in,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }

    /// Check if the access token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Check if the access token expires within the given margin
    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now()
            .checked_add_signed(margin)
            .map_or(true, |deadline| deadline >= self.expires_at)
    }

    /// Check if we have a refresh token available
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_authorization_code_form() {
        let request = TokenRequest::authorization_code("abc123", "https://app.example/cb");
        let body = form_body(&request);
        assert_eq!(
            body,
            "grant_type=authorization_code&code=abc123&redirect_uri=https%3A%2F%2Fapp.example%2Fcb"
        );
    }

    #[test]
    fn test_refresh_token_form_with_scope() {
        let request = TokenRequest::refresh_token("r-1", "https://app.example/cb").with_scope(Some("read"));
        let body = form_body(&request);
        assert_eq!(
            body,
            "grant_type=refresh_token&refresh_token=r-1&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&scope=read"
        );
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":60}"#).unwrap();
        assert_eq!(response.access_token, "a");
        assert_eq!(response.refresh_token, "");
        assert_eq!(response.expires_in, 60);
    }

    #[test]
    fn test_token_response_requires_access_token_and_expiry() {
        assert!(serde_json::from_str::<TokenResponse>(r#"{"error":"x"}"#).is_err());
        assert!(serde_json::from_str::<TokenResponse>(r#"{"access_token":"a"}"#).is_err());
        assert!(serde_json::from_str::<TokenResponse>(r#"{"expires_in":60}"#).is_err());
    }

    #[test]
    fn test_client_credentials_in_form() {
        let credentials = ClientCredentials::new("client-1", "s e/cret");
        let request = TokenRequest::authorization_code("abc", "https://app.example/cb")
            .with_client_credentials(&credentials);
        assert_eq!(
            form_body(&request),
            "grant_type=authorization_code&code=abc&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&client_id=client-1&client_secret=s+e%2Fcret"
        );
    }

    #[test]
    fn test_grant_expiry_units() {
        let received = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let response = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 3600,
        };

        let seconds = TokenGrant::from_response(response.clone(), ExpiryUnit::Seconds, received);
        assert_eq!(seconds.expires_at, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());

        let millis = TokenGrant::from_response(response, ExpiryUnit::Milliseconds, received);
        assert_eq!(millis.expires_at, received + Duration::milliseconds(3600));
        assert_eq!(millis.expires_in, 3600);
    }

    #[test]
    fn test_grant_expiry_saturates() {
        let response = TokenResponse {
            expires_in: i64::MAX,
            ..Default::default()
        };
        let grant = TokenGrant::from_response(response, ExpiryUnit::Seconds, Utc::now());
        assert_eq!(grant.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_grant_expiry_checks() {
        let response = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: String::new(),
            expires_in: 600,
        };
        let grant = TokenGrant::from_response(response, ExpiryUnit::Seconds, Utc::now());
        assert!(!grant.is_expired());
        assert!(grant.expires_within(Duration::minutes(15)));
        assert!(!grant.has_refresh_token());
    }

    #[test]
    fn test_grant_debug_redacts_tokens() {
        let response = TokenResponse {
            access_token: "access-secret".to_string(),
            refresh_token: "refresh-secret".to_string(),
            expires_in: 60,
        };
        let grant = TokenGrant::from_response(response, ExpiryUnit::Seconds, Utc::now());
        let debug = format!("{:?}", grant);
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
    }

    fn form_body(request: &TokenRequest) -> String {
        let url = reqwest::Url::parse("http://localhost/").unwrap();
        let built = reqwest::blocking::Client::new()
            .post(url)
            .form(request)
            .build()
            .unwrap();
        let bytes = built.body().and_then(|b| b.as_bytes()).unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

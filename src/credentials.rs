use base64::{engine::general_purpose::STANDARD, Engine};

/// Where token requests carry the client credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
    /// `Authorization: Basic base64(client_id:client_secret)`
    #[default]
    BasicHeader,
    /// `client_id` and `client_secret` form parameters
    RequestBody,
}

/// OAuth2 client credentials issued by Reckon for an application.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Application client identifier
    pub client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Create credentials from a client ID and secret
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The client secret
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Value for the `Authorization` header of token requests:
    /// `Basic base64(client_id:client_secret)`
    pub fn basic_authorization(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

// Implement Debug manually to avoid exposing the client secret
impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

use crate::credentials::ClientAuthMethod;
use crate::error::Result;
use crate::token::ExpiryUnit;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// Identity host serving the OAuth2 token endpoint
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.reckon.com";

/// API host serving cashbooks and contacts
pub const DEFAULT_API_URL: &str = "https://api.reckon.com";

/// Default whole-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of redirect hops followed for resource requests
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Create the HTTP client shared by every call of a client.
///
/// Redirects are never followed by the HTTP layer itself; resource requests
/// walk them in [`crate::redirect`] so the Authorization header can be
/// handled explicitly.
pub fn create_http_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .build()?;
    Ok(client)
}

/// Configuration for the Reckon client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the identity host (token endpoint lives at `connect/token`)
    pub identity_url: String,
    /// Base URL of the API host (resources live under `r1/`)
    pub api_url: String,
    /// Timeout applied to every outbound request
    pub timeout: Duration,
    /// Unit the token endpoint uses for `expires_in`
    pub expiry_unit: ExpiryUnit,
    /// Maximum redirect hops followed by resource requests
    pub max_redirects: usize,
    /// Origins other than the request's own that may receive the Authorization header on redirect
    pub trusted_redirect_origins: Vec<Url>,
    /// Optional OAuth2 scope sent with token requests
    pub scope: Option<String>,
    /// How token requests authenticate the client
    pub client_auth: ClientAuthMethod,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            expiry_unit: ExpiryUnit::default(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            trusted_redirect_origins: Vec::new(),
            scope: None,
            client_auth: ClientAuthMethod::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Point token requests at another identity host
    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into();
        self
    }

    /// Point resource requests at another API host
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the unit used to interpret `expires_in`
    pub fn with_expiry_unit(mut self, unit: ExpiryUnit) -> Self {
        self.expiry_unit = unit;
        self
    }

    /// Set the redirect hop limit
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Allow the Authorization header to follow redirects to this origin
    pub fn trust_redirect_origin(mut self, origin: Url) -> Self {
        self.trusted_redirect_origins.push(origin);
        self
    }

    /// Request a scope with every token exchange
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Choose how token requests authenticate the client
    pub fn with_client_auth(mut self, method: ClientAuthMethod) -> Self {
        self.client_auth = method;
        self
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// URL of the token endpoint
    pub fn token_url(&self) -> Result<Url> {
        endpoint(&self.identity_url, &["connect", "token"])
    }

    /// URL of a resource under the API host, one segment per element
    pub fn api_endpoint(&self, segments: &[&str]) -> Result<Url> {
        endpoint(&self.api_url, segments)
    }
}

/// Append path segments to a base URL, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| crate::ReckonError::Configuration(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

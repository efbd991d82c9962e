//! Client configuration.
//!
//! Base URL and credentials are an explicit value handed to the client at
//! construction. There is no global state and nothing is mutated after
//! construction; a new token means a new `ClientConfig`.

use url::Url;

use crate::error::{ApiError, Result};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Query parameter carrying a legacy API key.
const API_KEY_PARAM: &str = "hapikey";

const ENV_BASE_URL: &str = "HUBSPOT_BASE_URL";
const ENV_ACCESS_TOKEN: &str = "HUBSPOT_ACCESS_TOKEN";
const ENV_API_KEY: &str = "HUBSPOT_API_KEY";

/// How requests are authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    /// Sent as the `hapikey` query parameter.
    ApiKey(String),
    /// Sent as an `authorization: Bearer` header.
    Bearer(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    auth: Auth,
}

impl ClientConfig {
    /// Creates a configuration for `base_url`. A trailing slash is ignored.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            auth: Auth::None,
        })
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        self.with_auth(Auth::ApiKey(key.into()))
    }

    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_auth(Auth::Bearer(token.into()))
    }

    /// Reads `HUBSPOT_BASE_URL`, `HUBSPOT_ACCESS_TOKEN` and `HUBSPOT_API_KEY`.
    /// An access token takes precedence over an API key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let auth = match (lookup(ENV_ACCESS_TOKEN), lookup(ENV_API_KEY)) {
            (Some(token), _) => Auth::Bearer(token),
            (None, Some(key)) => Auth::ApiKey(key),
            (None, None) => Auth::None,
        };
        Ok(Self::new(&base_url)?.with_auth(auth))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Builds an absolute URL from path segments and query pairs. Segments
    /// are percent-encoded; the API key, if any, is appended last.
    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        let api_key = match &self.auth {
            Auth::ApiKey(key) => Some(key.as_str()),
            _ => None,
        };
        if !query.is_empty() || api_key.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
            if let Some(key) = api_key {
                pairs.append_pair(API_KEY_PARAM, key);
            }
        }
        url.to_string()
    }

    pub(crate) fn auth_headers(&self) -> Vec<(String, String)> {
        match &self.auth {
            Auth::Bearer(token) => vec![("authorization".to_string(), format!("Bearer {token}"))],
            _ => Vec::new(),
        }
    }
}

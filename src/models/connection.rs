//! Connection parameters carried by every request to reach the emulator.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::AppError;

/// Where and as whom to reach the emulator.
///
/// Held by the caller and passed on every request; the proxy never caches it.
/// Missing JSON members default to empty so that [`validate`](Self::validate)
/// reports them instead of the body deserializer.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionParameters {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub force_path_style: bool,
}

impl std::fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl ConnectionParameters {
    /// Check the parameters before any client is built.
    ///
    /// Required fields are checked first, in declaration order, then the
    /// endpoint format. The first failure wins.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.endpoint.trim().is_empty() {
            return Err(AppError::required("Endpoint"));
        }
        if self.region.trim().is_empty() {
            return Err(AppError::required("Region"));
        }
        if self.access_key.trim().is_empty() {
            return Err(AppError::required("Access Key"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(AppError::required("Secret Key"));
        }

        match Url::parse(self.endpoint.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
            _ => Err(AppError::validation("Invalid endpoint URL format")),
        }
    }

    /// Endpoint with any trailing slash removed, for building derived URLs.
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

/// Query-string form of [`ConnectionParameters`] used by read and delete calls.
///
/// `forcePathStyle` is only true when it is literally `"true"`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionQuery {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub force_path_style: Option<String>,
}

impl From<ConnectionQuery> for ConnectionParameters {
    fn from(q: ConnectionQuery) -> Self {
        Self {
            endpoint: q.endpoint.unwrap_or_default(),
            region: q.region.unwrap_or_default(),
            access_key: q.access_key.unwrap_or_default(),
            secret_key: q.secret_key.unwrap_or_default(),
            force_path_style: q.force_path_style.as_deref() == Some("true"),
        }
    }
}

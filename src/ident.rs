//! Role identifier codec.
//!
//! Converts between storage-internal role ids and the public, URL-qualified
//! form `{base}/roles/{id}`. When no base URI is configured both directions
//! are the identity function.

use crate::config::HttpConfig;

#[derive(Debug, Clone)]
pub struct RoleIdCodec {
    base_url: String,
}

impl RoleIdCodec {
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            base_url: config.role_base_url(),
        }
    }

    /// Public form of an internal role id. The id segment is percent-encoded.
    pub fn encode(&self, id: &str) -> String {
        if self.base_url.is_empty() {
            id.to_string()
        } else {
            format!("{}/{}", self.base_url, urlencoding::encode(id))
        }
    }

    /// Internal form of a public role id: strips the configured prefix when
    /// present, otherwise returns the input unchanged. Percent-encoding is
    /// assumed already resolved by the request layer.
    pub fn decode<'a>(&self, id: &'a str) -> &'a str {
        if self.base_url.is_empty() {
            return id;
        }
        id.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(id)
    }
}

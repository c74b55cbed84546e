use crate::errors::AppError;

/// Base paths for the two route groups. Both are independently overridable.
#[derive(Debug, Clone)]
pub struct RoutePaths {
    pub permissions: String,
    pub roles: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            permissions: "/permissions".to_string(),
            roles: "/roles".to_string(),
        }
    }
}

/// HTTP configuration consumed at route-setup time. An empty `base_uri`
/// disables URL-qualification of role ids, yielding bare identifiers.
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    pub base_uri: String,
    pub routes: RoutePaths,
}

impl HttpConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let base_uri = std::env::var("BASE_URI").unwrap_or_default();
        if !base_uri.is_empty() && !base_uri.starts_with("http") {
            return Err(AppError::configuration(
                "BASE_URI must be an absolute http(s) URL or empty",
            ));
        }

        let defaults = RoutePaths::default();
        let routes = RoutePaths {
            permissions: std::env::var("PERMISSIONS_PATH").unwrap_or(defaults.permissions),
            roles: std::env::var("ROLES_PATH").unwrap_or(defaults.roles),
        };

        Ok(Self { base_uri, routes })
    }

    /// Fully-qualified prefix for public role ids, e.g.
    /// `https://example.org/roles`. Empty when no base URI is configured.
    pub fn role_base_url(&self) -> String {
        if self.base_uri.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.base_uri.trim_end_matches('/'), self.routes.roles)
        }
    }
}

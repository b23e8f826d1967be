//! Auth methods
//!
//! Each method declares the config keys it needs and prepares a request
//! in place from their resolved values.

use crate::config::{ConfigDeclaration, ConfigRegistry};
use crate::error::{Error, Result};
use crate::http::HttpRequest;
use crate::template::value_to_string;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key forcing a specific auth method
pub const ENFORCE_METHOD: &str = "brook.auth.enforce_method";
/// Value of [`ENFORCE_METHOD`] meaning "pick the first capable method"
pub const NO_ENFORCEMENT: &str = "NONE";
/// Basic auth username
pub const BASIC_USERNAME: &str = "brook.auth.basic.username";
/// Basic auth password
pub const BASIC_PASSWORD: &str = "brook.auth.basic.password";
/// Bearer token
pub const BEARER_TOKEN: &str = "brook.auth.bearer.token";

/// Authentication method attached to a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Auth {
    /// Requests are sent unchanged
    NoAuth,
    /// HTTP Basic authentication
    Basic,
    /// Bearer token in the Authorization header
    Bearer,
}

impl Auth {
    /// All methods, in enforcement-name order
    pub const ALL: [Auth; 3] = [Auth::NoAuth, Auth::Basic, Auth::Bearer];

    /// Name used for enforcement and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Auth::NoAuth => "NO_AUTH",
            Auth::Basic => "BASIC",
            Auth::Bearer => "BEARER",
        }
    }

    /// Config keys this method reads
    pub fn declarations(&self) -> Vec<ConfigDeclaration> {
        let credential = |key: &str| ConfigDeclaration::string(key).required(false);
        match self {
            Auth::NoAuth => Vec::new(),
            Auth::Basic => vec![credential(BASIC_USERNAME), credential(BASIC_PASSWORD)],
            Auth::Bearer => vec![credential(BEARER_TOKEN)],
        }
    }

    /// Authenticate a request in place
    ///
    /// Fails with `ConfigNotFound` when a credential is missing.
    pub fn prepare(&self, request: &mut HttpRequest, registry: &ConfigRegistry) -> Result<()> {
        match self {
            Auth::NoAuth => {}
            Auth::Basic => {
                let username = value_to_string(&registry.resolve_or_error(BASIC_USERNAME)?);
                let password = value_to_string(&registry.resolve_or_error(BASIC_PASSWORD)?);
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                request.set_header("Authorization", format!("Basic {encoded}"));
            }
            Auth::Bearer => {
                let token = value_to_string(&registry.resolve_or_error(BEARER_TOKEN)?);
                request.set_header("Authorization", format!("Bearer {token}"));
            }
        }
        Ok(())
    }

    /// Check whether every credential this method needs is available
    ///
    /// Only a missing value makes a method incapable; any other config
    /// error is returned.
    pub fn can_prepare(&self, registry: &ConfigRegistry) -> Result<bool> {
        let mut scratch = HttpRequest::default();
        match self.prepare(&mut scratch, registry) {
            Ok(()) => Ok(true),
            Err(Error::ConfigNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Auth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Auth::ALL
            .into_iter()
            .find(|auth| auth.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::config(format!("Unknown auth method '{s}'")))
    }
}

/// Declaration of the enforcement key, registered by every source
pub fn enforce_method_declaration() -> ConfigDeclaration {
    ConfigDeclaration::string(ENFORCE_METHOD)
        .with_default(NO_ENFORCEMENT)
        .with_valid_values(
            std::iter::once(NO_ENFORCEMENT).chain(Auth::ALL.iter().map(Auth::name)),
        )
        .required(false)
        .secret(false)
}

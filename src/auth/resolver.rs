//! Active auth selection

use super::types::{Auth, ENFORCE_METHOD, NO_ENFORCEMENT};
use crate::config::ConfigRegistry;
use crate::error::{Error, Result};
use tracing::debug;

/// Pick the auth method to use for a run
///
/// An enforced method (anything but `NONE` in `brook.auth.enforce_method`)
/// must be in `auths`. Otherwise the first method able to prepare a
/// request wins, in declaration order.
pub fn select_auth<'a>(auths: &'a [Auth], registry: &ConfigRegistry) -> Result<&'a Auth> {
    let enforced = registry
        .resolve_string(ENFORCE_METHOD)?
        .filter(|method| method != NO_ENFORCEMENT);

    if let Some(method) = enforced {
        let auth = auths
            .iter()
            .find(|auth| auth.name() == method)
            .ok_or(Error::EnforcedAuthNotSupported { method })?;
        debug!(auth = %auth, "Using enforced auth");
        return Ok(auth);
    }

    for auth in auths {
        if auth.can_prepare(registry)? {
            debug!(auth = %auth, "Selected auth");
            return Ok(auth);
        }
    }

    Err(Error::AuthCannotBePerformed {
        methods: auths.iter().map(|auth| auth.name().to_string()).collect(),
    })
}

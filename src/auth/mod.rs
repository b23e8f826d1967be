//! Authentication module
//!
//! Supports: no auth, HTTP Basic, Bearer token.
//!
//! A source carries an ordered list of [`Auth`] methods. The active one is
//! either enforced through `brook.auth.enforce_method` or the first whose
//! credentials resolve.

mod resolver;
mod types;

pub use resolver::select_auth;
pub use types::{
    enforce_method_declaration, Auth, BASIC_PASSWORD, BASIC_USERNAME, BEARER_TOKEN,
    ENFORCE_METHOD, NO_ENFORCEMENT,
};

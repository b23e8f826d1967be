//! Configuration registry
//!
//! Every tunable of a source (output options, auth credentials, stream
//! parameters) is a typed [`ConfigDeclaration`] registered in a shared
//! [`ConfigRegistry`]. Values are looked up, alias first, in:
//!
//! 1. the state overlay of the stream being fetched
//! 2. the catalog overlay of the stream being fetched
//! 3. the config input
//! 4. environment variables named exactly like the key or alias
//! 5. the declared default

mod declaration;
mod overlay;
mod registry;

pub use declaration::{ConfigDeclaration, ConfigDescription, ConfigKind, Validator, REDACTED};
pub use overlay::OverlayGuard;
pub use registry::{
    builtin_declarations, ConfigRegistry, Environment, Scope, OUTPUT_FORMAT, OUTPUT_TO,
    SCHEMA_VALIDATION,
};

#[cfg(test)]
mod tests;

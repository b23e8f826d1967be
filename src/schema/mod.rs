//! Output schema validation
//!
//! Every page a stream yields is checked against the stream's declared
//! output schema before it reaches the writer.

mod types;
mod validator;

pub use types::{JsonType, JsonTypeOrArray, SchemaViolation};
pub use validator::{check_schema, validate_instance};

//! Scoped inputs module
//!
//! Holds the inputs a run is configured from:
//!
//! - `ConfigInput` - global key/value config (JSON or YAML object)
//! - `LinesInput` - catalog and state files, one `{name, configs}` entry per line
//!
//! Catalog and state inputs carry an overlay slot holding the configs of the
//! entry currently being processed. The overlay, not the whole file, takes
//! part in config resolution.

mod reader;
mod types;

pub use reader::{read_json_lines_file, read_structured_file};
pub use types::{CatalogEntry, ConfigInput, InputKind, LinesInput, RuntimeInputs};

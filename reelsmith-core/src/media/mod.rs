//! Media descriptors and probe output parsing.

pub mod descriptor;
pub mod probe;

pub use descriptor::MediaDescriptor;
pub use probe::{ProbeOutput, parse_json, parse_key_value};

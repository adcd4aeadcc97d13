//! Option encoding for encoder command lines.
//!
//! Options come in two shapes, captured by [`OptionSet`]: a verbatim
//! argument list, or a semantic [`EncodingOptions`] map translated to flags
//! in insertion order.

pub mod encoding;
pub mod set;
pub mod value;

pub use encoding::{EncodingOptions, UnknownKeyPolicy, flag_for};
pub use set::OptionSet;
pub use value::OptionValue;

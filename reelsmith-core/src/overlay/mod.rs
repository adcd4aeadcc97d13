//! Overlays and still-image clips.
//!
//! - [`text`]: `drawtext` filter chains with stacked, positioned lines
//! - [`animation`]: alpha fades for text
//! - [`logo`]: `xfade` logo outros
//! - [`still_clip`]: a looped image rendered into a clip

pub mod animation;
pub mod logo;
pub mod still_clip;
pub mod text;

pub use animation::TextAnimation;
pub use logo::{LogoOutro, TRANSITIONS, Transition};
pub use still_clip::{DEFAULT_CLIP_SECS, StillImageClip};
pub use text::{TextOverlay, TextPosition, encode_text_filters};

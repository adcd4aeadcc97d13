//! Alpha animations for drawtext overlays.

use serde::{Deserialize, Serialize};

/// Default time (seconds) at which a fade-in/out starts fading out.
pub const DEFAULT_HOLD_UNTIL: f64 = 6.4;

/// Animation applied to a text overlay's alpha channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum TextAnimation {
    /// Invisible until `delay`, fades in over `duration`, holds until
    /// `hold_until`, then fades out over `duration`.
    FadeInOut {
        #[serde(default)]
        delay: f64,
        #[serde(default = "default_fade_duration", alias = "fade_in_duration")]
        duration: f64,
        #[serde(default = "default_hold_until")]
        hold_until: f64,
    },
}

fn default_fade_duration() -> f64 {
    1.0
}

fn default_hold_until() -> f64 {
    DEFAULT_HOLD_UNTIL
}

impl TextAnimation {
    /// Fade in/out with the default hold point.
    #[must_use]
    pub fn fade_in_out(delay: f64, duration: f64) -> Self {
        Self::FadeInOut {
            delay,
            duration,
            hold_until: DEFAULT_HOLD_UNTIL,
        }
    }

    /// The `alpha='...'` drawtext parameter for this animation.
    #[must_use]
    pub fn alpha_expr(&self) -> String {
        match *self {
            Self::FadeInOut {
                delay,
                duration,
                hold_until,
            } => {
                let duration = if duration > 0.0 { duration } else { 1.0 };
                let visible = delay + duration;
                let hold = hold_until.max(visible);
                let gone = hold + duration;
                format!(
                    "alpha='if(lt(t,{delay}),0,if(lt(t,{visible}),(t-{delay})/{duration},\
                     if(lt(t,{hold}),1,if(lt(t,{gone}),({gone}-t)/{duration},0))))'"
                )
            }
        }
    }
}

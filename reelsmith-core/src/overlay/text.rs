//! Text overlays rendered with the `drawtext` filter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::animation::TextAnimation;

/// Horizontal padding for left/right aligned text.
const SIDE_MARGIN: u32 = 40;
/// Vertical padding for top and bottom aligned text.
const EDGE_MARGIN: u32 = 75;
const BOTTOM_CENTER_MARGIN: u32 = 80;
/// Gap between stacked lines.
const LINE_GAP: u32 = 5;

/// Anchor of a text overlay within the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    #[serde(alias = "text_up_left")]
    TopLeft,
    #[serde(alias = "text_up_center")]
    TopCenter,
    #[serde(alias = "text_up_right")]
    TopRight,
    #[default]
    Center,
    #[serde(alias = "text_down_left")]
    BottomLeft,
    #[serde(alias = "text_down_middle", alias = "text_down_midle")]
    BottomCenter,
    #[serde(alias = "text_down_right")]
    BottomRight,
}

impl TextPosition {
    fn x(self) -> String {
        match self {
            Self::TopLeft | Self::BottomLeft => format!("x={SIDE_MARGIN}"),
            Self::TopRight | Self::BottomRight => format!("x=w-tw-{SIDE_MARGIN}"),
            Self::TopCenter | Self::Center | Self::BottomCenter => "x=(w-text_w)/2".to_string(),
        }
    }

    /// `above` is the stacked height of earlier lines, `below` of later ones.
    fn y(self, above: u32, below: u32) -> String {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => {
                if above == 0 {
                    format!("y={EDGE_MARGIN}")
                } else {
                    format!("y=({EDGE_MARGIN}+{above})")
                }
            }
            Self::BottomLeft | Self::BottomRight => format!("y=(h-th-{EDGE_MARGIN}-{below})"),
            Self::BottomCenter => format!("y=(h-th-{BOTTOM_CENTER_MARGIN}-{below})"),
            Self::Center => {
                if above == 0 {
                    "y=(h-text_h)/2".to_string()
                } else {
                    format!("y=((h-text_h)/2)+{above}")
                }
            }
        }
    }

    /// The `x=..:y=..` pair for a line.
    #[must_use]
    pub fn coordinates(self, above: u32, below: u32) -> String {
        format!("{}:{}", self.x(), self.y(above, below))
    }
}

/// One line of text drawn over the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font file; takes precedence over `font_family`
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub position: TextPosition,
    #[serde(default)]
    pub box_color: Option<String>,
    #[serde(default)]
    pub animation: Option<TextAnimation>,
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_font_size() -> u32 {
    40
}

impl TextOverlay {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: default_font_family(),
            font_path: None,
            font_color: default_font_color(),
            font_size: default_font_size(),
            position: TextPosition::default(),
            box_color: None,
            animation: None,
        }
    }

    #[must_use]
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    #[must_use]
    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = color.into();
        self
    }

    #[must_use]
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    #[must_use]
    pub fn position(mut self, position: TextPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn box_color(mut self, color: impl Into<String>) -> Self {
        self.box_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn animation(mut self, animation: TextAnimation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Vertical space this line takes in a stack.
    fn line_height(&self) -> u32 {
        self.font_size.saturating_add(LINE_GAP)
    }

    /// Renders one `drawtext=` filter.
    #[must_use]
    pub fn drawtext(&self, above: u32, below: u32) -> String {
        let font = match &self.font_path {
            Some(path) => format!("fontfile={}", path.display()),
            None => format!("font='{}'", self.font_family),
        };
        let mut parts = vec![
            font,
            format!("text='{}'", sanitize_text(&self.text)),
            format!("fontcolor={}", self.font_color),
            format!("fontsize={}", self.font_size),
            self.position.coordinates(above, below),
        ];
        if let Some(color) = &self.box_color {
            parts.push(format!("box=1:boxcolor={color}:boxborderw=10"));
        }
        if let Some(animation) = &self.animation {
            parts.push(animation.alpha_expr());
        }
        format!("drawtext={}", parts.join(":"))
    }
}

/// Makes text safe inside a quoted drawtext value.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    text.replace(':', ";").replace('\'', "\u{2019}")
}

/// Renders `texts` as a single `-vf` filter chain.
///
/// Lines stack in order: a line's offset is the combined height of the lines
/// before it (top and centre anchors) or after it (bottom anchors).
#[must_use]
pub fn encode_text_filters(texts: &[TextOverlay]) -> Vec<String> {
    if texts.is_empty() {
        return Vec::new();
    }

    // Offsets saturate instead of wrapping for absurd font sizes.
    let stacked = |lines: &[TextOverlay]| {
        lines
            .iter()
            .fold(0u32, |acc, text| acc.saturating_add(text.line_height()))
    };

    let mut filters = Vec::with_capacity(texts.len());
    for (i, text) in texts.iter().enumerate() {
        filters.push(text.drawtext(stacked(&texts[..i]), stacked(&texts[i + 1..])));
    }

    vec!["-vf".to_string(), format!("[in]{}[out]", filters.join(", "))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_centered_line() {
        let args = encode_text_filters(&[TextOverlay::new("Hello").font_size(40)]);
        assert_eq!(
            args,
            vec![
                "-vf",
                "[in]drawtext=font='Sans':text='Hello':fontcolor=white:fontsize=40:x=(w-text_w)/2:y=(h-text_h)/2[out]"
            ]
        );
    }

    #[test]
    fn test_empty_texts() {
        assert!(encode_text_filters(&[]).is_empty());
    }

    #[test]
    fn test_top_lines_stack_downwards() {
        let texts = [
            TextOverlay::new("one").font_size(30).position(TextPosition::TopLeft),
            TextOverlay::new("two").font_size(20).position(TextPosition::TopRight),
            TextOverlay::new("three").font_size(20).position(TextPosition::TopCenter),
        ];
        let filter = &encode_text_filters(&texts)[1];
        assert!(filter.contains("x=40:y=75, "));
        assert!(filter.contains("x=w-tw-40:y=(75+35)"));
        assert!(filter.contains("x=(w-text_w)/2:y=(75+60)"));
    }

    #[test]
    fn test_bottom_lines_stack_upwards() {
        let texts = [
            TextOverlay::new("first").font_size(30).position(TextPosition::BottomLeft),
            TextOverlay::new("second").font_size(20).position(TextPosition::BottomRight),
            TextOverlay::new("last").font_size(10).position(TextPosition::BottomCenter),
        ];
        let filter = &encode_text_filters(&texts)[1];
        assert!(filter.contains("x=40:y=(h-th-75-40)"));
        assert!(filter.contains("x=w-tw-40:y=(h-th-75-15)"));
        assert!(filter.contains("x=(w-text_w)/2:y=(h-th-80-0)"));
    }

    #[test]
    fn test_huge_font_sizes_saturate() {
        let texts = [
            TextOverlay::new("big").font_size(u32::MAX).position(TextPosition::TopLeft),
            TextOverlay::new("bigger").font_size(u32::MAX - 2).position(TextPosition::TopLeft),
            TextOverlay::new("tail").font_size(u32::MAX).position(TextPosition::BottomLeft),
        ];
        let filter = &encode_text_filters(&texts)[1];
        assert!(filter.contains(&format!("fontsize={}", u32::MAX)));
        assert!(filter.contains(&format!("y=(75+{})", u32::MAX)));
        assert!(filter.contains("y=(h-th-75-0)"));
    }

    #[test]
    fn test_centered_followers_offset() {
        let texts = [
            TextOverlay::new("a").font_size(40),
            TextOverlay::new("b").font_size(40),
        ];
        let filter = &encode_text_filters(&texts)[1];
        assert!(filter.contains("y=(h-text_h)/2, "));
        assert!(filter.contains("y=((h-text_h)/2)+45"));
        assert!(filter.starts_with("[in]drawtext="));
        assert!(filter.ends_with("[out]"));
        assert_eq!(filter.matches(", drawtext=").count(), 1);
    }

    #[test]
    fn test_font_box_and_animation() {
        let text = TextOverlay::new("Time: 10:30 it's late")
            .font_path("/fonts/Montserrat-Black.ttf")
            .font_color("yellow")
            .box_color("black@0.5")
            .animation(TextAnimation::fade_in_out(0.0, 1.0));
        let rendered = text.drawtext(0, 0);
        assert!(rendered.starts_with("drawtext=fontfile=/fonts/Montserrat-Black.ttf:"));
        assert!(rendered.contains("text='Time; 10;30 it\u{2019}s late'"));
        assert!(rendered.contains(":fontcolor=yellow:"));
        assert!(rendered.contains(":box=1:boxcolor=black@0.5:boxborderw=10:"));
        assert!(rendered.ends_with(":alpha='if(lt(t,0),0,if(lt(t,1),(t-0)/1,if(lt(t,6.4),1,if(lt(t,7.4),(7.4-t)/1,0))))'"));
    }

    #[test]
    fn test_deserialize_overlay() {
        let text: TextOverlay = serde_json::from_str(
            r#"{ "text": "Hi", "font_size": 32, "position": "bottom_center",
                 "animation": { "name": "fade_in_out", "delay": 1 } }"#,
        )
        .unwrap();
        assert_eq!(text.font_family, "Sans");
        assert_eq!(text.position, TextPosition::BottomCenter);
        assert!(text.animation.is_some());

        let legacy: TextOverlay = serde_json::from_str(
            r#"{ "text": "Hi", "position": "text_up_left", "box_color": null }"#,
        )
        .unwrap();
        assert_eq!(legacy.position, TextPosition::TopLeft);
        assert_eq!(legacy.box_color, None);
    }
}

use super::assets::MediaKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    /// Case-insensitive, `None` for anything but left/center/right
    pub fn parse(value: &str) -> Option<Align> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Align::Left => "align-left",
            Align::Center => "align-center",
            Align::Right => "align-right",
        }
    }

    pub const CLASSES: [&'static str; 3] = ["align-left", "align-center", "align-right"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Video,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub src: String,
    pub kind: BackgroundKind,
}

impl Background {
    /// Anything that is not a still image is played as video
    pub fn new(src: &str, kind: MediaKind) -> Self {
        Background {
            src: src.to_string(),
            kind: match kind {
                MediaKind::Image => BackgroundKind::Image,
                MediaKind::Video | MediaKind::File => BackgroundKind::Video,
            },
        }
    }

    pub fn video(src: &str) -> Self {
        Self::new(src, MediaKind::Video)
    }

    /// MIME type for the `<source>` element, mp4 when unsure
    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .src
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "webm" => "video/webm",
            "ogg" | "ogv" => "video/ogg",
            _ => "video/mp4",
        }
    }
}

/// Fallbacks for sections that leave a value out
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionDefaults {
    pub text_speed: f64,
    pub video_speed: f64,
    /// seconds, used to scrub while the real media duration is unknown
    pub duration_hint: f64,
}

impl Default for SectionDefaults {
    fn default() -> Self {
        Self {
            text_speed: 0.4,
            video_speed: 0.15,
            duration_hint: 10.0,
        }
    }
}

/// Per-section settings, read once from the section's `data-*` attributes
/// and then changed by the page controls
#[derive(Debug, Clone, PartialEq)]
pub struct SectionConfig {
    pub element_id: String,
    pub title: String,
    pub text_speed: f64,
    pub video_speed: f64,
    pub duration_hint: f64,
    pub mask: Option<String>,
    pub theme: Option<String>,
    pub align: Align,
    pub use_card: bool,
    pub card_bg: Option<String>,
    pub card_radius: Option<String>,
    pub background: Option<Background>,
}

impl SectionConfig {
    /// `attribute` looks up a full attribute name such as `data-text-speed`
    pub fn from_attributes(
        attribute: impl Fn(&str) -> Option<String>,
        element_id: &str,
        defaults: &SectionDefaults,
    ) -> Self {
        let number = |name: &str, fallback: f64| {
            attribute(name)
                .and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
                .unwrap_or(fallback)
        };
        let text = |name: &str| attribute(name).filter(|value| !value.is_empty());

        SectionConfig {
            element_id: element_id.to_string(),
            title: attribute("data-title").unwrap_or_default(),
            text_speed: number("data-text-speed", defaults.text_speed),
            video_speed: number("data-video-speed", defaults.video_speed),
            duration_hint: number("data-duration", defaults.duration_hint),
            mask: text("data-mask"),
            theme: text("data-theme"),
            align: text("data-align")
                .and_then(|value| Align::parse(&value))
                .unwrap_or_default(),
            use_card: text("data-card").map_or(true, |value| value.eq_ignore_ascii_case("true")),
            card_bg: text("data-card-bg"),
            card_radius: text("data-card-radius"),
            background: text("data-video-src").map(|src| Background::video(&src)),
        }
    }

    /// Name edits of this section are stored under
    pub fn storage_base(&self) -> &str {
        let title = self.title.trim();
        if !title.is_empty() {
            title
        } else if !self.element_id.is_empty() {
            &self.element_id
        } else {
            "section"
        }
    }

    pub fn background_kind(&self) -> BackgroundKind {
        self.background
            .as_ref()
            .map_or(BackgroundKind::Video, |background| background.kind)
    }
}
